//! Error types for WaysForge

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum WfError {
    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    #[error("Cell ({column}, {row}) outside {width}x{height} grid")]
    CellOutOfRange {
        column: usize,
        row: usize,
        width: usize,
        height: usize,
    },

    #[error("Grid is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    GridMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("Win catalog is empty")]
    EmptyCatalog,

    #[error("Symbol set is empty")]
    EmptySymbolSet,

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Component already registered: {0}")]
    DuplicateComponent(String),

    #[error("Outcome for {0} is not a win")]
    NotAWin(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type WfResult<T> = Result<T, WfError>;
