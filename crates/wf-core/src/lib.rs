//! wf-core: Shared types for WaysForge
//!
//! Symbols, the column-major grid and the error type used by every
//! other crate in the workspace.

mod error;
mod grid;
mod symbol;

pub use error::*;
pub use grid::*;
pub use symbol::*;
