//! Column-major symbol grid

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{WfError, WfResult};
use crate::symbol::Symbol;

/// A (column, row) coordinate on the grid
///
/// Ordering is column first, then row, which is also the reveal order
/// used by win presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    pub column: usize,
    pub row: usize,
}

impl CellPosition {
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Resolved symbol grid for one spin (reels × rows)
///
/// Stored column-major: cell `(column, row)` lives at
/// `column * height + row`. Serializes as a list of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Symbol>>", into = "Vec<Vec<Symbol>>")]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Symbol>,
}

impl Grid {
    /// Build from a list of columns. Every column must have the same,
    /// non-zero length.
    pub fn from_columns(columns: Vec<Vec<Symbol>>) -> WfResult<Self> {
        let width = columns.len();
        if width == 0 {
            return Err(WfError::MalformedGrid("grid has no columns".into()));
        }
        let height = columns[0].len();
        if height == 0 {
            return Err(WfError::MalformedGrid("grid has no rows".into()));
        }
        if let Some((index, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.len() != height)
        {
            return Err(WfError::MalformedGrid(format!(
                "column {} has {} rows, expected {}",
                index,
                column.len(),
                height
            )));
        }

        Ok(Self {
            width,
            height,
            cells: columns.into_iter().flatten().collect(),
        })
    }

    /// Build from a literal table of columns.
    ///
    /// # Panics
    ///
    /// Panics if the table is empty or ragged. Meant for compiled-in
    /// tables; use [`Grid::from_columns`] for runtime input.
    #[track_caller]
    pub fn from_static(columns: &[&[Symbol]]) -> Self {
        match Self::from_columns(columns.iter().map(|column| column.to_vec()).collect()) {
            Ok(grid) => grid,
            Err(e) => panic!("invalid literal grid: {}", e),
        }
    }

    /// Parse columns given as symbol names, e.g. `[["high1", "low2", ...], ...]`
    pub fn from_names<S: AsRef<str>>(columns: &[Vec<S>]) -> WfResult<Self> {
        let parsed = columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .map(|name| name.as_ref().parse::<Symbol>())
                    .collect::<WfResult<Vec<_>>>()
            })
            .collect::<WfResult<Vec<_>>>()?;
        Self::from_columns(parsed)
    }

    /// Grid with every cell set to one symbol
    pub fn filled(width: usize, height: usize, symbol: Symbol) -> WfResult<Self> {
        Self::from_columns(vec![vec![symbol; height]; width])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total cell count
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed grid
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: CellPosition) -> bool {
        pos.column < self.width && pos.row < self.height
    }

    /// Symbol at a position, `None` when out of range
    pub fn get(&self, pos: CellPosition) -> Option<Symbol> {
        if self.contains(pos) {
            Some(self.cells[pos.column * self.height + pos.row])
        } else {
            None
        }
    }

    /// Symbol at a position, erroring when out of range
    pub fn symbol_at(&self, pos: CellPosition) -> WfResult<Symbol> {
        self.get(pos).ok_or(WfError::CellOutOfRange {
            column: pos.column,
            row: pos.row,
            width: self.width,
            height: self.height,
        })
    }

    /// One column's symbols, top row first
    pub fn column(&self, column: usize) -> Option<&[Symbol]> {
        if column < self.width {
            let start = column * self.height;
            Some(&self.cells[start..start + self.height])
        } else {
            None
        }
    }

    /// Iterate columns left to right
    pub fn columns(&self) -> impl Iterator<Item = &[Symbol]> {
        self.cells.chunks(self.height)
    }

    /// Iterate every cell in column-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellPosition, Symbol)> + '_ {
        let height = self.height;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &symbol)| (CellPosition::new(i / height, i % height), symbol))
    }

    /// Every position in column-major order
    pub fn positions(&self) -> impl Iterator<Item = CellPosition> {
        let height = self.height;
        (0..self.width).flat_map(move |column| (0..height).map(move |row| CellPosition::new(column, row)))
    }

    /// Check dimensions against an expected shape
    pub fn ensure_dimensions(&self, width: usize, height: usize) -> WfResult<()> {
        if self.width != width || self.height != height {
            return Err(WfError::GridMismatch {
                expected_width: width,
                expected_height: height,
                actual_width: self.width,
                actual_height: self.height,
            });
        }
        Ok(())
    }

    /// Copy out as a list of columns
    pub fn to_columns(&self) -> Vec<Vec<Symbol>> {
        self.columns().map(|column| column.to_vec()).collect()
    }
}

impl TryFrom<Vec<Vec<Symbol>>> for Grid {
    type Error = WfError;

    fn try_from(value: Vec<Vec<Symbol>>) -> Result<Self, Self::Error> {
        Self::from_columns(value)
    }
}

impl From<Grid> for Vec<Vec<Symbol>> {
    fn from(value: Grid) -> Self {
        value.to_columns()
    }
}

impl fmt::Display for Grid {
    /// Rows top to bottom, columns left to right
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            let line: Vec<&str> = (0..self.width)
                .map(|column| self.cells[column * self.height + row].as_str())
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_names(&[
            vec!["high3", "low1", "high2"],
            vec!["low2", "high3", "low2"],
        ])
        .unwrap()
    }

    #[test]
    fn test_column_major_addressing() {
        let grid = sample();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(CellPosition::new(0, 2)), Some(Symbol::High2));
        assert_eq!(grid.get(CellPosition::new(1, 1)), Some(Symbol::High3));
        assert_eq!(grid.column(1).unwrap(), &[Symbol::Low2, Symbol::High3, Symbol::Low2]);
        assert!(grid.column(2).is_none());
    }

    #[test]
    fn test_out_of_range() {
        let grid = sample();
        assert!(grid.get(CellPosition::new(2, 0)).is_none());
        assert!(matches!(
            grid.symbol_at(CellPosition::new(0, 3)),
            Err(WfError::CellOutOfRange { row: 3, .. })
        ));
    }

    #[test]
    fn test_malformed_grids_rejected() {
        assert!(Grid::from_columns(vec![]).is_err());
        assert!(Grid::from_columns(vec![vec![]]).is_err());
        let ragged = Grid::from_columns(vec![
            vec![Symbol::High1, Symbol::High2],
            vec![Symbol::High1],
        ]);
        assert!(matches!(ragged, Err(WfError::MalformedGrid(_))));
    }

    #[test]
    fn test_cells_iterate_column_major() {
        let grid = sample();
        let positions: Vec<CellPosition> = grid.cells().map(|(pos, _)| pos).collect();
        assert_eq!(positions[0], CellPosition::new(0, 0));
        assert_eq!(positions[3], CellPosition::new(1, 0));
        assert_eq!(positions, grid.positions().collect::<Vec<_>>());
    }

    #[test]
    fn test_ensure_dimensions() {
        let grid = sample();
        assert!(grid.ensure_dimensions(2, 3).is_ok());
        assert!(matches!(
            grid.ensure_dimensions(5, 3),
            Err(WfError::GridMismatch { expected_width: 5, actual_width: 2, .. })
        ));
    }

    #[test]
    fn test_serde_as_columns() {
        let grid = sample();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"[["high3","low1","high2"],["low2","high3","low2"]]"#);
        let back: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
        assert!(serde_json::from_str::<Grid>(r#"[["high1"],[]]"#).is_err());
    }

    #[test]
    fn test_display_rows() {
        let grid = sample();
        let text = grid.to_string();
        assert_eq!(text.lines().next().unwrap(), "high3 low2");
    }
}
