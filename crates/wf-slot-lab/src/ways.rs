//! Ways-to-win evaluation
//!
//! A symbol wins when it appears in every column of an unbroken run that
//! starts at the leftmost column and spans at least [`MIN_WAYS_RUN`]
//! columns. Every matching cell inside the run is part of the win.
//! Cells outside all winning runs are grouped by symbol into losses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use wf_core::{CellPosition, Grid, Symbol};

/// Minimum number of consecutive columns for a win
pub const MIN_WAYS_RUN: usize = 3;

/// Cells of one symbol, either a winning run or the leftover losing cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolOutcome {
    pub symbol: Symbol,
    /// Column-major, ascending row within a column
    pub positions: Vec<CellPosition>,
    pub is_win: bool,
}

impl SymbolOutcome {
    /// Number of distinct columns touched
    pub fn column_span(&self) -> usize {
        let mut columns: Vec<usize> = self.positions.iter().map(|p| p.column).collect();
        columns.dedup();
        columns.len()
    }
}

/// Evaluation result of one grid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultMap {
    pub wins: BTreeMap<Symbol, SymbolOutcome>,
    pub losses: BTreeMap<Symbol, SymbolOutcome>,
}

impl ResultMap {
    /// True when at least one symbol won
    pub fn is_win(&self) -> bool {
        !self.wins.is_empty()
    }

    /// Ways count of a winning symbol: product of matches per column.
    /// Zero for symbols that did not win.
    pub fn total_ways(&self, symbol: Symbol) -> usize {
        let Some(outcome) = self.wins.get(&symbol) else {
            return 0;
        };
        let mut per_column: BTreeMap<usize, usize> = BTreeMap::new();
        for pos in &outcome.positions {
            *per_column.entry(pos.column).or_default() += 1;
        }
        per_column.values().product()
    }

    /// Every winning cell, in symbol order then position order
    pub fn winning_cells(&self) -> impl Iterator<Item = CellPosition> + '_ {
        self.wins.values().flat_map(|o| o.positions.iter().copied())
    }

    /// Every losing cell, in symbol order then position order
    pub fn losing_cells(&self) -> impl Iterator<Item = CellPosition> + '_ {
        self.losses.values().flat_map(|o| o.positions.iter().copied())
    }
}

/// Stateless ways evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct WaysEvaluator;

impl WaysEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a grid. Pure: the same grid always yields the same map.
    pub fn evaluate(&self, grid: &Grid) -> ResultMap {
        let mut result = ResultMap::default();

        for symbol in Symbol::ALL {
            let (run, positions) = Self::scan_run(grid, symbol);
            if run >= MIN_WAYS_RUN {
                result.wins.insert(
                    symbol,
                    SymbolOutcome {
                        symbol,
                        positions,
                        is_win: true,
                    },
                );
            }
        }

        for (pos, symbol) in grid.cells() {
            let claimed = result
                .wins
                .get(&symbol)
                .is_some_and(|win| win.positions.contains(&pos));
            if claimed {
                continue;
            }
            result
                .losses
                .entry(symbol)
                .or_insert_with(|| SymbolOutcome {
                    symbol,
                    positions: Vec::new(),
                    is_win: false,
                })
                .positions
                .push(pos);
        }

        log::trace!(
            "Evaluated {}x{} grid: {} winning symbol(s)",
            grid.width(),
            grid.height(),
            result.wins.len()
        );
        result
    }

    /// Walk columns from the left while `symbol` is present.
    /// Returns the run length and the matched positions.
    fn scan_run(grid: &Grid, symbol: Symbol) -> (usize, Vec<CellPosition>) {
        let mut run = 0;
        let mut positions = Vec::new();
        for (column, cells) in grid.columns().enumerate() {
            let before = positions.len();
            positions.extend(
                cells
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| **s == symbol)
                    .map(|(row, _)| CellPosition::new(column, row)),
            );
            if positions.len() == before {
                break;
            }
            run += 1;
        }
        (run, positions)
    }
}

/// Evaluate with the default evaluator
pub fn evaluate(grid: &Grid) -> ResultMap {
    WaysEvaluator.evaluate(grid)
}
