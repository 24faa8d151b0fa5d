//! Win/loss presentation contract
//!
//! The renderer lives outside this crate. It plugs in through
//! [`CellFeedback`], and the game flow only sees an [`OutcomePresenter`]
//! that hands back a [`CompletionToken`] it can poll every frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use wf_core::{CellPosition, WfError, WfResult};

use crate::config::GridSpec;
use crate::timer::TimerQueue;
use crate::timing::PresentationTiming;
use crate::ways::{ResultMap, SymbolOutcome};

// ═══════════════════════════════════════════════════════════════════════════════
// COMPLETION
// ═══════════════════════════════════════════════════════════════════════════════

/// Pollable "is it finished yet" handle
#[derive(Debug, Clone, Default)]
pub struct CompletionToken {
    parts: Vec<Arc<AtomicBool>>,
}

/// Write side of a [`CompletionToken`]
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    flag: Arc<AtomicBool>,
}

impl CompletionSignal {
    pub fn complete(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

impl CompletionToken {
    /// New unresolved token and the signal that resolves it
    pub fn pending() -> (Self, CompletionSignal) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Self {
                parts: vec![flag.clone()],
            },
            CompletionSignal { flag },
        )
    }

    /// Already resolved
    pub fn ready() -> Self {
        Self::default()
    }

    /// Resolves once every token resolves (immediately for none)
    pub fn all(tokens: impl IntoIterator<Item = CompletionToken>) -> Self {
        Self {
            parts: tokens.into_iter().flat_map(|t| t.parts).collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.parts.iter().all(|p| p.load(Ordering::Acquire))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTRACTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-cell visual feedback provided by the renderer
pub trait CellFeedback: Send {
    /// Return every cell to its neutral look
    fn reset_cells(&mut self);

    /// Highlight a winning cell; the token resolves when its effect ends
    fn present_win(&mut self, cell: CellPosition) -> CompletionToken;

    /// Dim a losing cell
    fn present_loss(&mut self, cell: CellPosition);
}

/// Presents one evaluated outcome
pub trait OutcomePresenter: Send {
    /// Clear everything from the previous outcome
    fn reset(&mut self);

    /// Start presenting; called once per winning outcome
    fn present(&mut self, result: &ResultMap) -> CompletionToken;

    /// Advance presentation time
    fn update(&mut self, dt_ms: f64);
}

/// Winning cells in reveal order: column first, then row
pub fn reveal_order(result: &ResultMap) -> Vec<CellPosition> {
    let mut cells: Vec<CellPosition> = result.winning_cells().collect();
    cells.sort();
    cells.dedup();
    cells
}

// ═══════════════════════════════════════════════════════════════════════════════
// STAGGERED PRESENTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Dims losses at once, then reveals winning cells one by one
pub struct StaggeredPresenter<F: CellFeedback> {
    feedback: F,
    timing: PresentationTiming,
    reveals: TimerQueue<(CellPosition, CompletionSignal)>,
    /// Feedback effects still running, with the signal to fire when they end
    running: Vec<(CompletionToken, CompletionSignal)>,
    presented: u64,
}

impl<F: CellFeedback> StaggeredPresenter<F> {
    pub fn new(feedback: F, timing: PresentationTiming) -> Self {
        Self {
            feedback,
            timing,
            reveals: TimerQueue::new(),
            running: Vec::new(),
            presented: 0,
        }
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    /// Number of outcomes presented so far
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Cells scheduled but not revealed yet
    pub fn pending_reveals(&self) -> usize {
        self.reveals.len()
    }

    fn forward_finished(&mut self) {
        self.running.retain(|(token, signal)| {
            if token.is_complete() {
                signal.complete();
                false
            } else {
                true
            }
        });
    }
}

impl<F: CellFeedback> OutcomePresenter for StaggeredPresenter<F> {
    fn reset(&mut self) {
        self.reveals.clear();
        self.running.clear();
        self.feedback.reset_cells();
    }

    fn present(&mut self, result: &ResultMap) -> CompletionToken {
        self.presented += 1;
        for cell in result.losing_cells() {
            self.feedback.present_loss(cell);
        }

        let order = reveal_order(result);
        log::debug!("Presenting {} winning cell(s)", order.len());

        let now = self.reveals.now_ms();
        let mut tokens = Vec::with_capacity(order.len());
        for (index, cell) in order.into_iter().enumerate() {
            let (token, signal) = CompletionToken::pending();
            self.reveals
                .schedule_at(now + self.timing.reveal_offset(index), (cell, signal));
            tokens.push(token);
        }

        // reveal anything due right away (the first cell)
        self.update(0.0);
        CompletionToken::all(tokens)
    }

    fn update(&mut self, dt_ms: f64) {
        self.reveals.step(dt_ms);
        while let Some(due) = self.reveals.pop_due() {
            let (cell, signal) = due.payload;
            let effect = self.feedback.present_win(cell);
            self.running.push((effect, signal));
        }
        self.forward_finished();
    }
}

/// Headless feedback: effects finish instantly, calls are only counted
#[derive(Debug, Clone, Default)]
pub struct InstantFeedback {
    pub wins_shown: usize,
    pub losses_shown: usize,
    pub resets: usize,
}

impl CellFeedback for InstantFeedback {
    fn reset_cells(&mut self) {
        self.resets += 1;
    }

    fn present_win(&mut self, _cell: CellPosition) -> CompletionToken {
        self.wins_shown += 1;
        CompletionToken::ready()
    }

    fn present_loss(&mut self, _cell: CellPosition) {
        self.losses_shown += 1;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LAYOUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Screen-space point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Maps grid cells to screen space around a reel centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub center: Point,
}

/// Default square cell edge, in pixels
pub const DEFAULT_CELL_SIZE: f64 = 150.0;

impl GridLayout {
    /// Layout for `grid` with square default-sized cells centred on the origin
    pub fn for_grid(grid: GridSpec) -> Self {
        Self::new(grid, DEFAULT_CELL_SIZE, DEFAULT_CELL_SIZE, Point::default())
    }

    pub fn new(grid: GridSpec, cell_width: f64, cell_height: f64, center: Point) -> Self {
        Self {
            columns: grid.columns,
            rows: grid.rows,
            cell_width,
            cell_height,
            center,
        }
    }

    /// Centre of a cell
    pub fn cell_center(&self, pos: CellPosition) -> Point {
        let left = self.center.x - self.columns as f64 * self.cell_width * 0.5;
        let top = self.center.y - self.rows as f64 * self.cell_height * 0.5;
        Point {
            x: left + (pos.column as f64 + 0.5) * self.cell_width,
            y: top + (pos.row as f64 + 0.5) * self.cell_height,
        }
    }

    /// Where the reward text of a win goes: the centroid of its cells
    pub fn reward_anchor(&self, outcome: &SymbolOutcome) -> WfResult<Point> {
        if !outcome.is_win || outcome.positions.is_empty() {
            return Err(WfError::NotAWin(outcome.symbol.to_string()));
        }
        let count = outcome.positions.len() as f64;
        let sum = outcome
            .positions
            .iter()
            .map(|&pos| self.cell_center(pos))
            .fold(Point::default(), |acc, p| Point {
                x: acc.x + p.x,
                y: acc.y + p.y,
            });
        Ok(Point {
            x: sum.x / count,
            y: sum.y / count,
        })
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::for_grid(GridSpec::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_start_grid;
    use crate::ways::evaluate;
    use approx::assert_abs_diff_eq;
    use wf_core::{Grid, Symbol};

    /// Feedback whose win effects finish only when the test says so
    #[derive(Default)]
    struct ManualFeedback {
        revealed: Vec<CellPosition>,
        dimmed: Vec<CellPosition>,
        signals: Vec<CompletionSignal>,
        resets: usize,
    }

    impl CellFeedback for ManualFeedback {
        fn reset_cells(&mut self) {
            self.resets += 1;
        }

        fn present_win(&mut self, cell: CellPosition) -> CompletionToken {
            self.revealed.push(cell);
            let (token, signal) = CompletionToken::pending();
            self.signals.push(signal);
            token
        }

        fn present_loss(&mut self, cell: CellPosition) {
            self.dimmed.push(cell);
        }
    }

    #[test]
    fn test_token_join() {
        let (a, sa) = CompletionToken::pending();
        let (b, sb) = CompletionToken::pending();
        let joined = CompletionToken::all([a.clone(), b]);
        assert!(!joined.is_complete());
        sa.complete();
        assert!(a.is_complete());
        assert!(!joined.is_complete());
        sb.complete();
        assert!(joined.is_complete());
        assert!(CompletionToken::all([]).is_complete());
        assert!(CompletionToken::ready().is_complete());
    }

    #[test]
    fn test_reveal_order_column_then_row() {
        let grid = Grid::from_static(&[
            &[Symbol::Low1, Symbol::High1, Symbol::Low1],
            &[Symbol::High1, Symbol::Low1, Symbol::Low2],
            &[Symbol::Low1, Symbol::High1, Symbol::Low3],
        ]);
        let result = evaluate(&grid);
        assert_eq!(
            reveal_order(&result),
            vec![
                CellPosition::new(0, 0),
                CellPosition::new(0, 1),
                CellPosition::new(0, 2),
                CellPosition::new(1, 0),
                CellPosition::new(1, 1),
                CellPosition::new(2, 0),
                CellPosition::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_staggered_reveal_timing() {
        let result = evaluate(&default_start_grid());
        let mut presenter = StaggeredPresenter::new(ManualFeedback::default(), PresentationTiming::default());
        let done = presenter.present(&result);

        // losses immediately, first win at t = 0
        assert_eq!(presenter.feedback().dimmed.len(), 12);
        assert_eq!(presenter.feedback().revealed, vec![CellPosition::new(0, 0)]);

        presenter.update(49.0);
        assert_eq!(presenter.feedback().revealed.len(), 1);
        presenter.update(1.0);
        assert_eq!(presenter.feedback().revealed.len(), 2);
        presenter.update(50.0);
        assert_eq!(
            presenter.feedback().revealed,
            vec![CellPosition::new(0, 0), CellPosition::new(1, 1), CellPosition::new(2, 2)]
        );
        assert_eq!(presenter.pending_reveals(), 0);

        assert!(!done.is_complete());
        for signal in &presenter.feedback().signals {
            signal.complete();
        }
        presenter.update(0.0);
        assert!(done.is_complete());
        assert_eq!(presenter.presented(), 1);
    }

    #[test]
    fn test_reset_drops_pending_reveals() {
        let result = evaluate(&Grid::filled(5, 3, Symbol::High3).unwrap());
        let mut presenter = StaggeredPresenter::new(ManualFeedback::default(), PresentationTiming::default());
        presenter.present(&result);
        assert_eq!(presenter.pending_reveals(), 14);

        presenter.reset();
        assert_eq!(presenter.pending_reveals(), 0);
        assert_eq!(presenter.feedback().resets, 1);
        presenter.update(1000.0);
        assert_eq!(presenter.feedback().revealed.len(), 1);
    }

    #[test]
    fn test_instant_feedback_completes_after_last_reveal() {
        let result = evaluate(&default_start_grid());
        let mut presenter = StaggeredPresenter::new(InstantFeedback::default(), PresentationTiming::default());
        let done = presenter.present(&result);
        assert!(!done.is_complete());
        presenter.update(100.0);
        assert!(done.is_complete());
        assert_eq!(presenter.feedback().wins_shown, 3);
        assert_eq!(presenter.feedback().losses_shown, 12);
    }

    #[test]
    fn test_layout_cell_center_and_anchor() {
        let layout = GridLayout::default();
        let top_left = layout.cell_center(CellPosition::new(0, 0));
        assert_abs_diff_eq!(top_left.x, -300.0);
        assert_abs_diff_eq!(top_left.y, -150.0);

        let result = evaluate(&default_start_grid());
        let anchor = layout.reward_anchor(&result.wins[&Symbol::High3]).unwrap();
        // centroid of (0,0), (1,1), (2,2)
        assert_abs_diff_eq!(anchor.x, -150.0);
        assert_abs_diff_eq!(anchor.y, 0.0);

        let loss = &result.losses[&Symbol::Low1];
        assert!(matches!(layout.reward_anchor(loss), Err(WfError::NotAWin(name)) if name == "low1"));
    }

    #[test]
    fn test_layout_follows_grid_dimensions() {
        let layout = GridLayout::new(GridSpec { columns: 6, rows: 4 }, 100.0, 80.0, Point { x: 10.0, y: 20.0 });
        assert_eq!((layout.columns, layout.rows), (6, 4));

        let top_left = layout.cell_center(CellPosition::new(0, 0));
        assert_abs_diff_eq!(top_left.x, 10.0 - 250.0);
        assert_abs_diff_eq!(top_left.y, 20.0 - 120.0);
        let bottom_right = layout.cell_center(CellPosition::new(5, 3));
        assert_abs_diff_eq!(bottom_right.x, 10.0 + 250.0);
        assert_abs_diff_eq!(bottom_right.y, 20.0 + 120.0);

        assert_eq!(GridLayout::for_grid(GridSpec::standard_5x3()), GridLayout::default());
    }
}
