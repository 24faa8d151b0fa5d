//! Spin Choreographer: staggered start, spin, staggered stop
//!
//! ```text
//! Idle/Complete ──start_spin──► Spinning ──BeginStop──► Stopping ──last StopColumn──► Complete
//! ```
//!
//! Column `i` starts at `i × column_start_stagger_ms`. Once the last column
//! is spinning, `spin_duration_ms` later the stop sequence begins and column
//! `i` stops at `i × column_stop_stagger_ms` after that. Stopped columns show
//! the target grid; spinning columns show random filler.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rand::prelude::*;

use wf_core::{CellPosition, Grid, Symbol, WfResult};

use crate::scheduler::Component;
use crate::timer::{Due, TimerQueue};
use crate::timing::SpinTiming;

/// Choreography phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpinState {
    Idle,
    Spinning,
    Stopping,
    Complete,
}

impl SpinState {
    /// True while a spin is running and a new one would be ignored
    pub fn in_flight(&self) -> bool {
        matches!(self, Self::Spinning | Self::Stopping)
    }
}

/// Timed choreography step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinEvent {
    ActivateColumn(usize),
    BeginStop,
    StopColumn(usize),
}

/// What one cell of the reel window currently shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleCell {
    pub symbol: Symbol,
    /// Downward displacement from the cell's resting row, in rows
    pub offset_rows: f64,
}

/// Column-major view of what the reels show right now
#[derive(Debug, Clone, PartialEq)]
pub struct ReelWindow {
    width: usize,
    height: usize,
    cells: Vec<VisibleCell>,
}

impl ReelWindow {
    fn from_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: grid
                .cells()
                .map(|(_, symbol)| VisibleCell {
                    symbol,
                    offset_rows: 0.0,
                })
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, pos: CellPosition) -> Option<&VisibleCell> {
        if pos.column < self.width && pos.row < self.height {
            self.cells.get(pos.column * self.height + pos.row)
        } else {
            None
        }
    }

    pub fn column(&self, column: usize) -> Option<&[VisibleCell]> {
        if column < self.width {
            let start = column * self.height;
            Some(&self.cells[start..start + self.height])
        } else {
            None
        }
    }

    /// True when every cell sits on its resting row
    pub fn is_aligned(&self) -> bool {
        self.cells.iter().all(|c| c.offset_rows == 0.0)
    }

    /// Snapshot of the shown symbols as a grid
    pub fn to_grid(&self) -> WfResult<Grid> {
        Grid::from_columns(
            self.cells
                .chunks(self.height)
                .map(|column| column.iter().map(|c| c.symbol).collect())
                .collect(),
        )
    }

    fn column_mut(&mut self, column: usize) -> &mut [VisibleCell] {
        let start = column * self.height;
        &mut self.cells[start..start + self.height]
    }
}

type CompletionCallback = Box<dyn FnMut() + Send>;

/// Drives the per-column spin animation and reports when every column stopped
pub struct SpinChoreographer {
    timing: SpinTiming,
    state: SpinState,
    timers: TimerQueue<SpinEvent>,
    active: BTreeSet<usize>,
    stopped: BTreeSet<usize>,
    target: Option<Arc<Grid>>,
    window: ReelWindow,
    rng: StdRng,
    on_complete: Option<CompletionCallback>,
    spins_started: u64,
}

impl SpinChoreographer {
    /// Create showing `initial` at rest
    pub fn new(timing: SpinTiming, initial: &Grid) -> Self {
        Self {
            timing,
            state: SpinState::Idle,
            timers: TimerQueue::new(),
            active: BTreeSet::new(),
            stopped: BTreeSet::new(),
            target: None,
            window: ReelWindow::from_grid(initial),
            rng: StdRng::from_os_rng(),
            on_complete: None,
            spins_started: 0,
        }
    }

    /// Seed the filler-symbol RNG
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Install the completion callback, replacing any previous one
    pub fn on_complete<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> SpinState {
        self.state
    }

    pub fn timing(&self) -> &SpinTiming {
        &self.timing
    }

    pub fn width(&self) -> usize {
        self.window.width
    }

    pub fn height(&self) -> usize {
        self.window.height
    }

    pub fn active_columns(&self) -> &BTreeSet<usize> {
        &self.active
    }

    pub fn stopped_columns(&self) -> &BTreeSet<usize> {
        &self.stopped
    }

    pub fn visible(&self) -> &ReelWindow {
        &self.window
    }

    /// Grid the current (or last) spin lands on
    pub fn target(&self) -> Option<&Arc<Grid>> {
        self.target.as_ref()
    }

    /// Number of scheduled but not yet fired steps
    pub fn pending_events(&self) -> usize {
        self.timers.len()
    }

    pub fn spins_started(&self) -> u64 {
        self.spins_started
    }

    /// Time from `start_spin` to completion for this grid width
    pub fn total_duration_ms(&self) -> f64 {
        self.timing.total_spin_duration(self.width())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONTROL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a spin landing on `target`.
    ///
    /// Returns `Ok(false)` without touching anything when a spin is already
    /// running. A target with the wrong shape is rejected.
    pub fn start_spin(&mut self, target: Arc<Grid>) -> WfResult<bool> {
        if self.state.in_flight() {
            log::warn!("start_spin ignored: spin already in progress ({:?})", self.state);
            return Ok(false);
        }
        target.ensure_dimensions(self.width(), self.height())?;

        self.active.clear();
        self.stopped.clear();
        self.timers.clear();
        self.target = Some(target);
        self.state = SpinState::Spinning;
        self.spins_started += 1;

        let now = self.timers.now_ms();
        for column in 0..self.width() {
            self.timers.schedule_at(
                now + column as f64 * self.timing.column_start_stagger_ms,
                SpinEvent::ActivateColumn(column),
            );
        }

        log::info!(
            "Spin #{} started, {} columns, completes in {:.0} ms",
            self.spins_started,
            self.width(),
            self.total_duration_ms()
        );
        Ok(true)
    }

    fn handle(&mut self, due: Due<SpinEvent>) {
        let width = self.width();
        match due.payload {
            SpinEvent::ActivateColumn(column) => {
                self.active.insert(column);
                log::debug!("Column {} spinning", column);
                if column + 1 == width {
                    self.timers
                        .schedule_at(due.due_ms + self.timing.spin_duration_ms, SpinEvent::BeginStop);
                }
            }
            SpinEvent::BeginStop => {
                self.state = SpinState::Stopping;
                log::debug!("Stop sequence started");
                for column in 0..width {
                    self.timers.schedule_at(
                        due.due_ms + column as f64 * self.timing.column_stop_stagger_ms,
                        SpinEvent::StopColumn(column),
                    );
                }
            }
            SpinEvent::StopColumn(column) => self.stop_column(column),
        }
    }

    fn stop_column(&mut self, column: usize) {
        if !self.stopped.insert(column) {
            return;
        }
        self.active.remove(&column);
        if let Some(symbols) = self.target.as_ref().and_then(|t| t.column(column)) {
            for (cell, &symbol) in self.window.column_mut(column).iter_mut().zip(symbols) {
                cell.symbol = symbol;
                cell.offset_rows = 0.0;
            }
        }
        log::debug!("Column {} stopped", column);

        if self.stopped.len() == self.width() {
            self.state = SpinState::Complete;
            log::info!("Spin #{} complete", self.spins_started);
            if let Some(callback) = self.on_complete.as_mut() {
                callback();
            }
        }
    }

    fn move_symbols(&mut self, dt_ms: f64) {
        let height = self.window.height;
        let distance = self.timing.symbol_speed_rows_per_sec * dt_ms / 1000.0;
        if distance <= 0.0 {
            return;
        }
        for &column in &self.active {
            for (row, cell) in self.window.column_mut(column).iter_mut().enumerate() {
                cell.offset_rows += distance;
                // wrap back to the top with a fresh filler symbol
                while row as f64 + cell.offset_rows >= height as f64 {
                    cell.offset_rows -= height as f64;
                    cell.symbol = Symbol::ALL[self.rng.random_range(0..Symbol::ALL.len())];
                }
            }
        }
    }
}

impl Component for SpinChoreographer {
    fn update(&mut self, dt_ms: f64) {
        self.timers.step(dt_ms);
        while let Some(due) = self.timers.pop_due() {
            self.handle(due);
        }
        if self.state.in_flight() {
            self.move_symbols(dt_ms);
        }
    }
}

impl fmt::Debug for SpinChoreographer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinChoreographer")
            .field("state", &self.state)
            .field("active", &self.active)
            .field("stopped", &self.stopped)
            .field("pending_events", &self.timers.len())
            .finish()
    }
}
