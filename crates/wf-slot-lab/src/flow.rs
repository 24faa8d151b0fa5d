//! Game Flow Controller: Idle → Spinning → PresentingOutcome → Idle
//!
//! Bus handlers installed by the controller never touch it directly. They
//! push a [`FlowInput`] into a shared inbox that the controller drains at
//! the start of its own update, so a publish from inside a transition can
//! never re-enter the state machine.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use wf_core::{Grid, Symbol, WfResult};
use wf_event::SubscriptionId;

use crate::choreographer::SpinChoreographer;
use crate::outcome::{OutcomeGenerator, OutcomeMode};
use crate::presentation::{CompletionToken, OutcomePresenter};
use crate::scheduler::Component;
use crate::signals::{GameBus, GameSignal, emit, topics};
use crate::ways::{ResultMap, WaysEvaluator};

/// Top-level game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameFlowState {
    #[default]
    Idle,
    Spinning,
    PresentingOutcome,
}

impl fmt::Display for GameFlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Spinning => "Spinning",
            Self::PresentingOutcome => "PresentingOutcome",
        };
        f.write_str(name)
    }
}

/// Player input queued by bus handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowInput {
    PressSpin,
    ToggleCheat,
}

type Inbox = Arc<Mutex<VecDeque<FlowInput>>>;

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub winning_spins: u64,
    pub guaranteed_spins: u64,
    /// Spins each symbol won on
    pub symbol_wins: BTreeMap<Symbol, u64>,
    /// Sum of ways over all wins
    pub total_ways: u64,
}

impl SessionStats {
    /// Percentage of spins with at least one win
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.winning_spins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    fn record(&mut self, result: &ResultMap, mode: OutcomeMode) {
        self.total_spins += 1;
        if mode == OutcomeMode::GuaranteedWin {
            self.guaranteed_spins += 1;
        }
        if result.is_win() {
            self.winning_spins += 1;
        }
        for &symbol in result.wins.keys() {
            *self.symbol_wins.entry(symbol).or_default() += 1;
            self.total_ways += result.total_ways(symbol) as u64;
        }
    }
}

/// Sequences the spin lifecycle
pub struct GameFlowController {
    bus: Arc<GameBus>,
    generator: OutcomeGenerator,
    evaluator: WaysEvaluator,
    choreographer: Arc<Mutex<SpinChoreographer>>,
    presenter: Box<dyn OutcomePresenter>,

    state: GameFlowState,
    mode: OutcomeMode,
    started: bool,
    inbox: Inbox,
    spin_finished: Arc<AtomicBool>,
    presentation: Option<CompletionToken>,

    recent_grid: Option<Arc<Grid>>,
    recent_result: Option<Arc<ResultMap>>,
    spins_completed: u64,
    stats: SessionStats,

    press_subscription: Option<SubscriptionId>,
    cheat_subscription: Option<SubscriptionId>,
}

impl GameFlowController {
    /// Wire a controller. Installs the choreographer's completion callback.
    pub fn new(
        bus: Arc<GameBus>,
        generator: OutcomeGenerator,
        choreographer: Arc<Mutex<SpinChoreographer>>,
        presenter: Box<dyn OutcomePresenter>,
    ) -> Self {
        let spin_finished = Arc::new(AtomicBool::new(false));
        let flag = spin_finished.clone();
        choreographer
            .lock()
            .on_complete(move || flag.store(true, Ordering::Release));

        Self {
            bus,
            generator,
            evaluator: WaysEvaluator::new(),
            choreographer,
            presenter,
            state: GameFlowState::Idle,
            mode: OutcomeMode::Random,
            started: false,
            inbox: Arc::new(Mutex::new(VecDeque::new())),
            spin_finished,
            presentation: None,
            recent_grid: None,
            recent_result: None,
            spins_completed: 0,
            stats: SessionStats::default(),
            press_subscription: None,
            cheat_subscription: None,
        }
    }

    /// Subscribe to player topics and enter Idle. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let inbox = self.inbox.clone();
        self.cheat_subscription = Some(self.bus.subscribe(topics::TOGGLE_CHEAT, move |_| {
            inbox.lock().push_back(FlowInput::ToggleCheat);
        }));
        self.enter_idle();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> GameFlowState {
        self.state
    }

    pub fn outcome_mode(&self) -> OutcomeMode {
        self.mode
    }

    pub fn recent_grid(&self) -> Option<Arc<Grid>> {
        self.recent_grid.clone()
    }

    pub fn recent_result(&self) -> Option<Arc<ResultMap>> {
        self.recent_result.clone()
    }

    /// Spins that went all the way back to Idle
    pub fn spins_completed(&self) -> u64 {
        self.spins_completed
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Inputs queued but not processed yet
    pub fn queued_inputs(&self) -> usize {
        self.inbox.lock().len()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════════

    fn set_state(&mut self, state: GameFlowState) {
        log::info!("Game state {} -> {}", self.state, state);
        self.state = state;
        emit(&self.bus, GameSignal::StateChanged(state));
    }

    fn enter_idle(&mut self) {
        self.presentation = None;
        self.set_state(GameFlowState::Idle);
        self.listen_for_press();
    }

    fn listen_for_press(&mut self) {
        let inbox = self.inbox.clone();
        self.press_subscription = Some(self.bus.subscribe_once(topics::PRESS_SPIN, move |_| {
            inbox.lock().push_back(FlowInput::PressSpin);
        }));
    }

    /// Resolve and start a spin. `Ok(false)` leaves everything untouched
    /// because the reels are still busy with a spin started elsewhere.
    fn enter_spinning(&mut self) -> WfResult<bool> {
        self.press_subscription = None;
        if self.choreographer.lock().state().in_flight() {
            return Ok(false);
        }

        let grid = Arc::new(self.generator.resolve(self.mode)?);
        let result = Arc::new(self.evaluator.evaluate(&grid));

        self.presenter.reset();
        self.spin_finished.store(false, Ordering::Release);
        if !self.choreographer.lock().start_spin(grid.clone())? {
            return Ok(false);
        }

        log::info!(
            "Resolved {:?} outcome, {} winning symbol(s)",
            self.mode,
            result.wins.len()
        );
        self.stats.record(&result, self.mode);
        self.recent_grid = Some(grid);
        self.recent_result = Some(result);
        self.set_state(GameFlowState::Spinning);
        Ok(true)
    }

    fn enter_presenting(&mut self) {
        self.set_state(GameFlowState::PresentingOutcome);

        let Some(result) = self.recent_result.clone() else {
            self.finish_spin();
            return;
        };
        if !result.is_win() {
            self.finish_spin();
            return;
        }
        self.presentation = Some(self.presenter.present(&result));
    }

    fn finish_spin(&mut self) {
        self.spins_completed += 1;
        self.enter_idle();
    }

    fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        let enabled = self.mode == OutcomeMode::GuaranteedWin;
        log::info!("Guaranteed-win mode {}", if enabled { "enabled" } else { "disabled" });
        emit(&self.bus, GameSignal::CheatModeChanged(enabled));
    }

    fn handle(&mut self, input: FlowInput) {
        match input {
            FlowInput::ToggleCheat => self.toggle_mode(),
            FlowInput::PressSpin if self.state == GameFlowState::Idle => match self.enter_spinning() {
                Ok(true) => {}
                Ok(false) => {
                    log::warn!("Spin press ignored: reels still in flight");
                    self.listen_for_press();
                }
                Err(e) => {
                    log::error!("Spin failed: {}", e);
                    self.listen_for_press();
                }
            },
            FlowInput::PressSpin => log::warn!("Spin press ignored in {}", self.state),
        }
    }
}

impl Component for GameFlowController {
    fn awake(&mut self) {
        self.start();
    }

    fn update(&mut self, dt_ms: f64) {
        // drain before handling: handlers may queue more while we publish
        let inputs: Vec<FlowInput> = self.inbox.lock().drain(..).collect();
        for input in inputs {
            self.handle(input);
        }

        self.presenter.update(dt_ms);

        if self.state == GameFlowState::Spinning && self.spin_finished.swap(false, Ordering::AcqRel) {
            self.enter_presenting();
        }

        if self.state == GameFlowState::PresentingOutcome
            && self.presentation.as_ref().is_some_and(CompletionToken::is_complete)
        {
            self.finish_spin();
        }
    }
}

impl Drop for GameFlowController {
    fn drop(&mut self) {
        if let Some(id) = self.press_subscription.take() {
            self.bus.unsubscribe_id(topics::PRESS_SPIN, id);
        }
        if let Some(id) = self.cheat_subscription.take() {
            self.bus.unsubscribe_id(topics::TOGGLE_CHEAT, id);
        }
    }
}

impl fmt::Debug for GameFlowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameFlowController")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("spins_completed", &self.spins_completed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_start_grid;
    use crate::presentation::{InstantFeedback, StaggeredPresenter};
    use crate::timing::{PresentationTiming, SpinTiming};

    fn controller(bus: &Arc<GameBus>) -> GameFlowController {
        let choreographer = Arc::new(Mutex::new(
            SpinChoreographer::new(SpinTiming::turbo(), &default_start_grid()).with_seed(1),
        ));
        let presenter = StaggeredPresenter::new(InstantFeedback::default(), PresentationTiming::default());
        GameFlowController::new(
            bus.clone(),
            OutcomeGenerator::seeded(9),
            choreographer,
            Box::new(presenter),
        )
    }

    #[test]
    fn test_start_enters_idle_and_listens() {
        let bus = Arc::new(GameBus::new());
        let mut flow = controller(&bus);
        assert_eq!(bus.subscriber_count(topics::PRESS_SPIN), 0);

        flow.start();
        flow.start();
        assert_eq!(flow.state(), GameFlowState::Idle);
        assert_eq!(bus.subscriber_count(topics::PRESS_SPIN), 1);
        assert_eq!(bus.subscriber_count(topics::TOGGLE_CHEAT), 1);
    }

    #[test]
    fn test_press_is_queued_until_update() {
        let bus = Arc::new(GameBus::new());
        let mut flow = controller(&bus);
        flow.start();

        emit(&bus, GameSignal::PressSpin);
        emit(&bus, GameSignal::PressSpin);
        assert_eq!(flow.state(), GameFlowState::Idle);
        assert_eq!(flow.queued_inputs(), 1);

        flow.update(0.0);
        assert_eq!(flow.state(), GameFlowState::Spinning);
        assert!(flow.recent_grid().is_some());
        assert_eq!(bus.subscriber_count(topics::PRESS_SPIN), 0);
    }

    #[test]
    fn test_toggle_flips_mode_and_announces() {
        let bus = Arc::new(GameBus::new());
        let announced = Arc::new(Mutex::new(Vec::new()));
        let sink = announced.clone();
        bus.subscribe(topics::CHEAT_MODE_CHANGED, move |s: &GameSignal| sink.lock().push(*s));

        let mut flow = controller(&bus);
        flow.start();
        emit(&bus, GameSignal::ToggleCheat);
        flow.update(0.0);
        assert_eq!(flow.outcome_mode(), OutcomeMode::GuaranteedWin);
        emit(&bus, GameSignal::ToggleCheat);
        flow.update(0.0);
        assert_eq!(flow.outcome_mode(), OutcomeMode::Random);
        assert_eq!(
            *announced.lock(),
            vec![GameSignal::CheatModeChanged(true), GameSignal::CheatModeChanged(false)]
        );
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let bus = Arc::new(GameBus::new());
        {
            let mut flow = controller(&bus);
            flow.start();
        }
        assert_eq!(bus.subscriber_count(topics::PRESS_SPIN), 0);
        assert_eq!(bus.subscriber_count(topics::TOGGLE_CHEAT), 0);
    }

    #[test]
    fn test_stats_hit_rate() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        let win = WaysEvaluator::new().evaluate(&default_start_grid());
        stats.record(&win, OutcomeMode::Random);
        stats.record(&ResultMap::default(), OutcomeMode::GuaranteedWin);
        assert_eq!(stats.hit_rate(), 50.0);
        assert_eq!(stats.symbol_wins.get(&Symbol::High3), Some(&1));
        assert_eq!(stats.total_ways, 1);
        assert_eq!(stats.guaranteed_spins, 1);
    }
}
