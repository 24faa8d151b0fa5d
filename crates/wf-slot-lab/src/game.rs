//! Assembled game: bus, scheduler and the components wired together

use std::sync::Arc;

use parking_lot::Mutex;

use wf_core::WfResult;

use crate::choreographer::SpinChoreographer;
use crate::config::SlotConfig;
use crate::flow::GameFlowController;
use crate::outcome::OutcomeGenerator;
use crate::presentation::{GridLayout, OutcomePresenter};
use crate::scheduler::{ComponentScheduler, ComponentTag};
use crate::signals::{GameBus, GameSignal, emit};

/// A ready-to-tick slot game
///
/// The choreographer is registered before the flow controller, so a spin
/// that completes during a tick is picked up by the controller in that
/// same tick.
pub struct SlotGame {
    config: SlotConfig,
    layout: GridLayout,
    bus: Arc<GameBus>,
    scheduler: ComponentScheduler,
    choreographer: Arc<Mutex<SpinChoreographer>>,
    flow: Arc<Mutex<GameFlowController>>,
}

impl SlotGame {
    /// Validate the config and wire every component onto `bus`
    pub fn new(
        config: SlotConfig,
        bus: Arc<GameBus>,
        presenter: Box<dyn OutcomePresenter>,
    ) -> WfResult<Self> {
        config.validate()?;

        let mut choreographer = SpinChoreographer::new(config.timing.clone(), &config.start_grid);
        if let Some(seed) = config.seed {
            // keep filler symbols independent from outcome draws
            choreographer = choreographer.with_seed(seed.wrapping_add(1));
        }
        let choreographer = Arc::new(Mutex::new(choreographer));

        let generator = OutcomeGenerator::from_config(&config);
        let flow = Arc::new(Mutex::new(GameFlowController::new(
            bus.clone(),
            generator,
            choreographer.clone(),
            presenter,
        )));

        let mut scheduler = ComponentScheduler::new();
        scheduler.register(ComponentTag::CHOREOGRAPHER, choreographer.clone())?;
        scheduler.register(ComponentTag::GAME_FLOW, flow.clone())?;
        scheduler.awake_all();

        Ok(Self {
            layout: GridLayout::for_grid(config.grid),
            config,
            bus,
            scheduler,
            choreographer,
            flow,
        })
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    /// Screen layout of the configured grid
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn bus(&self) -> &Arc<GameBus> {
        &self.bus
    }

    pub fn scheduler(&self) -> &ComponentScheduler {
        &self.scheduler
    }

    pub fn choreographer(&self) -> &Arc<Mutex<SpinChoreographer>> {
        &self.choreographer
    }

    pub fn flow(&self) -> &Arc<Mutex<GameFlowController>> {
        &self.flow
    }

    /// Advance every component by one frame
    pub fn tick(&mut self, dt_ms: f64) {
        self.scheduler.tick(dt_ms);
    }

    /// Publish a spin press, as the spin button would
    pub fn press_spin(&self) -> usize {
        emit(&self.bus, GameSignal::PressSpin)
    }

    /// Publish a cheat toggle
    pub fn toggle_cheat(&self) -> usize {
        emit(&self.bus, GameSignal::ToggleCheat)
    }
}
