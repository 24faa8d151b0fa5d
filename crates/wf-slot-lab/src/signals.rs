//! Game topics and payloads carried on the event bus

use serde::{Deserialize, Serialize};

use wf_event::EventBus;

use crate::flow::GameFlowState;

/// Topic names
pub mod topics {
    /// Player asked for a spin
    pub const PRESS_SPIN: &str = "press_spin";
    /// Player flipped guaranteed-win mode
    pub const TOGGLE_CHEAT: &str = "toggle_cheat";
    /// Game flow entered a new state
    pub const STATE_CHANGED: &str = "state_changed";
    /// Guaranteed-win mode changed
    pub const CHEAT_MODE_CHANGED: &str = "cheat_mode_changed";
}

/// Payload of every game topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GameSignal {
    PressSpin,
    ToggleCheat,
    StateChanged(GameFlowState),
    CheatModeChanged(bool),
}

impl GameSignal {
    /// Topic this signal is published on
    pub fn topic(&self) -> &'static str {
        match self {
            Self::PressSpin => topics::PRESS_SPIN,
            Self::ToggleCheat => topics::TOGGLE_CHEAT,
            Self::StateChanged(_) => topics::STATE_CHANGED,
            Self::CheatModeChanged(_) => topics::CHEAT_MODE_CHANGED,
        }
    }
}

/// Bus carrying [`GameSignal`]s
pub type GameBus = EventBus<GameSignal>;

/// Publish a signal on its own topic
pub fn emit(bus: &GameBus, signal: GameSignal) -> usize {
    bus.publish(signal.topic(), &signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_signals_route_to_their_topic() {
        let bus = GameBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for topic in [topics::PRESS_SPIN, topics::STATE_CHANGED] {
            let sink = seen.clone();
            bus.subscribe(topic, move |signal: &GameSignal| sink.lock().push(*signal));
        }

        assert_eq!(emit(&bus, GameSignal::PressSpin), 1);
        assert_eq!(emit(&bus, GameSignal::StateChanged(GameFlowState::Spinning)), 1);
        assert_eq!(emit(&bus, GameSignal::CheatModeChanged(true)), 0);
        assert_eq!(
            *seen.lock(),
            vec![GameSignal::PressSpin, GameSignal::StateChanged(GameFlowState::Spinning)]
        );
    }

    #[test]
    fn test_signal_json_shape() {
        let json = serde_json::to_string(&GameSignal::StateChanged(GameFlowState::PresentingOutcome)).unwrap();
        assert_eq!(json, r#"{"type":"state_changed","value":"presenting_outcome"}"#);
        let back: GameSignal = serde_json::from_str(r#"{"type":"press_spin"}"#).unwrap();
        assert_eq!(back, GameSignal::PressSpin);
    }
}
