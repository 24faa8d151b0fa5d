//! # wf-slot-lab: Ways-to-Win Slot Simulation Core
//!
//! Resolves symbol grids, evaluates them under the ways-to-win rule and
//! drives the spin choreography and game flow from a single frame clock.
//!
//! ## Features
//!
//! - **Outcome Generator**: Uniform random fills or a non-repeating pick from a win catalog
//! - **Ways Evaluator**: Left-to-right column runs of 3+, with leftover cells grouped as losses
//! - **Spin Choreographer**: Staggered column start/stop on a virtual timer queue
//! - **Game Flow**: Idle → Spinning → PresentingOutcome, driven by bus signals
//! - **Presentation Contract**: Completion tokens and staggered per-cell reveals
//!
//! ## Architecture
//!
//! ```text
//! frame clock ──► ComponentScheduler
//!                     │
//!                     ├── SpinChoreographer ──(on_complete)──┐
//!                     │                                      │
//!                     └── GameFlowController ◄───────────────┘
//!                             │      ▲
//!                             │      └── inbox ◄── EventBus ("press_spin", "toggle_cheat")
//!                             │
//!                             ├── OutcomeGenerator → Grid
//!                             ├── WaysEvaluator    → ResultMap
//!                             └── OutcomePresenter → CompletionToken
//! ```

pub mod choreographer;
pub mod config;
pub mod flow;
pub mod game;
pub mod outcome;
pub mod presentation;
pub mod scheduler;
pub mod signals;
pub mod timer;
pub mod timing;
pub mod ways;

pub use choreographer::*;
pub use config::*;
pub use flow::*;
pub use game::*;
pub use outcome::*;
pub use presentation::*;
pub use scheduler::*;
pub use signals::*;
pub use timer::*;
pub use timing::*;
pub use ways::*;
