//! WaysForge Event Bus
//!
//! Topic-based publish/subscribe used to decouple game-flow transitions
//! from whatever triggers them (input, choreography, presentation).
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use wf_event::EventBus;
//!
//! let bus: EventBus<u32> = EventBus::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//! bus.subscribe_once("spin", move |value: &u32| {
//!     counter.fetch_add(*value as usize, Ordering::SeqCst);
//! });
//!
//! bus.publish("spin", &2);
//! bus.publish("spin", &2);
//! assert_eq!(seen.load(Ordering::SeqCst), 2);
//! ```

pub mod bus;

pub use bus::{EventBus, Handler, SubscriptionId};
