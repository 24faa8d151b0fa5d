//! Component scheduler
//!
//! Holds every tickable part of the game and drives it from one frame
//! clock: awake once, then update every tick, always in registration order.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use wf_core::{WfError, WfResult};

/// Anything driven by the frame clock
pub trait Component: Send {
    /// Called once before the first update
    fn awake(&mut self) {}

    /// Advance by `dt_ms` of virtual time
    fn update(&mut self, dt_ms: f64);
}

/// Shared handle to a registered component
pub type SharedComponent = Arc<Mutex<dyn Component>>;

/// Registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTag(&'static str);

impl ComponentTag {
    pub const CHOREOGRAPHER: Self = Self("choreographer");
    pub const GAME_FLOW: Self = Self("game_flow");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

struct Slot {
    tag: ComponentTag,
    component: SharedComponent,
    awake: bool,
}

/// Ordered registry of components
#[derive(Default)]
pub struct ComponentScheduler {
    slots: Vec<Slot>,
    elapsed_ms: f64,
}

impl ComponentScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under a unique tag
    pub fn register(&mut self, tag: ComponentTag, component: SharedComponent) -> WfResult<()> {
        if self.contains(tag) {
            return Err(WfError::DuplicateComponent(tag.to_string()));
        }
        log::debug!("Registered component '{}'", tag);
        self.slots.push(Slot {
            tag,
            component,
            awake: false,
        });
        Ok(())
    }

    /// Unregister, returning the handle
    pub fn remove(&mut self, tag: ComponentTag) -> Option<SharedComponent> {
        let index = self.slots.iter().position(|s| s.tag == tag)?;
        Some(self.slots.remove(index).component)
    }

    pub fn get(&self, tag: ComponentTag) -> Option<SharedComponent> {
        self.slots
            .iter()
            .find(|s| s.tag == tag)
            .map(|s| Arc::clone(&s.component))
    }

    pub fn contains(&self, tag: ComponentTag) -> bool {
        self.slots.iter().any(|s| s.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Tags in registration order
    pub fn tags(&self) -> Vec<ComponentTag> {
        self.slots.iter().map(|s| s.tag).collect()
    }

    /// Total virtual time ticked so far
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Awake every component that has not been awoken yet
    pub fn awake_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| !s.awake) {
            slot.component.lock().awake();
            slot.awake = true;
        }
    }

    /// One frame: awake late registrants, then update everything
    pub fn tick(&mut self, dt_ms: f64) {
        self.awake_all();
        self.elapsed_ms += dt_ms;
        for slot in &self.slots {
            slot.component.lock().update(dt_ms);
        }
    }
}

impl fmt::Debug for ComponentScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentScheduler")
            .field("components", &self.tags())
            .field("elapsed_ms", &self.elapsed_ms)
            .finish()
    }
}
