//! The render-target seam.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// The one shared rendering root, as a capability.
///
/// The engine never reaches for an ambient global; whoever constructs it
/// hands in the target, and everything the engine paints goes through these
/// four operations. They are synchronous and infallible: a rendering surface
/// that can reject a property write has no useful failure mode to report.
///
/// Token names arrive with their `--` prefix. Ambient light/dark preference
/// is the target's own business; the engine paints the same thing regardless.
pub trait RenderTarget: Send + Sync {
    /// Set one custom property on the root.
    fn set_token(&self, name: &str, value: &str);

    /// Remove one custom property from the root.
    fn remove_token(&self, name: &str);

    /// Add one class to the root.
    fn add_class(&self, name: &str);

    /// Remove one class from the root.
    fn remove_class(&self, name: &str);
}

/// In-memory [`RenderTarget`] with snapshot accessors.
///
/// The stand-in for a real surface in tests, demos, and headless hosts that
/// still want to observe what would have been painted.
#[derive(Debug, Default)]
pub struct InMemoryRenderTarget {
    tokens: Mutex<BTreeMap<String, String>>,
    classes: Mutex<BTreeSet<String>>,
    mutation_count: AtomicUsize,
}

impl InMemoryRenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the currently set custom properties.
    pub fn tokens(&self) -> BTreeMap<String, String> {
        self.tokens.lock().unwrap().clone()
    }

    /// Snapshot of the current root classes.
    pub fn classes(&self) -> BTreeSet<String> {
        self.classes.lock().unwrap().clone()
    }

    /// Current value of one property.
    pub fn token(&self, name: &str) -> Option<String> {
        self.tokens.lock().unwrap().get(name).cloned()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.lock().unwrap().contains(name)
    }

    /// Number of mutation calls received, effective or not.
    pub fn mutation_count(&self) -> usize {
        self.mutation_count.load(Ordering::Relaxed)
    }
}

impl RenderTarget for InMemoryRenderTarget {
    fn set_token(&self, name: &str, value: &str) {
        self.mutation_count.fetch_add(1, Ordering::Relaxed);
        self.tokens
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_token(&self, name: &str) {
        self.mutation_count.fetch_add(1, Ordering::Relaxed);
        self.tokens.lock().unwrap().remove(name);
    }

    fn add_class(&self, name: &str) {
        self.mutation_count.fetch_add(1, Ordering::Relaxed);
        self.classes.lock().unwrap().insert(name.to_string());
    }

    fn remove_class(&self, name: &str) {
        self.mutation_count.fetch_add(1, Ordering::Relaxed);
        self.classes.lock().unwrap().remove(name);
    }
}

/// A [`RenderTarget`] that discards everything, for hosts with no surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderTarget;

impl RenderTarget for NullRenderTarget {
    fn set_token(&self, _name: &str, _value: &str) {}
    fn remove_token(&self, _name: &str) {}
    fn add_class(&self, _name: &str) {}
    fn remove_class(&self, _name: &str) {}
}
