//! Engine configuration.

use std::time::Duration;

use crate::notification::DEFAULT_CHANNEL_CAPACITY;

/// Tunables for a [`ThemeEngine`](crate::ThemeEngine).
///
/// The defaults match interactive use; tests usually want
/// `settle_delay(Duration::ZERO)` so consecutive mutations do not
/// trip the busy guard.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// How long the busy flag stays set after a mutation finishes, success
    /// or failure. Lets a mutation visibly settle before the next one.
    pub settle_delay: Duration,

    /// Capacity of the notification channel, when the engine creates its
    /// own bus rather than joining a shared one.
    pub channel_capacity: usize,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(300),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
