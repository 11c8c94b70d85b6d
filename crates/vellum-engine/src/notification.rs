//! The change-notification channel.
//!
//! Everything that can move the rendered theme funnels through one broadcast
//! bus: engine-initiated switches and commits, ambient color-scheme flips,
//! and cross-tab selector changes all arrive as [`ThemeNotification`]s.
//! Receivers are response-only: they converge locally and never re-broadcast
//! merely because they reconciled.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::Display;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use vellum_profile::{ProfileId, ThemeSelector};
use vellum_tokens::TokenSet;

/// Default capacity of the notification channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 512;

/// Origin id stamped on notifications from outside any engine: ambient
/// preference producers, cross-tab storage watchers, tests.
pub const EXTERNAL_ORIGIN: u64 = 0;

// ============================================================================
// Notifications
// ============================================================================

/// The ambient color-scheme preference of the environment.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientScheme {
    #[display("light")]
    Light,
    #[display("dark")]
    Dark,
}

/// A change one produced and every peer must converge on.
///
/// An absent `overrides` field means "no change to override data", never
/// "clear overrides"; clearing is an explicit empty set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ThemeNotification {
    /// A different profile became active.
    ProfileSwitched { profile_id: ProfileId },

    /// The active selection changed on one profile.
    SelectorChanged {
        profile_id: ProfileId,
        selector: ThemeSelector,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        overrides: Option<TokenSet>,
    },

    /// The environment's color-scheme preference flipped.
    AmbientChanged { scheme: AmbientScheme },
}

impl ThemeNotification {
    /// The profile this notification is about, if it is about one.
    pub fn profile_id(&self) -> Option<&ProfileId> {
        match self {
            ThemeNotification::ProfileSwitched { profile_id } => Some(profile_id),
            ThemeNotification::SelectorChanged { profile_id, .. } => Some(profile_id),
            ThemeNotification::AmbientChanged { .. } => None,
        }
    }
}

/// A notification stamped with the origin that published it, so engines can
/// skip their own messages.
#[derive(Clone, Debug)]
pub struct BusEvent {
    pub origin: u64,
    pub notification: ThemeNotification,
}

// ============================================================================
// Bus
// ============================================================================

/// Broadcast channel shared by every engine and external producer that
/// observes the same surface.
pub struct NotificationBus {
    tx: broadcast::Sender<BusEvent>,
    next_origin: AtomicU64,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            // Origin 0 is reserved for external producers.
            next_origin: AtomicU64::new(EXTERNAL_ORIGIN + 1),
        }
    }

    /// Allocate a fresh origin id for a publisher.
    pub fn register_origin(&self) -> u64 {
        self.next_origin.fetch_add(1, Ordering::Relaxed)
    }

    /// Publish a notification under the given origin.
    pub fn publish(&self, origin: u64, notification: ThemeNotification) {
        let event = BusEvent {
            origin,
            notification,
        };
        if self.tx.send(event).is_err() {
            debug!("notification published with no subscribers");
        }
    }

    /// Publish a notification from outside any engine.
    pub fn publish_external(&self, notification: ThemeNotification) {
        self.publish(EXTERNAL_ORIGIN, notification);
    }

    /// Announce an ambient color-scheme change.
    pub fn publish_ambient(&self, scheme: AmbientScheme) {
        self.publish_external(ThemeNotification::AmbientChanged { scheme });
    }

    /// Subscribe to raw bus events, origin stamps included.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a bus receiver into a stream of notifications.
///
/// Lagged receivers skip what they missed and keep going; the stream ends
/// when the bus is dropped.
pub fn notification_stream(
    mut rx: broadcast::Receiver<BusEvent>,
) -> Pin<Box<dyn Stream<Item = ThemeNotification> + Send>> {
    Box::pin(async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => yield event.notification,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification stream lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_origins_are_unique_and_never_external() {
        let bus = NotificationBus::new();
        let a = bus.register_origin();
        let b = bus.register_origin();
        assert_ne!(a, b);
        assert_ne!(a, EXTERNAL_ORIGIN);
        assert_ne!(b, EXTERNAL_ORIGIN);
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let bus = NotificationBus::new();
        bus.publish_ambient(AmbientScheme::Dark);
    }

    #[tokio::test]
    async fn test_subscribers_see_origin_stamps() {
        let bus = NotificationBus::new();
        let origin = bus.register_origin();
        let mut rx = bus.subscribe();

        bus.publish(
            origin,
            ThemeNotification::ProfileSwitched {
                profile_id: ProfileId::new("p1"),
            },
        );
        bus.publish_ambient(AmbientScheme::Light);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.origin, origin);
        assert_eq!(
            first.notification.profile_id(),
            Some(&ProfileId::new("p1"))
        );

        let second = rx.recv().await.unwrap();
        assert_eq!(second.origin, EXTERNAL_ORIGIN);
        assert_eq!(second.notification.profile_id(), None);
    }

    #[tokio::test]
    async fn test_notification_stream_ends_when_bus_drops() {
        let bus = NotificationBus::new();
        let mut stream = notification_stream(bus.subscribe());

        bus.publish_ambient(AmbientScheme::Dark);
        let item = stream.next().await;
        assert_eq!(
            item,
            Some(ThemeNotification::AmbientChanged {
                scheme: AmbientScheme::Dark
            })
        );

        drop(bus);
        assert_eq!(stream.next().await, None);
    }

    #[test]
    fn test_absent_overrides_are_not_serialized() {
        let with_none = ThemeNotification::SelectorChanged {
            profile_id: ProfileId::new("p1"),
            selector: ThemeSelector::Named("nord".to_string()),
            overrides: None,
        };
        let json = serde_json::to_string(&with_none).unwrap();
        assert!(!json.contains("overrides"));

        // And absence deserializes back to None, not to an empty set.
        let back: ThemeNotification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, with_none);
    }
}
