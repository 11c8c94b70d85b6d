//! The synchronization engine.
//!
//! One engine instance per mounted observer. Every instance watching the
//! same caller shares a [`NotificationBus`] and a [`ProfileStore`]; each
//! paints its own [`RenderTarget`]. The instance that initiates a mutation
//! persists it and broadcasts once; every peer converges from the
//! notification alone, without writing anything back.

use std::collections::BTreeSet;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use derive_more::Display;
use futures::Stream;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info, warn};
use vellum_profile::{CallerId, Profile, ProfileId, ProfileStore, StoreError, ThemeSelector};
use vellum_theme::{EffectiveTheme, PresetCatalog, RenderTarget, applier};
use vellum_tokens::StyleToken;

use crate::config::EngineConfig;
use crate::editor::EditorSession;
use crate::error::{EngineError, Result};
use crate::notification::{BusEvent, NotificationBus, ThemeNotification, notification_stream};
use crate::registry::ProfileRegistry;

// ============================================================================
// States and outcomes
// ============================================================================

/// Where the engine is in its lifecycle.
///
/// `Applied` is the steady state. `Resolving`, `SwitchingProfile` and
/// `Reconciling` are transitional and short-lived; `NoProfile` (degraded,
/// placeholder rendering) and `Editing` persist until something ends them.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum EngineState {
    #[display("uninitialized")]
    Uninitialized,
    #[display("no-profile")]
    NoProfile,
    #[display("resolving")]
    Resolving,
    #[display("applied")]
    Applied,
    #[display("switching-profile")]
    SwitchingProfile,
    #[display("editing")]
    Editing,
    #[display("reconciling")]
    Reconciling,
}

/// What a profile switch did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The active profile changed and peers were notified.
    Switched,
    /// The target was already active; nothing was written or broadcast.
    AlreadyActive,
}

/// Token names and classes this engine currently holds on its target.
/// Retraction sweeps these along with the catalog universe, so values
/// outside the catalog (custom override names, preview residue) cannot
/// survive a repaint.
#[derive(Debug, Default)]
struct Painted {
    token_names: BTreeSet<String>,
    classes: BTreeSet<String>,
}

// ============================================================================
// Engine internals
// ============================================================================

pub(crate) struct EngineInner {
    pub(crate) registry: ProfileRegistry,
    pub(crate) catalog: PresetCatalog,
    pub(crate) target: Arc<dyn RenderTarget>,
    pub(crate) bus: Arc<NotificationBus>,
    pub(crate) origin: u64,
    pub(crate) config: EngineConfig,
    state: RwLock<EngineState>,
    painted: Mutex<Painted>,
    busy: AtomicBool,
    editing: AtomicBool,
    stopped: AtomicBool,
}

impl EngineInner {
    pub(crate) async fn state(&self) -> EngineState {
        *self.state.read().await
    }

    pub(crate) async fn set_state(&self, next: EngineState) {
        let mut state = self.state.write().await;
        if *state != next {
            debug!(from = %*state, to = %next, "engine state transition");
            *state = next;
        }
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing.load(Ordering::Acquire)
    }

    pub(crate) fn try_claim_editor(&self) -> Result<()> {
        if self
            .editing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::EditorOpen);
        }
        Ok(())
    }

    pub(crate) fn release_editor(&self) {
        self.editing.store(false, Ordering::Release);
    }

    pub(crate) fn try_begin_mutation(&self) -> Result<()> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::Busy);
        }
        Ok(())
    }

    /// Clear the busy flag once the settle delay has passed. Applies after
    /// failures too: a failed write settles like a successful one.
    pub(crate) fn finish_mutation(self: &Arc<Self>) {
        let delay = self.config.settle_delay;
        if delay.is_zero() {
            self.busy.store(false, Ordering::Release);
            return;
        }
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.busy.store(false, Ordering::Release);
            }
        });
    }

    /// The profile the surface should reflect: the active one, or the
    /// earliest-created while an active flag is still healing, or the
    /// placeholder when the caller owns nothing.
    pub(crate) async fn active_or_placeholder(&self) -> Profile {
        if let Some(active) = self.registry.current_active().await {
            return active;
        }
        match self.registry.profiles().await.into_iter().next() {
            Some(first) => first,
            None => Profile::placeholder(),
        }
    }

    /// Repaint the target with `effective`: retract the catalog's full token
    /// universe plus everything this engine painted before, apply the new
    /// tokens, then sweep-and-set classes the same way.
    pub(crate) async fn paint(&self, effective: &EffectiveTheme) {
        let mut painted = self.painted.lock().await;

        let mut retract: BTreeSet<&str> = StyleToken::all().iter().map(|t| t.name()).collect();
        retract.extend(painted.token_names.iter().map(String::as_str));
        applier::retract(self.target.as_ref(), retract.iter().copied());
        applier::apply(self.target.as_ref(), &effective.tokens);

        let mut remove: BTreeSet<&str> = self.catalog.class_universe().into_iter().collect();
        remove.extend(painted.classes.iter().map(String::as_str));
        applier::toggle_classes(
            self.target.as_ref(),
            effective.classes.iter().map(String::as_str),
            remove.iter().copied(),
        );

        painted.token_names = effective.tokens.names().map(str::to_string).collect();
        painted.classes = effective.classes.clone();
    }

    /// Paint one token directly, recording it so the next repaint retracts
    /// it. Preview staging only; bypasses the resolver.
    pub(crate) async fn preview_token(&self, name: &str, value: &str) {
        if self.is_stopped() {
            return;
        }
        let mut painted = self.painted.lock().await;
        self.target.set_token(name, value);
        painted.token_names.insert(name.to_string());
    }

    /// Repaint what resolution currently yields without touching the engine
    /// state. Used by preview-off, where the session stays in `Editing`.
    pub(crate) async fn repaint_committed(&self) {
        if self.is_stopped() {
            return;
        }
        let profile = self.active_or_placeholder().await;
        let effective = self.catalog.resolve(&profile);
        self.paint(&effective).await;
    }

    /// Resolve the current profile and repaint, ending in `final_state`.
    /// The only path that moves resolved themes onto the shared root.
    pub(crate) async fn resolve_and_apply(&self, final_state: EngineState) {
        if self.is_stopped() {
            return;
        }
        self.set_state(EngineState::Resolving).await;
        let profile = self.active_or_placeholder().await;
        let effective = self.catalog.resolve(&profile);
        debug!(
            profile = %profile.id,
            selector = %effective.selector,
            tokens = effective.tokens.len(),
            classes = effective.classes.len(),
            "applying resolved theme"
        );
        self.paint(&effective).await;
        self.set_state(final_state).await;
    }

    /// Re-resolve in response to a notification. Degraded engines stay
    /// degraded; everyone else returns to `Applied`.
    pub(crate) async fn reapply(&self) {
        let final_state = if self.state().await == EngineState::NoProfile {
            EngineState::NoProfile
        } else {
            EngineState::Applied
        };
        self.resolve_and_apply(final_state).await;
    }

    /// Re-resolve through the `Reconciling` state: editor close and lag
    /// recovery, where the surface may hold values resolution never produced.
    pub(crate) async fn reconcile(&self) {
        let final_state = if self.state().await == EngineState::NoProfile {
            EngineState::NoProfile
        } else {
            EngineState::Applied
        };
        self.set_state(EngineState::Reconciling).await;
        self.resolve_and_apply(final_state).await;
    }

    /// Broadcast under this engine's origin.
    pub(crate) fn publish(&self, notification: ThemeNotification) {
        self.bus.publish(self.origin, notification);
    }

    async fn handle_notification(&self, notification: ThemeNotification) {
        // While an editor session is open the preview owns the surface;
        // cache updates still land so the close-time reconciliation sees
        // what peers persisted in the meantime.
        let editing = self.is_editing();
        match notification {
            ThemeNotification::ProfileSwitched { profile_id } => {
                if !self.registry.mark_active_local(&profile_id).await {
                    debug!(profile = %profile_id, "switch notification for unknown profile, ignored");
                    return;
                }
                debug!(profile = %profile_id, "peer switched the active profile");
                if !editing {
                    self.reapply().await;
                }
            }
            ThemeNotification::SelectorChanged {
                profile_id,
                selector,
                overrides,
            } => {
                if !self
                    .registry
                    .apply_selector_local(&profile_id, &selector, overrides.as_ref())
                    .await
                {
                    debug!(profile = %profile_id, "selector notification for unknown profile, ignored");
                    return;
                }
                let about_active = self
                    .registry
                    .current_active()
                    .await
                    .is_some_and(|p| p.id == profile_id);
                if about_active && !editing {
                    self.reapply().await;
                }
            }
            ThemeNotification::AmbientChanged { scheme } => {
                debug!(%scheme, "ambient scheme changed");
                if !editing {
                    self.reapply().await;
                }
            }
        }
    }
}

// ============================================================================
// Public handle
// ============================================================================

/// Handle to a mounted engine. Cheap to clone; clones share the instance.
#[derive(Clone)]
pub struct ThemeEngine {
    inner: Arc<EngineInner>,
}

impl ThemeEngine {
    /// Start building an engine for one observer.
    pub fn builder(
        store: Arc<dyn ProfileStore>,
        caller: CallerId,
        target: Arc<dyn RenderTarget>,
    ) -> EngineBuilder {
        EngineBuilder {
            store,
            caller,
            target,
            bus: None,
            catalog: None,
            config: EngineConfig::default(),
        }
    }

    pub async fn state(&self) -> EngineState {
        self.inner.state().await
    }

    /// True while a mutation is in flight or settling.
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// The profile the surface currently reflects. In degraded mode this is
    /// the placeholder, which is never persisted.
    pub async fn active_profile(&self) -> Profile {
        if self.inner.state().await == EngineState::NoProfile {
            return Profile::placeholder();
        }
        self.inner.active_or_placeholder().await
    }

    /// Every profile the caller owns, in creation order.
    pub async fn profiles(&self) -> Vec<Profile> {
        self.inner.registry.profiles().await
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.inner.catalog
    }

    /// The bus this engine publishes on. Hand it to peers and external
    /// producers that should share the channel.
    pub fn bus(&self) -> Arc<NotificationBus> {
        self.inner.bus.clone()
    }

    /// What resolution currently yields, without repainting anything.
    pub async fn effective_theme(&self) -> EffectiveTheme {
        let profile = self.inner.active_or_placeholder().await;
        self.inner.catalog.resolve(&profile)
    }

    /// Subscribe to raw bus events, origin stamps included.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.inner.bus.subscribe()
    }

    /// Stream of notifications from every producer on the bus, this engine
    /// included.
    pub fn notifications(&self) -> Pin<Box<dyn Stream<Item = ThemeNotification> + Send>> {
        notification_stream(self.inner.bus.subscribe())
    }

    /// Make `target` the active profile, durably, and tell the peers.
    ///
    /// Switching to the already-active profile is a no-op: zero writes, zero
    /// broadcasts. A persistence failure leaves the previous profile active
    /// everywhere.
    pub async fn switch_profile(&self, target: &ProfileId) -> Result<SwitchOutcome> {
        let inner = &self.inner;
        match inner.state().await {
            EngineState::Uninitialized => return Err(EngineError::NotMounted),
            EngineState::NoProfile => return Err(EngineError::NoProfile),
            _ => {}
        }
        if inner.is_editing() {
            return Err(EngineError::EditorOpen);
        }

        // Idempotence guard, compared by id.
        if let Some(active) = inner.registry.current_active().await {
            if &active.id == target {
                debug!(profile = %target, "switch target already active");
                return Ok(SwitchOutcome::AlreadyActive);
            }
        }

        inner.try_begin_mutation()?;
        let result = Self::switch_profile_inner(inner, target).await;
        inner.finish_mutation();
        result
    }

    async fn switch_profile_inner(
        inner: &Arc<EngineInner>,
        target: &ProfileId,
    ) -> Result<SwitchOutcome> {
        inner.set_state(EngineState::SwitchingProfile).await;
        if let Err(err) = inner.registry.set_active(target).await {
            warn!(profile = %target, error = %err, "profile switch failed, staying on last-good state");
            inner.set_state(EngineState::Applied).await;
            return Err(err.into());
        }
        inner.publish(ThemeNotification::ProfileSwitched {
            profile_id: target.clone(),
        });
        inner.resolve_and_apply(EngineState::Applied).await;
        info!(profile = %target, "switched active profile");
        Ok(SwitchOutcome::Switched)
    }

    /// Change the active profile's selector: a preset id, `system`, or
    /// `custom` (meaningful when the profile already carries overrides).
    ///
    /// The candidate theme paints before the write round-trips. On failure
    /// the cache and store stay on the previous selector and the caller gets
    /// the error; the next reconciliation corrects the paint.
    pub async fn select_preset(&self, selector: ThemeSelector) -> Result<()> {
        let inner = &self.inner;
        match inner.state().await {
            EngineState::Uninitialized => return Err(EngineError::NotMounted),
            EngineState::NoProfile => return Err(EngineError::NoProfile),
            _ => {}
        }
        if inner.is_editing() {
            return Err(EngineError::EditorOpen);
        }

        inner.try_begin_mutation()?;
        let result = Self::select_preset_inner(inner, selector).await;
        inner.finish_mutation();
        result
    }

    async fn select_preset_inner(inner: &Arc<EngineInner>, selector: ThemeSelector) -> Result<()> {
        let Some(active) = inner.registry.current_active().await else {
            return Err(EngineError::NoProfile);
        };

        // Optimistic: paint the candidate before the write round-trips.
        let mut candidate = active.clone();
        candidate.selector = selector.clone();
        let effective = inner.catalog.resolve(&candidate);
        inner.set_state(EngineState::Resolving).await;
        inner.paint(&effective).await;
        inner.set_state(EngineState::Applied).await;

        if let Err(err) = inner
            .registry
            .update_selector(&active.id, &selector, None)
            .await
        {
            warn!(profile = %active.id, error = %err, "selector persist failed, cache stays on last-good");
            return Err(err.into());
        }
        inner.publish(ThemeNotification::SelectorChanged {
            profile_id: active.id.clone(),
            selector: selector.clone(),
            overrides: None,
        });
        info!(profile = %active.id, %selector, "selector persisted and announced");
        Ok(())
    }

    /// Open a live editor session against the active profile.
    ///
    /// At most one session per engine; while it is open the preview owns the
    /// render target and other mutations are refused.
    pub async fn open_editor(&self) -> Result<EditorSession> {
        let inner = &self.inner;
        match inner.state().await {
            EngineState::Uninitialized => return Err(EngineError::NotMounted),
            EngineState::NoProfile => return Err(EngineError::NoProfile),
            _ => {}
        }
        inner.try_claim_editor()?;
        let active = match inner.registry.current_active().await {
            Some(profile) => profile,
            None => {
                inner.release_editor();
                return Err(EngineError::NoProfile);
            }
        };
        inner.set_state(EngineState::Editing).await;
        info!(profile = %active.id, "editor session opened");
        Ok(EditorSession::new(inner.clone(), active))
    }

    /// Revert the shared root to a neutral state and stop responding to
    /// notifications. The handle is inert afterwards.
    pub async fn shutdown(&self) {
        self.inner.stopped.store(true, Ordering::Release);
        // paint() rather than resolve_and_apply(): resolution is gated on
        // the stopped flag, the neutral sweep must not be.
        self.inner.paint(&EffectiveTheme::system()).await;
        self.inner.set_state(EngineState::Uninitialized).await;
        info!("theme engine shut down");
    }

    fn spawn_listener(inner: &Arc<EngineInner>) {
        let mut rx = inner.bus.subscribe();
        let weak = Arc::downgrade(inner);
        let origin = inner.origin;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        // Skip our own notifications.
                        if event.origin == origin {
                            continue;
                        }
                        let Some(inner) = weak.upgrade() else { break };
                        if inner.is_stopped() {
                            break;
                        }
                        inner.handle_notification(event.notification).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "notification listener lagged, reconciling from cache");
                        let Some(inner) = weak.upgrade() else { break };
                        if inner.is_stopped() {
                            break;
                        }
                        inner.reconcile().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("notification listener stopped");
        });
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ThemeEngine`]. Store, caller and render target are
/// required; the bus defaults to a fresh one (pass a shared bus to make
/// engines peers), the catalog to the built-in presets.
pub struct EngineBuilder {
    store: Arc<dyn ProfileStore>,
    caller: CallerId,
    target: Arc<dyn RenderTarget>,
    bus: Option<Arc<NotificationBus>>,
    catalog: Option<PresetCatalog>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn bus(mut self, bus: Arc<NotificationBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn catalog(mut self, catalog: PresetCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    /// Load the caller's profiles, paint the active theme, and start the
    /// notification listener.
    ///
    /// # Errors
    ///
    /// [`EngineError::Authentication`] when the caller has no identity, the
    /// one mount failure that is fatal. A caller with zero profiles mounts
    /// fine in degraded placeholder mode.
    pub async fn mount(self) -> Result<ThemeEngine> {
        let bus = self
            .bus
            .unwrap_or_else(|| Arc::new(NotificationBus::with_capacity(self.config.channel_capacity)));
        let origin = bus.register_origin();
        let inner = Arc::new(EngineInner {
            registry: ProfileRegistry::new(self.store, self.caller),
            catalog: self.catalog.unwrap_or_default(),
            target: self.target,
            bus,
            origin,
            config: self.config,
            state: RwLock::new(EngineState::Uninitialized),
            painted: Mutex::new(Painted::default()),
            busy: AtomicBool::new(false),
            editing: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        });

        match inner.registry.load().await {
            Ok(()) => {
                if let Err(err) = inner.registry.active_profile().await {
                    // The earliest profile still renders; the flag heals on
                    // a later pass.
                    warn!(error = %err, "active-flag self-heal failed, continuing unhealed");
                }
                inner.resolve_and_apply(EngineState::Applied).await;
                info!(origin = inner.origin, "theme engine mounted");
            }
            Err(StoreError::Authentication) => return Err(EngineError::Authentication),
            Err(StoreError::NotFound { .. }) => {
                warn!("caller owns no profiles, rendering placeholder");
                inner.resolve_and_apply(EngineState::NoProfile).await;
            }
            Err(other) => return Err(other.into()),
        }

        ThemeEngine::spawn_listener(&inner);
        Ok(ThemeEngine { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_profile::InMemoryProfileStore;
    use vellum_theme::InMemoryRenderTarget;

    #[tokio::test]
    async fn test_mount_paints_the_active_profile() {
        let store = Arc::new(InMemoryProfileStore::new());
        let caller = CallerId::new("caller-a");
        let mut profile = Profile::with_selector("Alice", ThemeSelector::Named("tokyo-night".into()));
        profile.is_active = true;
        store.insert_profile(&caller, profile);

        let target = Arc::new(InMemoryRenderTarget::new());
        let engine = ThemeEngine::builder(store, caller, target.clone())
            .settle_delay(Duration::ZERO)
            .mount()
            .await
            .unwrap();

        assert_eq!(engine.state().await, EngineState::Applied);
        assert!(target.has_class("tokyo-night"));
        assert_eq!(target.token("--background").as_deref(), Some("hsl(225 27% 15%)"));
    }

    #[tokio::test]
    async fn test_mount_without_profiles_degrades() {
        let store = Arc::new(InMemoryProfileStore::new());
        let caller = CallerId::new("caller-a");
        store.register_caller(&caller);

        let target = Arc::new(InMemoryRenderTarget::new());
        let engine = ThemeEngine::builder(store, caller, target.clone())
            .settle_delay(Duration::ZERO)
            .mount()
            .await
            .unwrap();

        assert_eq!(engine.state().await, EngineState::NoProfile);
        assert!(engine.active_profile().await.id.is_placeholder());
        assert!(target.tokens().is_empty());
        assert!(target.classes().is_empty());
    }

    #[tokio::test]
    async fn test_mount_without_identity_fails() {
        let store = Arc::new(InMemoryProfileStore::new());
        let target = Arc::new(InMemoryRenderTarget::new());
        let result = ThemeEngine::builder(store, CallerId::new("nobody"), target)
            .mount()
            .await;
        assert!(matches!(result, Err(EngineError::Authentication)));
    }
}
