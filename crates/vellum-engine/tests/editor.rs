//! Live editor session tests
//!
//! Covers the preview lifecycle against in-memory collaborators:
//! - Preview isolation: staged edits paint, but never persist or broadcast
//! - Cancel restores exactly the pre-session surface
//! - Commit persists once, broadcasts once, and repaints through resolution
//! - Commit failure keeps the session open for retry
//! - The open session blocks every other mutation path

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::error::TryRecvError;
use vellum_engine::{
    CallerId, EngineError, EngineState, NotificationBus, Profile, ProfileId, ProfileStore,
    StoreError, ThemeEngine, ThemeNotification, ThemeSelector, TokenSet,
};
use vellum_profile::InMemoryProfileStore;
use vellum_theme::InMemoryRenderTarget;

// ============================================================================
// Helpers
// ============================================================================

const CALLER: &str = "caller-a";

fn active_profile(name: &str, selector: ThemeSelector) -> Profile {
    let mut profile = Profile::with_selector(name, selector);
    profile.created_at_millis = 10;
    profile.is_active = true;
    profile
}

fn seeded_store(profile: Profile) -> Arc<InMemoryProfileStore> {
    let store = Arc::new(InMemoryProfileStore::new());
    store.insert_profile(&CallerId::new(CALLER), profile);
    store
}

async fn mount_engine(
    store: Arc<InMemoryProfileStore>,
    target: Arc<InMemoryRenderTarget>,
) -> ThemeEngine {
    ThemeEngine::builder(store, CallerId::new(CALLER), target)
        .bus(Arc::new(NotificationBus::new()))
        .settle_delay(Duration::ZERO)
        .mount()
        .await
        .expect("engine should mount")
}

/// Poll a condition until it holds or a second passes.
async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

/// Store wrapper that fails selector writes on demand.
struct FailingStore {
    inner: InMemoryProfileStore,
    fail_selector_writes: AtomicBool,
}

impl FailingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryProfileStore::new(),
            fail_selector_writes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ProfileStore for FailingStore {
    async fn fetch_profiles_for_caller(
        &self,
        caller: &CallerId,
    ) -> Result<Vec<Profile>, StoreError> {
        self.inner.fetch_profiles_for_caller(caller).await
    }

    async fn write_active_flag(&self, id: &ProfileId, active: bool) -> Result<(), StoreError> {
        self.inner.write_active_flag(id, active).await
    }

    async fn write_theme_selector(
        &self,
        id: &ProfileId,
        selector: &ThemeSelector,
        overrides: Option<&TokenSet>,
    ) -> Result<(), StoreError> {
        if self.fail_selector_writes.load(Ordering::SeqCst) {
            return Err(StoreError::persistence("injected selector failure"));
        }
        self.inner.write_theme_selector(id, selector, overrides).await
    }
}

// ============================================================================
// Preview isolation
// ============================================================================

/// Staged edits mutate the render target, but nothing is persisted and
/// nothing is broadcast until commit.
#[tokio::test]
async fn test_preview_paints_without_persisting_or_broadcasting() {
    let store = seeded_store(active_profile(
        "Alice",
        ThemeSelector::Named("tokyo-night".into()),
    ));
    let target = Arc::new(InMemoryRenderTarget::new());
    let engine = mount_engine(store.clone(), target.clone()).await;
    let mut rx = engine.subscribe();
    assert_eq!(store.write_count(), 0);

    let mut editor = engine.open_editor().await.unwrap();
    assert_eq!(engine.state().await, EngineState::Editing);
    assert!(editor.is_previewing());

    editor.stage("--background", "hsl(0 0% 5%)").await.unwrap();
    editor.stage("--margin-glow", "hsl(48 95% 55%)").await.unwrap();

    // Painted immediately, catalog membership notwithstanding.
    assert_eq!(target.token("--background").as_deref(), Some("hsl(0 0% 5%)"));
    assert_eq!(target.token("--margin-glow").as_deref(), Some("hsl(48 95% 55%)"));

    // Zero writes, zero notifications.
    assert_eq!(store.write_count(), 0);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    editor.cancel().await;
}

/// Cancel restores exactly the token/class set that was present before the
/// session opened, staged unknown names included.
#[tokio::test]
async fn test_cancel_restores_the_presession_surface_exactly() {
    let store = seeded_store(active_profile(
        "Alice",
        ThemeSelector::Named("tokyo-night".into()),
    ));
    let target = Arc::new(InMemoryRenderTarget::new());
    let engine = mount_engine(store.clone(), target.clone()).await;

    let tokens_before = target.tokens();
    let classes_before = target.classes();

    let mut editor = engine.open_editor().await.unwrap();
    editor.stage("--background", "hsl(0 0% 5%)").await.unwrap();
    editor.stage("--margin-glow", "hsl(48 95% 55%)").await.unwrap();
    assert_ne!(target.tokens(), tokens_before);

    editor.cancel().await;

    assert_eq!(target.tokens(), tokens_before);
    assert_eq!(target.classes(), classes_before);
    assert_eq!(store.write_count(), 0);
    assert_eq!(engine.state().await, EngineState::Applied);
}

/// Dropping a session without commit or cancel is an implicit cancel.
#[tokio::test]
async fn test_dropped_session_reverts_the_preview() {
    let store = seeded_store(active_profile(
        "Alice",
        ThemeSelector::Named("nord".into()),
    ));
    let target = Arc::new(InMemoryRenderTarget::new());
    let engine = mount_engine(store, target.clone()).await;

    let tokens_before = target.tokens();

    let mut editor = engine.open_editor().await.unwrap();
    editor.stage("--margin-glow", "hsl(48 95% 55%)").await.unwrap();
    drop(editor);

    // The revert runs on a spawned task.
    assert!(
        wait_until(|| target.tokens() == tokens_before).await,
        "dropping the session should restore the committed surface"
    );

    // And the editor slot is free again.
    let editor = engine.open_editor().await.unwrap();
    editor.cancel().await;
}

// ============================================================================
// Preview toggle
// ============================================================================

/// Preview-off repaints the committed theme while keeping the working set;
/// preview-on paints the working set back.
#[tokio::test]
async fn test_preview_toggle_swaps_between_committed_and_working() {
    let store = seeded_store(active_profile(
        "Alice",
        ThemeSelector::Named("tokyo-night".into()),
    ));
    let target = Arc::new(InMemoryRenderTarget::new());
    let engine = mount_engine(store, target.clone()).await;

    let mut editor = engine.open_editor().await.unwrap();
    // Seeded from the resolved preset, so the editor opens on what shows.
    assert_eq!(editor.working().get("--background"), Some("hsl(225 27% 15%)"));

    editor.stage("--background", "hsl(0 0% 5%)").await.unwrap();
    assert_eq!(target.token("--background").as_deref(), Some("hsl(0 0% 5%)"));

    editor.set_previewing(false).await.unwrap();
    assert!(!editor.is_previewing());
    assert_eq!(target.token("--background").as_deref(), Some("hsl(225 27% 15%)"));
    assert_eq!(editor.working().get("--background"), Some("hsl(0 0% 5%)"));

    // Staging while preview is off updates the working set silently.
    editor.stage("--accent", "hsl(10 80% 60%)").await.unwrap();
    assert_eq!(target.token("--accent").as_deref(), Some("hsl(330 100% 65%)"));

    editor.set_previewing(true).await.unwrap();
    assert_eq!(target.token("--background").as_deref(), Some("hsl(0 0% 5%)"));
    assert_eq!(target.token("--accent").as_deref(), Some("hsl(10 80% 60%)"));

    editor.cancel().await;
}

// ============================================================================
// Commit
// ============================================================================

/// Commit persists `{custom, working set}` in one write, broadcasts one
/// notification carrying the overrides, and repaints through resolution.
#[tokio::test]
async fn test_commit_persists_broadcasts_and_repaints() {
    let profile = active_profile("Alice", ThemeSelector::Named("nord".into()));
    let profile_id = profile.id.clone();
    let store = seeded_store(profile);
    let target = Arc::new(InMemoryRenderTarget::new());
    let engine = mount_engine(store.clone(), target.clone()).await;
    let mut rx = engine.subscribe();
    assert!(target.has_class("nord"));

    let mut editor = engine.open_editor().await.unwrap();
    editor.stage("--primary", "hsl(1 2% 3%)").await.unwrap();
    editor.commit().await.unwrap();
    assert!(editor.is_closed());

    // Persisted: one selector write.
    assert_eq!(store.write_count(), 1);
    let stored = store.profile(&profile_id).unwrap();
    assert_eq!(stored.selector, ThemeSelector::Custom);
    assert_eq!(stored.custom_overrides.get("--primary"), Some("hsl(1 2% 3%)"));

    // Broadcast: the selector change, overrides attached.
    let event = rx.try_recv().unwrap();
    let mut expected = TokenSet::new();
    expected.set("--primary", "hsl(1 2% 3%)");
    assert_eq!(
        event.notification,
        ThemeNotification::SelectorChanged {
            profile_id,
            selector: ThemeSelector::Custom,
            overrides: Some(expected),
        }
    );

    // Repainted through resolution: custom tokens only, preset class gone.
    assert_eq!(target.tokens().len(), 1);
    assert_eq!(target.token("--primary").as_deref(), Some("hsl(1 2% 3%)"));
    assert!(target.classes().is_empty());
    assert_eq!(engine.state().await, EngineState::Applied);

    // The session is spent.
    let result = editor.stage("--accent", "hsl(2 3% 4%)").await;
    assert!(matches!(result, Err(EngineError::EditorClosed)));
}

/// A failed commit keeps the session open with its preview painted; nothing
/// is broadcast and the stored profile is untouched. Retrying after the
/// fault clears succeeds.
#[tokio::test]
async fn test_commit_failure_keeps_the_session_open() {
    let store = Arc::new(FailingStore::new());
    let caller = CallerId::new(CALLER);
    let profile = active_profile("Alice", ThemeSelector::Named("tokyo-night".into()));
    let profile_id = profile.id.clone();
    store.inner.insert_profile(&caller, profile);

    let target = Arc::new(InMemoryRenderTarget::new());
    let engine = ThemeEngine::builder(store.clone(), caller, target.clone())
        .settle_delay(Duration::ZERO)
        .mount()
        .await
        .unwrap();
    let mut rx = engine.subscribe();

    let mut editor = engine.open_editor().await.unwrap();
    editor.stage("--primary", "hsl(1 2% 3%)").await.unwrap();

    store.fail_selector_writes.store(true, Ordering::SeqCst);
    let result = editor.commit().await;
    assert!(matches!(result, Err(EngineError::Persistence(_))));

    // Still open, preview still painted, nothing durable or broadcast moved.
    assert!(!editor.is_closed());
    assert_eq!(target.token("--primary").as_deref(), Some("hsl(1 2% 3%)"));
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(
        store.inner.profile(&profile_id).unwrap().selector,
        ThemeSelector::Named("tokyo-night".into())
    );
    assert_eq!(engine.active_profile().await.selector, ThemeSelector::Named("tokyo-night".into()));

    // The caller can keep editing and retry.
    editor.stage("--accent", "hsl(2 3% 4%)").await.unwrap();
    store.fail_selector_writes.store(false, Ordering::SeqCst);
    editor.commit().await.unwrap();

    let stored = store.inner.profile(&profile_id).unwrap();
    assert_eq!(stored.selector, ThemeSelector::Custom);
    assert_eq!(stored.custom_overrides.get("--accent"), Some("hsl(2 3% 4%)"));
    let event = rx.try_recv().unwrap();
    assert!(matches!(
        event.notification,
        ThemeNotification::SelectorChanged { .. }
    ));
}

/// Commit seeds from the profile's own overrides when it has them, so an
/// unedited commit round-trips the existing custom theme.
#[tokio::test]
async fn test_commit_preserves_existing_overrides_when_unedited() {
    let mut profile = active_profile("Alice", ThemeSelector::Custom);
    profile.custom_overrides.set("--primary", "hsl(1 2% 3%)");
    profile.custom_overrides.set("--reader-ink", "hsl(30 10% 20%)");
    let profile_id = profile.id.clone();
    let overrides_before = profile.custom_overrides.clone();

    let store = seeded_store(profile);
    let target = Arc::new(InMemoryRenderTarget::new());
    let engine = mount_engine(store.clone(), target.clone()).await;

    let mut editor = engine.open_editor().await.unwrap();
    assert_eq!(editor.working(), &overrides_before);
    editor.commit().await.unwrap();

    let stored = store.profile(&profile_id).unwrap();
    assert_eq!(stored.custom_overrides, overrides_before);
    assert_eq!(target.tokens().len(), 2);
}

// ============================================================================
// Exclusivity
// ============================================================================

/// While a session is open it owns the surface: switches, preset
/// selections, and further sessions are all refused.
#[tokio::test]
async fn test_open_session_blocks_other_mutations() {
    let first = active_profile("First", ThemeSelector::Named("light".into()));
    let mut second = Profile::with_selector("Second", ThemeSelector::Named("nord".into()));
    second.created_at_millis = 20;
    let second_id = second.id.clone();

    let store = Arc::new(InMemoryProfileStore::new());
    let caller = CallerId::new(CALLER);
    store.insert_profile(&caller, first);
    store.insert_profile(&caller, second);

    let target = Arc::new(InMemoryRenderTarget::new());
    let engine = mount_engine(store.clone(), target).await;

    let editor = engine.open_editor().await.unwrap();

    assert!(matches!(
        engine.switch_profile(&second_id).await,
        Err(EngineError::EditorOpen)
    ));
    assert!(matches!(
        engine.select_preset(ThemeSelector::Named("dark".into())).await,
        Err(EngineError::EditorOpen)
    ));
    assert!(matches!(
        engine.open_editor().await,
        Err(EngineError::EditorOpen)
    ));
    assert_eq!(store.write_count(), 0);

    // Closing the session releases the lock.
    editor.cancel().await;
    assert_eq!(
        engine.switch_profile(&second_id).await.unwrap(),
        vellum_engine::SwitchOutcome::Switched
    );
}
