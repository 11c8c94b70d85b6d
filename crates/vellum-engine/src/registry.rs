//! The profile registry: a sorted in-memory view of one caller's profiles,
//! kept consistent with the durable store.
//!
//! The registry persists first and updates its cache only after the store
//! accepted the write, so a failed mutation leaves both sides on the last
//! successfully persisted state. Notification listeners use the `*_local`
//! methods instead: receivers converge on what a peer already persisted and
//! must not write it again.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use vellum_profile::{CallerId, Profile, ProfileId, ProfileStore, StoreError, ThemeSelector};
use vellum_tokens::TokenSet;

pub struct ProfileRegistry {
    store: Arc<dyn ProfileStore>,
    caller: CallerId,
    profiles: RwLock<Vec<Profile>>,
}

impl ProfileRegistry {
    pub fn new(store: Arc<dyn ProfileStore>, caller: CallerId) -> Self {
        Self {
            store,
            caller,
            profiles: RwLock::new(Vec::new()),
        }
    }

    pub fn caller(&self) -> &CallerId {
        &self.caller
    }

    /// Fetch the caller's profiles and replace the cache, ordered by
    /// creation time (id as tie-break).
    pub async fn load(&self) -> Result<(), StoreError> {
        let mut fetched = self.store.fetch_profiles_for_caller(&self.caller).await?;
        fetched.sort_by(|a, b| {
            a.created_at_millis
                .cmp(&b.created_at_millis)
                .then_with(|| a.id.cmp(&b.id))
        });
        let count = fetched.len();
        *self.profiles.write().await = fetched;
        debug!(caller = %self.caller, profiles = count, "profile registry loaded");
        Ok(())
    }

    /// Snapshot of every cached profile, in creation order.
    pub async fn profiles(&self) -> Vec<Profile> {
        self.profiles.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }

    pub async fn get(&self, id: &ProfileId) -> Option<Profile> {
        self.profiles.read().await.iter().find(|p| &p.id == id).cloned()
    }

    /// The cached active profile, if any. Never writes.
    pub async fn current_active(&self) -> Option<Profile> {
        self.profiles.read().await.iter().find(|p| p.is_active).cloned()
    }

    /// The active profile, self-healing the flag when the store lost it.
    ///
    /// With at least one profile and none marked active, the earliest-created
    /// becomes active with exactly one durable write. More than one marked
    /// active means an interrupted switch somewhere; the earliest-created of
    /// them wins and nothing is rewritten.
    pub async fn active_profile(&self) -> Result<Option<Profile>, StoreError> {
        {
            let profiles = self.profiles.read().await;
            let mut actives = profiles.iter().filter(|p| p.is_active);
            if let Some(active) = actives.next() {
                if actives.next().is_some() {
                    warn!(
                        profile = %active.id,
                        "multiple profiles marked active, using earliest-created"
                    );
                }
                return Ok(Some(active.clone()));
            }
        }

        let mut profiles = self.profiles.write().await;
        // A concurrent caller may have healed between the locks.
        if let Some(active) = profiles.iter().find(|p| p.is_active) {
            return Ok(Some(active.clone()));
        }
        let Some(earliest_id) = profiles.first().map(|p| p.id.clone()) else {
            return Ok(None);
        };
        self.store.write_active_flag(&earliest_id, true).await?;
        if let Some(first) = profiles.first_mut() {
            first.is_active = true;
        }
        info!(profile = %earliest_id, "no active profile, promoting earliest-created");
        Ok(profiles.first().cloned())
    }

    /// Make `target` the one active profile, durably.
    ///
    /// The target's flag is set before the previous flags are cleared, so the
    /// store never holds zero active profiles. A failure partway through can
    /// leave an extra active flag behind; the earliest-created active wins on
    /// the next load, and the cache stays on the previous state.
    pub async fn set_active(&self, target: &ProfileId) -> Result<(), StoreError> {
        let snapshot = self.profiles.read().await.clone();
        if !snapshot.iter().any(|p| &p.id == target) {
            return Err(StoreError::profile_not_found(target.as_str()));
        }

        self.write_flag_with_retry(target, true).await?;
        for previous in snapshot.iter().filter(|p| p.is_active && &p.id != target) {
            self.write_flag_with_retry(&previous.id, false).await?;
        }

        let mut profiles = self.profiles.write().await;
        for profile in profiles.iter_mut() {
            profile.is_active = profile.id == *target;
        }
        Ok(())
    }

    /// Move the cached active flag to `target` without touching the store.
    /// Returns false when the cache does not hold `target`.
    pub async fn mark_active_local(&self, target: &ProfileId) -> bool {
        let mut profiles = self.profiles.write().await;
        if !profiles.iter().any(|p| &p.id == target) {
            return false;
        }
        for profile in profiles.iter_mut() {
            profile.is_active = profile.id == *target;
        }
        true
    }

    /// Persist a profile's selector (and optionally overrides), then update
    /// the cache. `overrides` of `None` leaves stored overrides untouched.
    pub async fn update_selector(
        &self,
        id: &ProfileId,
        selector: &ThemeSelector,
        overrides: Option<&TokenSet>,
    ) -> Result<(), StoreError> {
        self.store.write_theme_selector(id, selector, overrides).await?;
        if !self.apply_selector_local(id, selector, overrides).await {
            debug!(profile = %id, "selector persisted for a profile missing from the cache");
        }
        Ok(())
    }

    /// Update a cached profile's selector without touching the store.
    /// Returns false when the cache does not hold the profile.
    pub async fn apply_selector_local(
        &self,
        id: &ProfileId,
        selector: &ThemeSelector,
        overrides: Option<&TokenSet>,
    ) -> bool {
        let mut profiles = self.profiles.write().await;
        let Some(profile) = profiles.iter_mut().find(|p| &p.id == id) else {
            return false;
        };
        profile.selector = selector.clone();
        if let Some(overrides) = overrides {
            profile.custom_overrides = overrides.clone();
        }
        true
    }

    async fn write_flag_with_retry(&self, id: &ProfileId, active: bool) -> Result<(), StoreError> {
        match self.store.write_active_flag(id, active).await {
            Err(err) if err.is_transient() => {
                warn!(profile = %id, error = %err, "transient flag write failed, retrying once");
                self.store.write_active_flag(id, active).await
            }
            other => other,
        }
    }
}
