//! In-memory profile store for tests, demos, and simulation.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use vellum_tokens::TokenSet;

use crate::error::StoreError;
use crate::profile::{CallerId, Profile, ProfileId, ThemeSelector};
use crate::ProfileStore;

/// In-memory implementation of [`ProfileStore`].
///
/// Callers are registered explicitly so both fetch failure modes are
/// reachable: an unregistered caller fails authentication, a registered
/// caller with zero profiles reports not-found.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<CallerId, Vec<Profile>>,
    write_count: AtomicUsize,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a caller identity with no profiles yet.
    pub fn register_caller(&self, caller: &CallerId) {
        self.profiles.entry(caller.clone()).or_default();
    }

    /// Add a profile under a caller, registering the caller if needed.
    pub fn insert_profile(&self, caller: &CallerId, profile: Profile) {
        self.profiles
            .entry(caller.clone())
            .or_default()
            .push(profile);
    }

    // ============================================================
    // Inspection (for tests and demos)
    // ============================================================

    /// Number of durable writes performed so far.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Current stored state of one profile, if present.
    pub fn profile(&self, id: &ProfileId) -> Option<Profile> {
        self.profiles
            .iter()
            .find_map(|entry| entry.value().iter().find(|p| &p.id == id).cloned())
    }

    fn with_profile_mut<R>(
        &self,
        id: &ProfileId,
        apply: impl FnOnce(&mut Profile) -> R,
    ) -> Result<R, StoreError> {
        for mut entry in self.profiles.iter_mut() {
            if let Some(profile) = entry.value_mut().iter_mut().find(|p| &p.id == id) {
                let result = apply(profile);
                self.write_count.fetch_add(1, Ordering::Relaxed);
                return Ok(result);
            }
        }
        Err(StoreError::profile_not_found(id.as_str()))
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch_profiles_for_caller(
        &self,
        caller: &CallerId,
    ) -> Result<Vec<Profile>, StoreError> {
        let Some(entry) = self.profiles.get(caller) else {
            return Err(StoreError::Authentication);
        };
        if entry.value().is_empty() {
            return Err(StoreError::not_found(caller.as_str()));
        }
        Ok(entry.value().clone())
    }

    async fn write_active_flag(&self, id: &ProfileId, active: bool) -> Result<(), StoreError> {
        debug!(profile = %id, active, "writing active flag");
        self.with_profile_mut(id, |profile| profile.is_active = active)
    }

    async fn write_theme_selector(
        &self,
        id: &ProfileId,
        selector: &ThemeSelector,
        overrides: Option<&TokenSet>,
    ) -> Result<(), StoreError> {
        debug!(profile = %id, selector = %selector, "writing theme selector");
        self.with_profile_mut(id, |profile| {
            profile.selector = selector.clone();
            if let Some(overrides) = overrides {
                profile.custom_overrides = overrides.clone();
            }
        })
    }
}
