//! File-backed profile store.
//!
//! Persists the whole profile document as one JSON file. Every mutation is
//! validated against a copy, written to a temp file, and renamed over the
//! old one, so the file on disk is always a complete, parseable document and
//! a failed write leaves both disk and memory on the previous state.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use vellum_tokens::TokenSet;

use crate::error::StoreError;
use crate::profile::{CallerId, Profile, ProfileId, ThemeSelector};
use crate::ProfileStore;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    callers: BTreeMap<String, Vec<Profile>>,
}

impl StoreDocument {
    fn profile_mut(&mut self, id: &ProfileId) -> Option<&mut Profile> {
        self.callers
            .values_mut()
            .flat_map(|profiles| profiles.iter_mut())
            .find(|p| &p.id == id)
    }
}

/// File-backed implementation of [`ProfileStore`].
pub struct JsonProfileStore {
    path: PathBuf,
    state: RwLock<StoreDocument>,
}

impl JsonProfileStore {
    /// Open a store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store; a file that exists but does not
    /// parse is an error, not data loss waiting to happen.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(err) => return Err(err.into()),
        };

        info!(path = %path.display(), "opened profile store");
        Ok(Self {
            path,
            state: RwLock::new(document),
        })
    }

    /// Register a caller identity with no profiles yet.
    pub async fn register_caller(&self, caller: &CallerId) -> Result<(), StoreError> {
        self.mutate(|doc| {
            doc.callers.entry(caller.as_str().to_string()).or_default();
            Ok(())
        })
        .await
    }

    /// Add a profile under a caller, registering the caller if needed.
    pub async fn insert_profile(
        &self,
        caller: &CallerId,
        profile: Profile,
    ) -> Result<(), StoreError> {
        self.mutate(|doc| {
            doc.callers
                .entry(caller.as_str().to_string())
                .or_default()
                .push(profile);
            Ok(())
        })
        .await
    }

    /// Apply a mutation to a copy, persist it, then commit it to memory.
    async fn mutate<R>(
        &self,
        apply: impl FnOnce(&mut StoreDocument) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let result = apply(&mut next)?;
        self.persist(&next).await?;
        *state = next;
        Ok(result)
    }

    async fn persist(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(document)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = json.len(), "persisted profile document");
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonProfileStore {
    async fn fetch_profiles_for_caller(
        &self,
        caller: &CallerId,
    ) -> Result<Vec<Profile>, StoreError> {
        let state = self.state.read().await;
        let Some(profiles) = state.callers.get(caller.as_str()) else {
            return Err(StoreError::Authentication);
        };
        if profiles.is_empty() {
            return Err(StoreError::not_found(caller.as_str()));
        }
        Ok(profiles.clone())
    }

    async fn write_active_flag(&self, id: &ProfileId, active: bool) -> Result<(), StoreError> {
        self.mutate(|doc| {
            let profile = doc
                .profile_mut(id)
                .ok_or_else(|| StoreError::profile_not_found(id.as_str()))?;
            profile.is_active = active;
            Ok(())
        })
        .await
    }

    async fn write_theme_selector(
        &self,
        id: &ProfileId,
        selector: &ThemeSelector,
        overrides: Option<&TokenSet>,
    ) -> Result<(), StoreError> {
        self.mutate(|doc| {
            let profile = doc
                .profile_mut(id)
                .ok_or_else(|| StoreError::profile_not_found(id.as_str()))?;
            profile.selector = selector.clone();
            if let Some(overrides) = overrides {
                profile.custom_overrides = overrides.clone();
            }
            Ok(())
        })
        .await
    }
}
