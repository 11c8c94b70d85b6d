//! Live editor sessions.
//!
//! A session owns a working copy of the active profile's token overrides and
//! paints it directly, bypassing the resolver. Nothing is persisted and
//! nothing is broadcast until [`EditorSession::commit`]; cancel (explicit or
//! by drop) hands the surface back to resolution as if the session never
//! happened.

use std::sync::Arc;

use tracing::{debug, info, warn};
use vellum_profile::{Profile, ProfileId, ThemeSelector};
use vellum_theme::EffectiveTheme;
use vellum_tokens::TokenSet;

use crate::engine::{EngineInner, EngineState};
use crate::error::{EngineError, Result};
use crate::notification::ThemeNotification;

/// The working set starts from the profile's own overrides when it has any,
/// else from the tokens its current selection resolves to, so the editor
/// opens showing what the surface shows.
fn seed_working_set(profile: &Profile, committed: &EffectiveTheme) -> TokenSet {
    if !profile.custom_overrides.is_empty() {
        profile.custom_overrides.clone()
    } else {
        committed.tokens.clone()
    }
}

/// A scoped, cancelable preview over the active profile's theme.
///
/// Obtained from [`ThemeEngine::open_editor`](crate::ThemeEngine::open_editor);
/// at most one exists per engine. While the session is open it is the only
/// writer to the render target.
pub struct EditorSession {
    inner: Arc<EngineInner>,
    profile_id: ProfileId,
    working: TokenSet,
    previewing: bool,
    closed: bool,
}

impl EditorSession {
    pub(crate) fn new(inner: Arc<EngineInner>, active: Profile) -> Self {
        let committed = inner.catalog.resolve(&active);
        let working = seed_working_set(&active, &committed);
        Self {
            inner,
            profile_id: active.id,
            working,
            previewing: true,
            closed: false,
        }
    }

    /// The profile this session edits.
    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    /// The staged token values.
    pub fn working(&self) -> &TokenSet {
        &self.working
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stage one token edit. While previewing it paints immediately; it is
    /// never persisted or broadcast before [`commit`](Self::commit).
    pub async fn stage(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.ensure_open()?;
        let name = name.into();
        let value = value.into();
        self.working.set(name.clone(), value.clone());
        if self.previewing {
            self.inner.preview_token(&name, &value).await;
        }
        Ok(())
    }

    /// Toggle live preview. Off repaints the last-committed theme (the
    /// working set is kept); on paints the whole working set back.
    pub async fn set_previewing(&mut self, previewing: bool) -> Result<()> {
        self.ensure_open()?;
        if self.previewing == previewing {
            return Ok(());
        }
        self.previewing = previewing;
        if previewing {
            let inner = self.inner.clone();
            for (name, value) in self.working.iter() {
                inner.preview_token(name, value).await;
            }
        } else {
            self.inner.repaint_committed().await;
        }
        Ok(())
    }

    /// Persist the working set as the profile's custom theme, repaint
    /// through the resolver, and announce the change.
    ///
    /// Closes the session on success. On failure the session stays open
    /// with its previewed edits still painted, so the caller can retry or
    /// cancel.
    pub async fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.inner.is_stopped() {
            return Err(EngineError::NotMounted);
        }

        self.inner.try_begin_mutation()?;
        let result = self.commit_inner().await;
        self.inner.finish_mutation();
        result
    }

    async fn commit_inner(&mut self) -> Result<()> {
        let overrides = self.working.clone();
        if let Err(err) = self
            .inner
            .registry
            .update_selector(&self.profile_id, &ThemeSelector::Custom, Some(&overrides))
            .await
        {
            warn!(profile = %self.profile_id, error = %err, "commit failed, session stays open");
            return Err(err.into());
        }

        // Persisted; resolution owns the surface again.
        self.closed = true;
        self.inner.release_editor();
        self.inner.resolve_and_apply(EngineState::Applied).await;
        self.inner.publish(ThemeNotification::SelectorChanged {
            profile_id: self.profile_id.clone(),
            selector: ThemeSelector::Custom,
            overrides: Some(overrides),
        });
        info!(profile = %self.profile_id, tokens = self.working.len(), "custom theme committed");
        Ok(())
    }

    /// Discard the working set and restore the last-committed theme.
    pub async fn cancel(mut self) {
        self.cancel_in_place().await;
    }

    async fn cancel_in_place(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.inner.release_editor();
        if self.inner.is_stopped() {
            return;
        }
        debug!(profile = %self.profile_id, "editor session canceled");
        self.inner.reconcile().await;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(EngineError::EditorClosed);
        }
        Ok(())
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Dropping without commit or cancel is an implicit cancel.
        self.closed = true;
        self.inner.release_editor();
        if self.inner.is_stopped() {
            return;
        }
        let inner = self.inner.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("editor session dropped, reverting preview");
                handle.spawn(async move {
                    inner.reconcile().await;
                });
            }
            Err(_) => {
                warn!("editor session dropped outside a runtime; preview stays until the next reconciliation");
            }
        }
    }
}
