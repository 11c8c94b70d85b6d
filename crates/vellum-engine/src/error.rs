//! Error types for the synchronization engine.

use thiserror::Error;
use vellum_profile::{ProfileId, StoreError};

/// Errors surfaced by engine operations.
///
/// Store failures are converted at the engine boundary; they never escape
/// into the render path. A failed mutation leaves the engine on the last
/// successfully persisted state.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No resolvable caller identity. Fatal to a mount.
    #[error("authentication required")]
    Authentication,

    /// The engine has been shut down, or was never mounted.
    #[error("engine is not mounted")]
    NotMounted,

    /// The engine is in degraded placeholder mode; there is no profile
    /// to switch, select on, or edit.
    #[error("no profile is mounted")]
    NoProfile,

    /// The requested profile is not in the registry.
    #[error("profile not found: {id}")]
    ProfileNotFound { id: ProfileId },

    /// A durable write failed. The engine stays on the last-good state.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// A previous mutation is still settling.
    #[error("engine is busy")]
    Busy,

    /// An editor session is already open; it owns the render target.
    #[error("an editor session is open")]
    EditorOpen,

    /// The editor session was already committed.
    #[error("editor session is closed")]
    EditorClosed,
}

impl EngineError {
    /// True when the operation may simply be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Persistence(_) | EngineError::Busy | EngineError::EditorOpen
        )
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Authentication => EngineError::Authentication,
            StoreError::NotFound { .. } => EngineError::NoProfile,
            StoreError::ProfileNotFound { id } => EngineError::ProfileNotFound {
                id: ProfileId::new(id),
            },
            other => EngineError::Persistence(other.to_string()),
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
