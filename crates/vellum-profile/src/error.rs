//! Error types for the profile store.

use thiserror::Error;

/// Errors that can occur in profile store operations.
///
/// The first two variants carry meaning beyond "it failed": the engine mounts
/// differently depending on which one a fetch returns.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller has no valid identity. Fatal to a mount.
    #[error("authentication required")]
    Authentication,

    /// The caller is valid but owns zero profiles. Degrades, does not fail.
    #[error("no profiles found for caller: {caller}")]
    NotFound { caller: String },

    /// A write referenced a profile id the store does not hold.
    #[error("profile not found: {id}")]
    ProfileNotFound { id: String },

    /// The store could not complete a durable write.
    #[error("persistence failure: {reason}")]
    Persistence { reason: String, transient: bool },

    /// Error encoding or decoding the profile document.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error while reading or writing the backing file.
    #[error("I/O error: {0}")]
    Io(String),
}

impl StoreError {
    /// Create a NotFound error for a caller.
    pub fn not_found(caller: impl Into<String>) -> Self {
        Self::NotFound {
            caller: caller.into(),
        }
    }

    /// Create a ProfileNotFound error.
    pub fn profile_not_found(id: impl Into<String>) -> Self {
        Self::ProfileNotFound { id: id.into() }
    }

    /// Create a permanent persistence error.
    pub fn persistence(reason: impl Into<String>) -> Self {
        Self::Persistence {
            reason: reason.into(),
            transient: false,
        }
    }

    /// Create a transient persistence error (worth one retry).
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Persistence {
            reason: reason.into(),
            transient: true,
        }
    }

    /// True when retrying the operation once is reasonable.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Persistence {
                transient: true,
                ..
            }
        )
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
