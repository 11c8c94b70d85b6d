//! # Vellum Profile
//!
//! Author profiles and the durable store contract for Vellum.
//!
//! Several author profiles share one rendering surface; each carries its own
//! theme selector and custom token overrides, and exactly one is active at a
//! time. This crate owns the profile model and the [`ProfileStore`] seam the
//! engine persists through.
//!
//! ## Features
//!
//! - **Profile / ProfileId / CallerId**: the persisted author record
//! - **ThemeSelector**: `system` / `custom` / named preset, stored as a string
//! - **ProfileStore trait**: the three durable operations the engine needs
//! - **InMemoryProfileStore**: DashMap-backed implementation for tests/demos
//! - **JsonProfileStore**: file-backed implementation for standalone use
//!
//! ## Example
//!
//! ```rust,ignore
//! use vellum_profile::{CallerId, InMemoryProfileStore, Profile, ProfileStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = InMemoryProfileStore::new();
//!     let caller = CallerId::new("session-1");
//!     store.insert_profile(&caller, Profile::new("Alice"));
//!
//!     let profiles = store.fetch_profiles_for_caller(&caller).await.unwrap();
//!     assert_eq!(profiles.len(), 1);
//! }
//! ```

pub mod error;
pub mod json;
pub mod memory;
pub mod profile;

// Re-exports
pub use error::StoreError;
pub use json::JsonProfileStore;
pub use memory::InMemoryProfileStore;
pub use profile::{CallerId, Profile, ProfileId, ThemeSelector};

use async_trait::async_trait;
use vellum_tokens::TokenSet;

/// Durable storage contract for author profiles.
///
/// The engine is the only writer that matters for convergence: notification
/// receivers never call back into the store. Implementations therefore only
/// need per-operation atomicity, not cross-process coordination.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch every profile owned by the calling identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Authentication`] when the caller has no valid
    /// identity, and [`StoreError::NotFound`] when the identity is valid but
    /// owns zero profiles. The two are distinct on purpose: the first is
    /// fatal to a mount, the second degrades to placeholder mode.
    async fn fetch_profiles_for_caller(&self, caller: &CallerId)
        -> Result<Vec<Profile>, StoreError>;

    /// Set or clear the active flag on one profile.
    async fn write_active_flag(&self, id: &ProfileId, active: bool) -> Result<(), StoreError>;

    /// Persist a profile's theme selector, and optionally its overrides.
    ///
    /// `overrides` of `None` means "leave the stored overrides untouched";
    /// it never means "clear them". Clearing is an explicit empty set.
    async fn write_theme_selector(
        &self,
        id: &ProfileId,
        selector: &ThemeSelector,
        overrides: Option<&TokenSet>,
    ) -> Result<(), StoreError>;
}
