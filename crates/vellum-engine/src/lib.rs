//! # Vellum Engine
//!
//! Multi-profile theme resolution and synchronization for one shared
//! rendering surface.
//!
//! Several author profiles, each with its own theme selection, take turns on
//! the same surface. The engine decides which selection is in effect,
//! paints it without leaking state from the previous one, persists edits
//! through a [`ProfileStore`], and keeps every mounted observer converged
//! through one notification bus: the instance that initiates a change
//! persists and broadcasts once, every peer converges locally and writes
//! nothing.
//!
//! ## Features
//!
//! - **ThemeEngine**: mount, switch profiles, select presets, shut down
//! - **EditorSession**: stage live token edits, then commit or cancel
//! - **NotificationBus**: one channel for engine, ambient, and cross-tab
//!   producers
//! - **ProfileRegistry**: cached profiles with a self-healing active flag
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vellum_engine::{CallerId, InMemoryRenderTarget, Profile, ThemeEngine};
//! use vellum_profile::InMemoryProfileStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryProfileStore::new());
//!     let caller = CallerId::new("session-1");
//!     store.insert_profile(&caller, Profile::new("Alice"));
//!
//!     let target = Arc::new(InMemoryRenderTarget::new());
//!     let engine = ThemeEngine::builder(store, caller, target).mount().await?;
//!
//!     let mut editor = engine.open_editor().await?;
//!     editor.stage("--primary", "hsl(250 95% 76%)").await?;
//!     editor.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod notification;
pub mod registry;

// Re-exports
pub use config::EngineConfig;
pub use editor::EditorSession;
pub use engine::{EngineBuilder, EngineState, SwitchOutcome, ThemeEngine};
pub use error::{EngineError, Result};
pub use notification::{
    AmbientScheme, BusEvent, NotificationBus, ThemeNotification, notification_stream,
};
pub use registry::ProfileRegistry;

// Types that appear in the engine's public API.
pub use vellum_profile::{CallerId, Profile, ProfileId, ProfileStore, StoreError, ThemeSelector};
pub use vellum_theme::{
    EffectiveTheme, InMemoryRenderTarget, NullRenderTarget, PresetCatalog, RenderTarget,
    ThemePreset,
};
pub use vellum_tokens::{StyleToken, TokenGroup, TokenSet};
