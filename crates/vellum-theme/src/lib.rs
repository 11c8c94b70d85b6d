//! # Vellum Theme
//!
//! Theme resolution and render-target application for Vellum.
//!
//! A profile says *what it wants* (`system`, a preset id, or `custom`); this
//! crate turns that into *what the surface gets*: an [`EffectiveTheme`] of
//! classes and token values, and the applier that paints it onto a
//! [`RenderTarget`] without leaking state from whatever was painted before.
//!
//! ## Features
//!
//! - **PresetCatalog**: the built-in base themes and presets, with resolution
//! - **EffectiveTheme**: the derived classes + tokens for one profile
//! - **RenderTarget trait**: the injected capability for the shared root
//! - **Applier**: idempotent apply / retract / class-toggle primitives
//!
//! ## Example
//!
//! ```rust,ignore
//! use vellum_profile::Profile;
//! use vellum_theme::{applier, InMemoryRenderTarget, PresetCatalog};
//!
//! let catalog = PresetCatalog::default();
//! let target = InMemoryRenderTarget::new();
//!
//! let profile = Profile::with_selector("Alice", "tokyo-night".into());
//! let effective = catalog.resolve(&profile);
//! applier::apply(&target, &effective.tokens);
//! ```

pub mod applier;
pub mod preset;
pub mod resolve;
pub mod target;

// Re-exports
pub use preset::{PresetCatalog, PresetKind, ThemePreset};
pub use resolve::EffectiveTheme;
pub use target::{InMemoryRenderTarget, NullRenderTarget, RenderTarget};
