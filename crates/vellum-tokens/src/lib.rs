//! # Vellum Tokens
//!
//! The style token catalog for Vellum applications.
//!
//! Every themeable surface in Vellum is described by a fixed vocabulary of
//! custom-property tokens (`--background`, `--primary`, ...). This crate owns
//! that vocabulary plus the value containers and color helpers the rest of
//! the engine builds on.
//!
//! ## Features
//!
//! - **StyleToken**: the closed catalog of known tokens, grouped for editing
//! - **TokenSet**: an ordered name/value map that preserves unknown tokens
//! - **Color helpers**: fail-soft HSL <-> hex conversion for editor surfaces
//!
//! ## Example
//!
//! ```rust,ignore
//! use vellum_tokens::{StyleToken, TokenGroup, TokenSet};
//!
//! let mut overrides = TokenSet::new();
//! overrides.set(StyleToken::Background.name(), "225 27% 15%");
//!
//! for token in TokenGroup::Base.tokens() {
//!     println!("{}: {:?}", token.name(), overrides.get(token.name()));
//! }
//! ```

pub mod color;
pub mod set;
pub mod token;

// Re-exports
pub use color::{hex_to_hsl, hsl_to_hex};
pub use set::TokenSet;
pub use token::{StyleToken, TokenGroup};
