//! Selector resolution.

use std::collections::BTreeSet;

use tracing::debug;
use vellum_profile::{Profile, ThemeSelector};
use vellum_tokens::TokenSet;

use crate::preset::PresetCatalog;

/// What one profile's selection means for the shared surface: the root
/// classes to hold and the token values to set.
///
/// Derived on every resolution, never persisted. `selector` records what the
/// resolution landed on, which is not always what the profile asked for: a
/// dangling selector lands on `system`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveTheme {
    pub selector: ThemeSelector,
    pub classes: BTreeSet<String>,
    pub tokens: TokenSet,
}

impl EffectiveTheme {
    /// The `system` rendition: nothing painted, the surface's own ambient
    /// preference shows through.
    pub fn system() -> Self {
        Self {
            selector: ThemeSelector::System,
            classes: BTreeSet::new(),
            tokens: TokenSet::new(),
        }
    }

    /// True when this theme paints nothing at all.
    pub fn is_neutral(&self) -> bool {
        self.classes.is_empty() && self.tokens.is_empty()
    }
}

impl PresetCatalog {
    /// Resolve a profile's selection into an [`EffectiveTheme`].
    ///
    /// Precedence:
    /// 1. `custom` with non-empty overrides: the overrides, verbatim, no class;
    /// 2. a known catalog id: that entry's class and tokens;
    /// 3. anything else (`system`, an unknown id, or `custom` without
    ///    overrides): the neutral `system` rendition.
    ///
    /// Never fails. A selector that does not resolve is worth a log line,
    /// not an error: the stored value stays as it is and newer peers may
    /// understand it.
    pub fn resolve(&self, profile: &Profile) -> EffectiveTheme {
        match &profile.selector {
            ThemeSelector::Custom if !profile.custom_overrides.is_empty() => EffectiveTheme {
                selector: ThemeSelector::Custom,
                classes: BTreeSet::new(),
                tokens: profile.custom_overrides.clone(),
            },
            ThemeSelector::Custom => {
                debug!(profile = %profile.id, "custom selector without overrides, using system");
                EffectiveTheme::system()
            }
            ThemeSelector::Named(id) => match self.get(id) {
                Some(entry) => EffectiveTheme {
                    selector: ThemeSelector::Named(id.clone()),
                    classes: BTreeSet::from([entry.id.clone()]),
                    tokens: entry.tokens.clone(),
                },
                None => {
                    debug!(profile = %profile.id, selector = %id, "unknown selector, using system");
                    EffectiveTheme::system()
                }
            },
            ThemeSelector::System => EffectiveTheme::system(),
        }
    }
}
