//! The built-in theme catalog.
//!
//! Base themes and presets both paint primarily through a root class named
//! after their id; stylesheets owned by the render surface do the rest. The
//! token maps carried by some entries are editor seeds and resolver output,
//! not a second source of truth for the stylesheet.

use derive_more::Display;
use vellum_tokens::TokenSet;

/// How an entry is presented: base themes sit at the top level of pickers,
/// presets behind a submenu.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum PresetKind {
    #[display("base")]
    Base,
    #[display("preset")]
    Preset,
}

/// One catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemePreset {
    /// Stable id; doubles as the root class name.
    pub id: String,
    pub name: String,
    pub kind: PresetKind,
    pub description: String,
    /// Preview swatch color, shown for presets.
    pub swatch: Option<String>,
    /// Token values for this entry, when it defines any.
    pub tokens: TokenSet,
}

impl ThemePreset {
    /// Create a base theme entry.
    pub fn base(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: PresetKind::Base,
            description: description.into(),
            swatch: None,
            tokens: TokenSet::new(),
        }
    }

    /// Create a preset entry with a preview swatch.
    pub fn preset(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        swatch: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: PresetKind::Preset,
            description: description.into(),
            swatch: Some(swatch.into()),
            tokens: TokenSet::new(),
        }
    }

    /// Attach token values to the entry.
    pub fn with_tokens(mut self, tokens: TokenSet) -> Self {
        self.tokens = tokens;
        self
    }
}

/// The catalog of themes a profile can select by name.
///
/// `Default` builds the built-in set; a custom catalog can be assembled with
/// [`PresetCatalog::new`].
#[derive(Clone, Debug)]
pub struct PresetCatalog {
    entries: Vec<ThemePreset>,
}

impl PresetCatalog {
    pub fn new(entries: Vec<ThemePreset>) -> Self {
        Self { entries }
    }

    /// Look an entry up by id.
    pub fn get(&self, id: &str) -> Option<&ThemePreset> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All entries, in picker order.
    pub fn iter(&self) -> impl Iterator<Item = &ThemePreset> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every root class any entry could have applied.
    ///
    /// This is the removal set for class toggling: retracting exactly these
    /// before adding the next class is what guarantees no residue survives a
    /// theme change.
    pub fn class_universe(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.id.as_str()).collect()
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        let light_tokens: TokenSet = [
            ("--background", "hsl(0 0% 100%)"),
            ("--foreground", "hsl(222 47% 11%)"),
            ("--primary", "hsl(222 47% 11%)"),
            ("--secondary", "hsl(210 40% 96%)"),
            ("--accent", "hsl(262 83% 58%)"),
            ("--muted", "hsl(210 40% 96%)"),
            ("--card", "hsl(0 0% 100%)"),
            ("--border", "hsl(214 32% 91%)"),
        ]
        .into_iter()
        .collect();

        let tokyo_night_tokens: TokenSet = [
            ("--background", "hsl(225 27% 15%)"),
            ("--foreground", "hsl(220 14% 85%)"),
            ("--primary", "hsl(250 95% 76%)"),
            ("--secondary", "hsl(180 70% 48%)"),
            ("--accent", "hsl(330 100% 65%)"),
            ("--muted", "hsl(235 25% 25%)"),
            ("--card", "hsl(225 27% 18%)"),
            ("--border", "hsl(235 25% 30%)"),
        ]
        .into_iter()
        .collect();

        Self::new(vec![
            ThemePreset::base("light", "Light", "Clean light theme with good contrast")
                .with_tokens(light_tokens),
            ThemePreset::base("dark", "Dark", "Dark theme for reduced eye strain"),
            ThemePreset::preset(
                "tokyo-night",
                "Tokyo Night",
                "Deep blues with vibrant accents",
                "hsl(225, 27%, 15%)",
            )
            .with_tokens(tokyo_night_tokens),
            ThemePreset::preset(
                "nord",
                "Nord",
                "Cool blue-gray with soft colors",
                "hsl(220, 16%, 22%)",
            ),
            ThemePreset::preset(
                "dracula",
                "Dracula",
                "Dark purple with vibrant highlights",
                "hsl(231, 15%, 18%)",
            ),
            ThemePreset::preset(
                "solarized",
                "Solarized",
                "Teal-based theme with warm accents",
                "hsl(194, 14%, 20%)",
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = PresetCatalog::default();
        assert_eq!(catalog.len(), 6);
        for id in ["light", "dark", "tokyo-night", "nord", "dracula", "solarized"] {
            assert!(catalog.contains(id), "missing {id}");
        }
        assert!(!catalog.contains("system"));
        assert!(!catalog.contains("custom"));
    }

    #[test]
    fn test_kinds_and_swatches() {
        let catalog = PresetCatalog::default();
        assert_eq!(catalog.get("light").unwrap().kind, PresetKind::Base);
        assert_eq!(catalog.get("dark").unwrap().kind, PresetKind::Base);
        assert!(catalog.get("dark").unwrap().swatch.is_none());

        let nord = catalog.get("nord").unwrap();
        assert_eq!(nord.kind, PresetKind::Preset);
        assert_eq!(nord.swatch.as_deref(), Some("hsl(220, 16%, 22%)"));
    }

    #[test]
    fn test_tokyo_night_tokens() {
        let catalog = PresetCatalog::default();
        let tokens = &catalog.get("tokyo-night").unwrap().tokens;
        assert_eq!(tokens.get("--background"), Some("hsl(225 27% 15%)"));
        assert_eq!(tokens.get("--primary"), Some("hsl(250 95% 76%)"));
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn test_class_universe_is_every_id() {
        let catalog = PresetCatalog::default();
        let universe = catalog.class_universe();
        assert_eq!(universe.len(), catalog.len());
        assert!(universe.contains(&"dracula"));
    }
}
