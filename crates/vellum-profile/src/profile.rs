//! The author profile record.

use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use vellum_tokens::TokenSet;

/// Profile id used in degraded (profile-less) mode. Never persisted.
pub const PLACEHOLDER_PROFILE_ID: &str = "placeholder";

/// Unique identifier for an author profile.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate a new unique profile id.
    pub fn generate() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        // Counter keeps ids unique within the same nanosecond.
        static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let hash =
            blake3::hash(&[&timestamp.to_le_bytes()[..], &counter.to_le_bytes()[..]].concat());
        Self(hex::encode(&hash.as_bytes()[..16]))
    }

    /// True for the degraded-mode placeholder id.
    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_PROFILE_ID
    }
}

impl From<&str> for ProfileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identity of the caller a store fetch runs as (a session, not a profile).
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CallerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// What a profile has chosen to look like.
///
/// Stored and transmitted as a bare string: `"system"`, `"custom"`, or a
/// preset id. Strings outside the known pair round-trip losslessly through
/// [`ThemeSelector::Named`]; whether a named selector actually resolves is
/// the resolver's business, not the data model's.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ThemeSelector {
    /// Follow the ambient color scheme.
    System,
    /// Use the profile's own token overrides.
    Custom,
    /// Use a named preset or base theme.
    Named(String),
}

impl ThemeSelector {
    /// Parse a stored selector string. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "system" => ThemeSelector::System,
            "custom" => ThemeSelector::Custom,
            other => ThemeSelector::Named(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ThemeSelector::System => "system",
            ThemeSelector::Custom => "custom",
            ThemeSelector::Named(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ThemeSelector::Custom)
    }

    pub fn is_system(&self) -> bool {
        matches!(self, ThemeSelector::System)
    }
}

impl Default for ThemeSelector {
    fn default() -> Self {
        ThemeSelector::System
    }
}

impl std::fmt::Display for ThemeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ThemeSelector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for ThemeSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ThemeSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ThemeSelector::parse(&raw))
    }
}

/// An author profile.
///
/// Fields this version does not model are captured in `extra` and written
/// back verbatim, so a profile can pass through an older engine without
/// losing what a newer one stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    #[serde(default)]
    pub selector: ThemeSelector,
    #[serde(default, skip_serializing_if = "TokenSet::is_empty")]
    pub custom_overrides: TokenSet,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at_millis: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Profile {
    /// Create a new profile following the ambient scheme.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: ProfileId::generate(),
            display_name: display_name.into(),
            selector: ThemeSelector::System,
            custom_overrides: TokenSet::new(),
            is_active: false,
            created_at_millis: chrono::Utc::now().timestamp_millis(),
            extra: BTreeMap::new(),
        }
    }

    /// Create a new profile with a chosen selector.
    pub fn with_selector(display_name: impl Into<String>, selector: ThemeSelector) -> Self {
        Self {
            selector,
            ..Self::new(display_name)
        }
    }

    /// The stand-in shown when the caller owns no profiles.
    ///
    /// Follows the ambient scheme and is never written to the store.
    pub fn placeholder() -> Self {
        Self {
            id: ProfileId::new(PLACEHOLDER_PROFILE_ID),
            display_name: "Default Author".to_string(),
            selector: ThemeSelector::System,
            custom_overrides: TokenSet::new(),
            is_active: true,
            created_at_millis: 0,
            extra: BTreeMap::new(),
        }
    }
}
