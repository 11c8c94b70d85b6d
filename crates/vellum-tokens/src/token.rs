//! The closed catalog of style tokens.
//!
//! Tokens are CSS custom properties: their canonical names carry the `--`
//! prefix everywhere, including persistence and change notifications. The
//! catalog is closed on purpose. Values for names outside it still flow
//! through [`TokenSet`](crate::TokenSet) untouched, but nothing in the engine
//! ever invents one.

use std::fmt;

/// Editing groups for the token catalog.
///
/// These mirror how theme editors present the catalog: page-level colors
/// first, then interactive component colors, then floating element colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenGroup {
    Base,
    Components,
    Elements,
}

impl TokenGroup {
    /// Returns the display name for the group.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenGroup::Base => "Base",
            TokenGroup::Components => "Components",
            TokenGroup::Elements => "Elements",
        }
    }

    /// Returns the tokens in this group, in editing order.
    pub fn tokens(&self) -> &'static [StyleToken] {
        match self {
            TokenGroup::Base => &[
                StyleToken::Background,
                StyleToken::Foreground,
                StyleToken::Border,
                StyleToken::Input,
                StyleToken::Ring,
            ],
            TokenGroup::Components => &[
                StyleToken::Primary,
                StyleToken::PrimaryForeground,
                StyleToken::Secondary,
                StyleToken::SecondaryForeground,
                StyleToken::Accent,
                StyleToken::AccentForeground,
                StyleToken::Muted,
                StyleToken::MutedForeground,
                StyleToken::Destructive,
                StyleToken::DestructiveForeground,
            ],
            TokenGroup::Elements => &[
                StyleToken::Card,
                StyleToken::CardForeground,
                StyleToken::Popover,
                StyleToken::PopoverForeground,
            ],
        }
    }

    /// Returns all groups in editing order.
    pub fn all() -> &'static [TokenGroup] {
        &[TokenGroup::Base, TokenGroup::Components, TokenGroup::Elements]
    }
}

/// A style token known to the catalog.
///
/// Variants are declared in catalog order, the order [`StyleToken::all`]
/// returns them. Editing order is a different thing; that one lives on
/// [`TokenGroup::tokens`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleToken {
    Background,
    Foreground,
    Card,
    CardForeground,
    Popover,
    PopoverForeground,
    Primary,
    PrimaryForeground,
    Secondary,
    SecondaryForeground,
    Muted,
    MutedForeground,
    Accent,
    AccentForeground,
    Destructive,
    DestructiveForeground,
    Border,
    Input,
    Ring,
}

impl StyleToken {
    /// Returns the canonical custom-property name, `--` prefix included.
    pub fn name(&self) -> &'static str {
        match self {
            StyleToken::Background => "--background",
            StyleToken::Foreground => "--foreground",
            StyleToken::Card => "--card",
            StyleToken::CardForeground => "--card-foreground",
            StyleToken::Popover => "--popover",
            StyleToken::PopoverForeground => "--popover-foreground",
            StyleToken::Primary => "--primary",
            StyleToken::PrimaryForeground => "--primary-foreground",
            StyleToken::Secondary => "--secondary",
            StyleToken::SecondaryForeground => "--secondary-foreground",
            StyleToken::Muted => "--muted",
            StyleToken::MutedForeground => "--muted-foreground",
            StyleToken::Accent => "--accent",
            StyleToken::AccentForeground => "--accent-foreground",
            StyleToken::Destructive => "--destructive",
            StyleToken::DestructiveForeground => "--destructive-foreground",
            StyleToken::Border => "--border",
            StyleToken::Input => "--input",
            StyleToken::Ring => "--ring",
        }
    }

    /// Returns the human-readable label editors show for this token.
    pub fn display_name(&self) -> &'static str {
        match self {
            StyleToken::Background => "Background",
            StyleToken::Foreground => "Foreground",
            StyleToken::Card => "Card",
            StyleToken::CardForeground => "Card Foreground",
            StyleToken::Popover => "Popover",
            StyleToken::PopoverForeground => "Popover Foreground",
            StyleToken::Primary => "Primary",
            StyleToken::PrimaryForeground => "Primary Foreground",
            StyleToken::Secondary => "Secondary",
            StyleToken::SecondaryForeground => "Secondary Foreground",
            StyleToken::Muted => "Muted",
            StyleToken::MutedForeground => "Muted Foreground",
            StyleToken::Accent => "Accent",
            StyleToken::AccentForeground => "Accent Foreground",
            StyleToken::Destructive => "Destructive",
            StyleToken::DestructiveForeground => "Destructive Foreground",
            StyleToken::Border => "Border",
            StyleToken::Input => "Input",
            StyleToken::Ring => "Ring",
        }
    }

    /// Returns the editing group this token belongs to.
    pub fn group(&self) -> TokenGroup {
        match self {
            StyleToken::Background
            | StyleToken::Foreground
            | StyleToken::Border
            | StyleToken::Input
            | StyleToken::Ring => TokenGroup::Base,
            StyleToken::Primary
            | StyleToken::PrimaryForeground
            | StyleToken::Secondary
            | StyleToken::SecondaryForeground
            | StyleToken::Accent
            | StyleToken::AccentForeground
            | StyleToken::Muted
            | StyleToken::MutedForeground
            | StyleToken::Destructive
            | StyleToken::DestructiveForeground => TokenGroup::Components,
            StyleToken::Card
            | StyleToken::CardForeground
            | StyleToken::Popover
            | StyleToken::PopoverForeground => TokenGroup::Elements,
        }
    }

    /// Looks a token up by its canonical name (prefix required).
    pub fn from_name(name: &str) -> Option<StyleToken> {
        StyleToken::all().iter().copied().find(|t| t.name() == name)
    }

    /// Returns every catalog token, in catalog order.
    pub fn all() -> &'static [StyleToken] {
        &[
            StyleToken::Background,
            StyleToken::Foreground,
            StyleToken::Card,
            StyleToken::CardForeground,
            StyleToken::Popover,
            StyleToken::PopoverForeground,
            StyleToken::Primary,
            StyleToken::PrimaryForeground,
            StyleToken::Secondary,
            StyleToken::SecondaryForeground,
            StyleToken::Muted,
            StyleToken::MutedForeground,
            StyleToken::Accent,
            StyleToken::AccentForeground,
            StyleToken::Destructive,
            StyleToken::DestructiveForeground,
            StyleToken::Border,
            StyleToken::Input,
            StyleToken::Ring,
        ]
    }
}

impl fmt::Display for StyleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
