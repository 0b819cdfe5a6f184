//! Enumeration types for the portal catalog and store.
//!
//! Every enum is stored as a lowercase `TEXT` tag in `PostgreSQL` and
//! serialized with the same tag on the wire, so [`as_str`] and
//! [`from_tag`] are the single source of truth for the mapping.
//!
//! [`as_str`]: GameType::as_str
//! [`from_tag`]: GameType::from_tag

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Game type
// ---------------------------------------------------------------------------

/// How a game's playable content is delivered to the browser.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum GameType {
    /// External URL loaded in a sandboxed frame.
    #[default]
    Iframe,
    /// Admin-uploaded single-file HTML document served inline.
    Uploaded,
    /// SWF file played through the Ruffle emulator on the client.
    Flash,
    /// Third-party embed markup served inline.
    Embed,
}

impl GameType {
    /// All game types, in display order.
    pub const ALL: [Self; 4] = [Self::Iframe, Self::Uploaded, Self::Flash, Self::Embed];

    /// The lowercase tag used on the wire and in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iframe => "iframe",
            Self::Uploaded => "uploaded",
            Self::Flash => "flash",
            Self::Embed => "embed",
        }
    }

    /// Parse a stored tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Whether the content is an HTML document the portal serves itself.
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::Uploaded | Self::Embed)
    }
}

// ---------------------------------------------------------------------------
// Badge
// ---------------------------------------------------------------------------

/// Cosmetic label an admin can attach to a game card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Badge {
    /// Recently added.
    New,
    /// Popular right now.
    Hot,
}

impl Badge {
    /// The lowercase tag used on the wire and in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Hot => "hot",
        }
    }

    /// Parse a stored tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "new" => Some(Self::New),
            "hot" => Some(Self::Hot),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Store item type
// ---------------------------------------------------------------------------

/// Kind of cosmetic sold in the coin store.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ItemType {
    /// Profile picture shown next to the username.
    #[default]
    Avatar,
}

impl ItemType {
    /// The lowercase tag used on the wire and in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
        }
    }

    /// Parse a stored tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "avatar" => Some(Self::Avatar),
            _ => None,
        }
    }
}
