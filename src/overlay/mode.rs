//! What a click on a key means.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;

/// Interaction mode for key clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Paint the clicked key with the picker colour
    #[default]
    Set,
    /// Copy the clicked key's colour into the picker
    Picker,
    /// Reset the clicked key to neutral gray
    Clear,
}

impl InteractionMode {
    /// Every mode.
    pub const ALL: [Self; 3] = [Self::Set, Self::Picker, Self::Clear];

    /// Lowercase mode id.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Picker => "picker",
            Self::Clear => "clear",
        }
    }

    /// Short title shown in bold by the mode indicator.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Set => "Set",
            Self::Picker => "Picker",
            Self::Clear => "Clear",
        }
    }

    /// Full text of the mode indicator.
    pub const fn indicator_text(self) -> &'static str {
        match self {
            Self::Set => "Set - Click on a key to assign a colour here.",
            Self::Picker => "Picker - Click on a key to grab its colour.",
            Self::Clear => "Clear - Click on a key to clear.",
        }
    }

    /// CSS class applied to the keyboard container for the mode's cursor.
    pub const fn cursor_class(self) -> &'static str {
        match self {
            Self::Set => "cursor-mode-set",
            Self::Picker => "cursor-mode-picker",
            Self::Clear => "cursor-mode-clear",
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionMode {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "set" => Ok(Self::Set),
            "picker" => Ok(Self::Picker),
            "clear" => Ok(Self::Clear),
            other => Err(OverlayError::UnknownMode(other.to_string())),
        }
    }
}
