//! Device LED indicators and the effect background.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{EFFECT_BACKGROUND_COLOR, EFFECT_LAYER_ID};
use crate::error::OverlayError;
use crate::svg::SvgDocument;

/// An LED glyph on the keyboard diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Indicator {
    /// Caps Lock LED
    CapsLock,
    /// Num Lock LED
    NumLock,
    /// Scroll Lock LED
    ScrollLock,
    /// Game mode LED
    GameMode,
    /// Macro recording LED
    MacroLed,
}

impl Indicator {
    /// Every indicator, in display order.
    pub const ALL: [Self; 5] = [
        Self::CapsLock,
        Self::NumLock,
        Self::ScrollLock,
        Self::GameMode,
        Self::MacroLed,
    ];

    /// Element id of the indicator in the SVG.
    pub const fn element_id(self) -> &'static str {
        match self {
            Self::CapsLock => "caps-lock",
            Self::NumLock => "num-lock",
            Self::ScrollLock => "scroll-lock",
            Self::GameMode => "game-mode",
            Self::MacroLed => "macro-led",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

impl FromStr for Indicator {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|indicator| indicator.element_id() == name)
            .ok_or_else(|| OverlayError::UnknownIndicator(name.to_string()))
    }
}

/// Background effect drawn behind the keys.
///
/// Only [`EffectMode::None`] changes the diagram; the animated effects are
/// accepted and leave the background as it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
    /// Plain dark background
    #[default]
    None,
    /// Static colour
    Static,
    /// Wave
    Wave,
    /// Breathing
    Breath,
    /// Reactive to key presses
    Reactive,
    /// Spectrum cycling
    Spectrum,
    /// Ripple
    Ripple,
}

impl EffectMode {
    /// Every effect mode.
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Static,
        Self::Wave,
        Self::Breath,
        Self::Reactive,
        Self::Spectrum,
        Self::Ripple,
    ];

    /// Lowercase name used on the wire and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Static => "static",
            Self::Wave => "wave",
            Self::Breath => "breath",
            Self::Reactive => "reactive",
            Self::Spectrum => "spectrum",
            Self::Ripple => "ripple",
        }
    }
}

impl FromStr for EffectMode {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == name)
            .ok_or(OverlayError::UnknownEffect(name))
    }
}

/// Shows or hides an indicator.
///
/// Returns `false` when the document has no such element; indicator sets
/// differ between keyboards, so that is not an error.
pub fn set_indicator(document: &mut SvgDocument, indicator: Indicator, enabled: bool) -> bool {
    let Some(node) = document.element_by_id(indicator.element_id()) else {
        debug!(%indicator, "Indicator not present in this layout");
        return false;
    };
    document.set_visible(node, enabled)
}

/// Whether an indicator is currently shown (`None` if it is not in the document).
pub fn indicator_state(document: &SvgDocument, indicator: Indicator) -> Option<bool> {
    let node = document.element_by_id(indicator.element_id())?;
    Some(!document.element(node)?.is_hidden())
}

/// Paints the effect background for `mode`.
pub fn set_effect_background(document: &mut SvgDocument, mode: EffectMode) {
    if mode != EffectMode::None {
        debug!(effect = mode.as_str(), "Effect background not drawn for this mode");
        return;
    }
    let Some(layer) = document.element_by_id(EFFECT_LAYER_ID) else {
        debug!("Document has no effect layer");
        return;
    };
    for rect in document.descendants_named(layer, &["rect"]) {
        if let Some(element) = document.element_mut(rect) {
            element.set_presentation("fill", EFFECT_BACKGROUND_COLOR);
        }
    }
}
