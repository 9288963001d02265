//! Application-wide constants.
//!
//! This module defines the names and fixed values shared by the overlay
//! controller, the command-line interface and the web surface.

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "ChromaOverlay";

/// Environment variable that replaces the config directory.
pub const CONFIG_DIR_ENV: &str = "CHROMA_OVERLAY_CONFIG_DIR";

/// Class token that marks an SVG group as a keyboard layout.
pub const LAYOUT_CLASS: &str = "kblayout";

/// Neutral gray applied to keys that carry no colour.
pub const NEUTRAL_KEY_COLOR: &str = "#777777";

/// Fill applied to the effect layer when no effect is shown.
pub const EFFECT_BACKGROUND_COLOR: &str = "#222222";

/// Id of the group holding the effect background rectangles.
pub const EFFECT_LAYER_ID: &str = "effect-layer";

/// Layout used when a switch names a layout the document does not have.
pub const DEFAULT_LAYOUT_ID: &str = "kb-gb";

/// Id of the page element that hosts the keyboard diagram.
pub const DEFAULT_CONTAINER_ID: &str = "keyboard-div";

/// URL scheme the host application intercepts.
pub const DEFAULT_COMMAND_SCHEME: &str = "cmd";

/// Picker colour shown before the user chooses one.
pub const DEFAULT_PICKER_COLOR: &str = "#00ff00";
