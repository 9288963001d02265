//! Page chrome the overlay talks to.
//!
//! The picker swatch and the mode indicator belong to the surrounding page,
//! not to the keyboard diagram. The overlay reads and writes them through
//! [`PageChrome`] so it can run against a real page or an in-memory model.

use serde::Serialize;

use crate::constants::DEFAULT_PICKER_COLOR;
use crate::overlay::mode::InteractionMode;

/// Page widgets consumed by the overlay.
pub trait PageChrome {
    /// Current colour of the picker swatch.
    fn picker_color(&self) -> String;

    /// Replaces the picker swatch colour.
    fn set_picker_color(&mut self, color: &str);

    /// Updates the mode indicator text and the keyboard cursor.
    fn show_mode(&mut self, mode: InteractionMode);
}

/// In-memory page chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChromeState {
    /// Picker swatch colour
    pub picker_color: String,
    /// Mode indicator text
    pub mode_text: String,
    /// Cursor class on the keyboard container
    pub cursor_class: String,
}

impl ChromeState {
    /// Creates chrome with the given swatch colour and the `set` mode shown.
    pub fn new(picker_color: impl Into<String>) -> Self {
        let mode = InteractionMode::default();
        Self {
            picker_color: picker_color.into(),
            mode_text: mode.indicator_text().to_string(),
            cursor_class: mode.cursor_class().to_string(),
        }
    }
}

impl Default for ChromeState {
    fn default() -> Self {
        Self::new(DEFAULT_PICKER_COLOR)
    }
}

impl PageChrome for ChromeState {
    fn picker_color(&self) -> String {
        self.picker_color.clone()
    }

    fn set_picker_color(&mut self, color: &str) {
        self.picker_color = color.to_string();
    }

    fn show_mode(&mut self, mode: InteractionMode) {
        self.mode_text = mode.indicator_text().to_string();
        self.cursor_class = mode.cursor_class().to_string();
    }
}
