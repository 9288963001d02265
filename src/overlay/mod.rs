//! Keyboard layout overlay.
//!
//! Layers interaction on top of a keyboard SVG: layout discovery and
//! switching, key lookup by matrix address, key colouring, LED indicators and
//! the click interaction mode.

pub mod controller;
pub mod indicator;
pub mod locator;
pub mod mode;
pub mod registry;
pub mod style;

// Re-export commonly used types
pub use controller::{ClickOutcome, KeyboardOverlay, LoadState, OverlaySnapshot};
pub use indicator::{EffectMode, Indicator};
pub use locator::{KeyHandle, KeyId, KeyTable};
pub use mode::InteractionMode;
pub use registry::{LayoutGroup, LayoutRegistry};
