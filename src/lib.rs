//! Chroma Overlay Library
//!
//! This library drives an interactive keyboard diagram: it loads a keyboard
//! SVG, discovers and switches its regional layouts, colours keys by matrix
//! address, toggles LED indicators and turns key clicks into commands for the
//! host application.

// Module declarations
pub mod bridge;
pub mod chrome;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod overlay;
pub mod svg;
#[cfg(feature = "web")]
pub mod web;

pub use bridge::{HostBridge, HostCommand, MemoryBridge, UrlBridge};
pub use chrome::{ChromeState, PageChrome};
pub use error::OverlayError;
pub use overlay::{InteractionMode, KeyboardOverlay};
