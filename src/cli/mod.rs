//! CLI command handlers for Chroma Overlay.
//!
//! This module provides headless, scriptable access to the overlay: listing a
//! diagram's layouts, rendering a coloured diagram, and managing the config
//! file.

pub mod common;
pub mod config;
pub mod layouts;
pub mod render;

// Re-export types used by main.rs and tests
pub use config::ConfigArgs;
pub use layouts::LayoutsArgs;
pub use render::RenderArgs;
