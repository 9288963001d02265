//! SVG document model.
//!
//! The keyboard diagram is parsed once with `roxmltree` into an owned tree
//! that the overlay can mutate, then written back out for the web view.

pub mod document;
pub mod style;
pub mod writer;

// Re-export commonly used types
pub use document::{Attribute, Element, NodeId, NodeKind, SvgDocument};
