//! Key colouring.
//!
//! A key's colour is the stroke of its shapes plus the fill of its labels.
//! Colours are opaque CSS strings; nothing here validates them.

use crate::constants::NEUTRAL_KEY_COLOR;
use crate::overlay::locator::KeyHandle;
use crate::svg::SvgDocument;

/// Sets every label fill and shape stroke of `key` to `color`.
pub fn paint(document: &mut SvgDocument, key: &KeyHandle, color: &str) {
    for &label in &key.labels {
        if let Some(element) = document.element_mut(label) {
            element.set_presentation("fill", color);
        }
    }
    for &shape in &key.shapes {
        if let Some(element) = document.element_mut(shape) {
            element.set_presentation("stroke", color);
        }
    }
}

/// Resets `key` to the neutral gray.
pub fn clear(document: &mut SvgDocument, key: &KeyHandle) {
    paint(document, key, NEUTRAL_KEY_COLOR);
}

/// Reads the stroke of the key's first shape in document order.
///
/// Returns `None` for keys without shapes or whose first shape has no stroke.
pub fn read_color(document: &SvgDocument, key: &KeyHandle) -> Option<String> {
    let first = *key.shapes.first()?;
    document.element(first)?.presentation("stroke")
}
