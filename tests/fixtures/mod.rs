//! Shared test fixtures for the integration tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// A small two-layout keyboard: `kb-gb` visible, `kb-us` hidden.
///
/// - `kb-gb` has keys 0-0, 0-1 and 3-5 (3-5 starts red)
/// - `kb-us` has keys 0-0 and 2-4
/// - caps-lock is hidden, num-lock is shown, the other LEDs are absent
/// - the effect layer holds two rects with a non-default fill
pub const KEYBOARD_SVG: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="400" height="150">
  <g id="effect-layer">
    <rect x="0" y="0" width="400" height="150" fill="#ff00ff"/>
    <g><rect x="10" y="10" width="20" height="20" style="fill:#00ffff"/></g>
  </g>
  <g id="kb-gb" class="kblayout">
    <g id="key0-0" onclick="key(this,0,0)"><rect width="20" height="20" stroke="#000000"/><text>Esc</text></g>
    <g id="key0-1" onclick="key(this,0,1)"><rect width="20" height="20"/><text>F1</text></g>
    <g id="key3-5" onclick="key(this,3,5)"><path d="M0 0h20v20H0z" style="stroke:#ff0000"/><text>Z</text><text>|</text></g>
  </g>
  <g id="kb-us" class="kblayout" display="none">
    <g id="key0-0" onclick="key(this,0,0)"><rect width="20" height="20"/><text>Esc</text></g>
    <g id="key2-4" onclick="key(this,2,4)"><ellipse rx="10" ry="10"/><text>R</text></g>
  </g>
  <g id="caps-lock" display="none"><circle r="2"/></g>
  <g id="num-lock"><circle r="2"/></g>
</svg>
"##;

/// A diagram without any `kblayout` group.
pub const NO_LAYOUT_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg">
  <g id="key0-0"><rect/></g>
</svg>
"##;

/// A diagram whose layouts are all hidden.
pub const HIDDEN_LAYOUTS_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg">
  <g id="kb-gb" class="kblayout" style="display:none"><g id="key0-0"><rect/></g></g>
  <g id="kb-us" class="kblayout" display="none"><g id="key0-0"><rect/></g></g>
</svg>
"##;

/// A wide matrix: a column past 255 and keys addressed only by their
/// `class="key"` click handler.
pub const WIDE_MATRIX_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg">
  <g id="kb-gb" class="kblayout">
    <g id="key0-300"><rect stroke="#000000"/></g>
    <g id="enter" class="key" onclick="key(this,4,13)"><rect stroke="#000000"/><text>Enter</text></g>
    <g id="spacer" class="key"><rect stroke="#000000"/></g>
  </g>
</svg>
"##;

/// Writes `content` to `name` inside a fresh temp dir.
///
/// Keep the `TempDir` alive for as long as the file is needed.
pub fn write_svg(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(name);
    fs::write(&path, content).expect("Failed to write SVG fixture");
    (temp_dir, path)
}

/// Writes [`KEYBOARD_SVG`] into a temp dir.
pub fn write_keyboard_svg() -> (TempDir, PathBuf) {
    write_svg("keyboard.svg", KEYBOARD_SVG)
}
