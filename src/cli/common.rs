//! Helpers shared by the CLI commands.

use std::path::Path;

use anyhow::{Context, Result};

use crate::bridge::HostBridge;
use crate::chrome::ChromeState;
use crate::config::Config;
use crate::overlay::{Indicator, KeyId, KeyboardOverlay};

/// Loads `svg` into a fresh overlay configured from `config`.
pub fn open_overlay<B: HostBridge>(
    svg: &Path,
    config: &Config,
    bridge: B,
) -> Result<KeyboardOverlay<B>> {
    let mut overlay = KeyboardOverlay::new(&config.keyboard, bridge, ChromeState::default());
    overlay
        .load_from(svg)
        .with_context(|| format!("Failed to load keyboard SVG {}", svg.display()))?;
    Ok(overlay)
}

/// Parses a key address given as `ROW:COL` or `key<row>-<col>`.
pub fn parse_position(s: &str) -> Result<KeyId, String> {
    if let Some((row, col)) = s.split_once(':') {
        let row = row
            .trim()
            .parse()
            .map_err(|_| format!("Invalid row in '{s}' (expected ROW:COL)"))?;
        let col = col
            .trim()
            .parse()
            .map_err(|_| format!("Invalid column in '{s}' (expected ROW:COL)"))?;
        return Ok(KeyId::new(row, col));
    }
    s.parse()
}

/// A key colour assignment from `ROW:COL=COLOR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColor {
    /// Key to paint
    pub key: KeyId,
    /// CSS colour string
    pub color: String,
}

/// Parses `ROW:COL=COLOR`.
pub fn parse_key_color(s: &str) -> Result<KeyColor, String> {
    let (position, color) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected ROW:COL=COLOR, got '{s}'"))?;
    let color = color.trim();
    if color.is_empty() {
        return Err(format!("Missing colour in '{s}'"));
    }
    Ok(KeyColor {
        key: parse_position(position)?,
        color: color.to_string(),
    })
}

/// An indicator switch from `NAME=on|off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSwitch {
    /// LED to change
    pub indicator: Indicator,
    /// Shown or hidden
    pub enabled: bool,
}

/// Parses `NAME=on|off` (also `true|false`, `1|0`).
pub fn parse_indicator_switch(s: &str) -> Result<IndicatorSwitch, String> {
    let (name, state) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected NAME=on|off, got '{s}'"))?;
    let indicator = name.parse::<Indicator>().map_err(|e| e.to_string())?;
    let enabled = match state.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => true,
        "off" | "false" | "0" => false,
        other => return Err(format!("Invalid indicator state '{other}' (use on or off)")),
    };
    Ok(IndicatorSwitch { indicator, enabled })
}
