//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_COMMAND_SCHEME, DEFAULT_CONTAINER_ID, DEFAULT_LAYOUT_ID,
};

/// Keyboard diagram settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardConfig {
    /// Id of the page element that hosts the diagram
    #[serde(default = "default_container_id")]
    pub container_id: String,
    /// Keyboard SVG to load (e.g., "`/usr/share/chroma/blackwidow-chroma.svg`")
    #[serde(default)]
    pub svg_path: Option<PathBuf>,
    /// Layout shown when a requested layout does not exist
    #[serde(default = "default_layout")]
    pub default_layout: String,
}

fn default_container_id() -> String {
    DEFAULT_CONTAINER_ID.to_string()
}

fn default_layout() -> String {
    DEFAULT_LAYOUT_ID.to_string()
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            container_id: default_container_id(),
            svg_path: None,
            default_layout: default_layout(),
        }
    }
}

/// Host bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// URL scheme the host intercepts (`cmd` gives `cmd://set-key?...`)
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_scheme() -> String {
    DEFAULT_COMMAND_SCHEME.to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/ChromaOverlay/config.toml`
/// - macOS: `~/Library/Application Support/ChromaOverlay/config.toml`
/// - Windows: `%APPDATA%\ChromaOverlay\config.toml`
///
/// # Validation
///
/// - `default_layout` must not be empty
/// - `scheme` must be non-empty ASCII alphanumerics, `+`, `-` or `.`
/// - `svg_path` must exist if set
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Keyboard diagram settings
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    /// Host bridge settings
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the platform-specific config directory path.
    ///
    /// `CHROMA_OVERLAY_CONFIG_DIR` overrides the platform location.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from a specific file.
    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to a specific file.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        self.validate()?;

        // Serialize to TOML
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = config_path.with_extension("toml.tmp");

        // Write to temp file
        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        // Atomic rename
        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.keyboard.default_layout.trim().is_empty() {
            anyhow::bail!("Default layout id must not be empty");
        }

        let scheme = &self.bridge.scheme;
        if scheme.is_empty()
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            anyhow::bail!(
                "Invalid command scheme '{scheme}'. Use letters, digits, '+', '-' or '.'"
            );
        }

        if let Some(svg_path) = &self.keyboard.svg_path {
            if !svg_path.exists() {
                anyhow::bail!("Keyboard SVG not found: {}", svg_path.display());
            }
        }

        Ok(())
    }
}
