//! Layouts command for listing the keyboard layouts inside an SVG.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::bridge::MemoryBridge;
use crate::cli::common::open_overlay;
use crate::config::Config;

/// List the keyboard layouts found in a diagram
#[derive(Debug, Clone, Args)]
pub struct LayoutsArgs {
    /// Path to the keyboard SVG
    #[arg(value_name = "SVG")]
    pub svg: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for the layouts command
#[derive(Debug, Serialize)]
struct LayoutsResponse {
    layouts: Vec<LayoutData>,
    active: Option<String>,
}

/// One layout for JSON output
#[derive(Debug, Serialize)]
struct LayoutData {
    id: String,
    keys: usize,
    active: bool,
}

impl LayoutsArgs {
    /// Execute the layouts command
    pub fn execute(&self, config: &Config) -> Result<()> {
        let overlay = open_overlay(&self.svg, config, MemoryBridge::new())?;
        let active = overlay.active_layout().map(str::to_string);

        let layouts: Vec<LayoutData> = overlay
            .available_layouts()
            .into_iter()
            .map(|id| LayoutData {
                keys: overlay.key_count(&id),
                active: active.as_deref() == Some(id.as_str()),
                id,
            })
            .collect();

        if self.json {
            let response = LayoutsResponse { layouts, active };
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        if layouts.is_empty() {
            println!("No keyboard layouts found in {}", self.svg.display());
            return Ok(());
        }

        for layout in &layouts {
            let marker = if layout.active { "*" } else { " " };
            println!("{marker} {} ({} keys)", layout.id, layout.keys);
        }
        if active.is_none() {
            eprintln!("Warning: no layout is visible in {}", self.svg.display());
        }

        Ok(())
    }
}
