//! Render command: apply layout, key colours and LEDs to a diagram and write it out.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::bridge::UrlBridge;
use crate::chrome::PageChrome;
use crate::cli::common::{
    open_overlay, parse_indicator_switch, parse_key_color, parse_position, IndicatorSwitch,
    KeyColor,
};
use crate::config::Config;
use crate::error::OverlayError;
use crate::overlay::{ClickOutcome, InteractionMode, KeyId};

/// Render a keyboard diagram with colours and indicators applied
///
/// Keys are coloured through the same click path the web view uses, so
/// every change also produces the host command it would send.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Path to the keyboard SVG
    #[arg(value_name = "SVG")]
    pub svg: PathBuf,

    /// Layout to show (e.g., kb-us)
    #[arg(short, long)]
    pub layout: Option<String>,

    /// Colour a key, as ROW:COL=COLOR (repeatable)
    #[arg(short, long = "key", value_name = "ROW:COL=COLOR", value_parser = parse_key_color)]
    pub keys: Vec<KeyColor>,

    /// Clear a key, as ROW:COL (repeatable)
    #[arg(long = "clear", value_name = "ROW:COL", value_parser = parse_position)]
    pub clears: Vec<KeyId>,

    /// Disable clicks on a key, as ROW:COL (repeatable)
    #[arg(long = "disable", value_name = "ROW:COL", value_parser = parse_position)]
    pub disabled: Vec<KeyId>,

    /// Show or hide an LED, as NAME=on|off (repeatable)
    #[arg(short, long = "indicator", value_name = "NAME=on|off", value_parser = parse_indicator_switch)]
    pub indicators: Vec<IndicatorSwitch>,

    /// Write the SVG here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the host command URL of each change as it is applied.
    /// The SVG then only goes to --output.
    #[arg(long)]
    pub print_commands: bool,
}

impl RenderArgs {
    /// Execute the render command
    pub fn execute(&self, config: &Config) -> Result<()> {
        let commands: Box<dyn Write> = if self.print_commands {
            Box::new(io::stdout())
        } else {
            Box::new(io::sink())
        };
        let bridge = UrlBridge::new(&config.bridge.scheme, commands);
        let mut overlay = open_overlay(&self.svg, config, bridge)?;

        if let Some(layout) = &self.layout {
            match overlay.switch_to(layout) {
                Ok(()) => {}
                Err(e @ OverlayError::UnknownLayout { .. }) => eprintln!("Warning: {e}"),
                Err(e) => return Err(e).context("Failed to switch layout"),
            }
        }

        for switch in &self.indicators {
            if !overlay.set_indicator(switch.indicator, switch.enabled)? {
                eprintln!("Warning: indicator '{}' not found", switch.indicator);
            }
        }

        let layout = overlay.active_layout().unwrap_or("<none>").to_string();

        overlay.set_mode(InteractionMode::Set);
        for assignment in &self.keys {
            overlay.chrome_mut().set_picker_color(&assignment.color);
            let outcome = overlay.on_key_click(assignment.key.row, assignment.key.col)?;
            if outcome == ClickOutcome::Ignored {
                eprintln!("Warning: key {} not found in layout {layout}", assignment.key);
            }
        }

        overlay.set_mode(InteractionMode::Clear);
        for key in &self.clears {
            if overlay.on_key_click(key.row, key.col)? == ClickOutcome::Ignored {
                eprintln!("Warning: key {key} not found in layout {layout}");
            }
        }
        overlay.set_mode(InteractionMode::Set);

        for key in &self.disabled {
            if !overlay.disable_key(key.row, key.col)? {
                eprintln!("Warning: key {key} not found in layout {layout}");
            }
        }

        let svg = overlay.render_svg()?;
        if let Some(output) = &self.output {
            fs::write(output, &svg)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        } else if !self.print_commands {
            print!("{svg}");
        }

        Ok(())
    }
}
