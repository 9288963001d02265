//! Chroma Overlay - command-line front end for keyboard diagrams
//!
//! Lists the layouts of a keyboard SVG, renders a diagram with key colours
//! and LED indicators applied, and manages the configuration file.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chroma_overlay::cli::{ConfigArgs, LayoutsArgs, RenderArgs};
use chroma_overlay::config::Config;

/// Chroma Overlay - interactive keyboard diagram controller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the layouts in a keyboard SVG
    Layouts(LayoutsArgs),
    /// Apply colours and indicators to a keyboard SVG
    Render(RenderArgs),
    /// Show or initialise the configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        eprintln!("Warning: {e:#}; using default configuration");
        Config::default()
    });
    debug!(?config, "Configuration loaded");

    match &cli.command {
        Command::Layouts(args) => args.execute(&config),
        Command::Render(args) => args.execute(&config),
        Command::Config(args) => args.execute(&config),
    }
}
