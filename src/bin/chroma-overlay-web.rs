//! Chroma Overlay Web Server Binary
//!
//! This binary serves a keyboard diagram and its controller to the embedded
//! web view.
//!
//! # Usage
//!
//! ```bash
//! # Serve the SVG named in the config file on port 3001
//! chroma-overlay-web
//!
//! # Serve a specific diagram on another port
//! chroma-overlay-web --svg blackwidow_chroma.svg --port 8080
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chroma_overlay::config::Config;
use chroma_overlay::web;

/// Chroma Overlay Web Server - REST API for the keyboard web view
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Keyboard SVG to serve.
    /// Defaults to `keyboard.svg_path` from the config file.
    #[arg(short, long)]
    svg: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().unwrap_or_default();

    let svg_path = args
        .svg
        .or_else(|| config.keyboard.svg_path.clone())
        .context("No keyboard SVG given; pass --svg or set keyboard.svg_path in the config")?;

    info!("Keyboard SVG: {}", svg_path.display());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    web::run_server(config, svg_path, addr).await
}
