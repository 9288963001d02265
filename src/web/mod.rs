//! Web API module for Chroma Overlay.
//!
//! This module serves the keyboard diagram and its controller to the embedded
//! web view. The page forwards clicks and chrome actions here and polls the
//! host commands they produced.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/state` - Overlay snapshot
//! - `GET /api/keyboard.svg` - Current diagram
//! - `GET /api/layouts` - Layout ids and the active one
//! - `PUT /api/layout` - Switch layout
//! - `PUT /api/mode` - Change interaction mode
//! - `PUT /api/picker` - Change the picker colour
//! - `PUT /api/effect` - Paint the effect background
//! - `POST /api/keys/{row}/{col}/click` - Click a key
//! - `GET /api/indicators` - LED states
//! - `PUT /api/indicators/{name}` - Show or hide an LED
//! - `GET /api/commands` - Drain pending host commands
//! - `POST /api/commands` - Forward a chrome command to the host

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::bridge::{HostBridge, HostCommand, MemoryBridge};
use crate::chrome::{ChromeState, PageChrome};
use crate::config::Config;
use crate::error::OverlayError;
use crate::overlay::{ClickOutcome, EffectMode, Indicator, KeyboardOverlay, OverlaySnapshot};

// ============================================================================
// Application State
// ============================================================================

type SharedOverlay = Arc<Mutex<KeyboardOverlay<MemoryBridge>>>;

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// The one overlay the page drives
    overlay: SharedOverlay,
    /// Scheme used when reporting command URLs
    scheme: Arc<str>,
}

impl AppState {
    /// Creates a state with `svg` mounted.
    pub fn new(config: &Config, svg: &str) -> anyhow::Result<Self> {
        let mut overlay =
            KeyboardOverlay::new(&config.keyboard, MemoryBridge::new(), ChromeState::default());
        overlay.begin_load()?;
        overlay
            .complete_load(svg)
            .context("Failed to mount keyboard SVG")?;
        Ok(Self {
            overlay: Arc::new(Mutex::new(overlay)),
            scheme: Arc::from(config.bridge.scheme.as_str()),
        })
    }

    fn overlay(&self) -> Result<MutexGuard<'_, KeyboardOverlay<MemoryBridge>>, ApiRejection> {
        self.overlay.lock().map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Overlay state is poisoned")),
            )
        })
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// API version.
    pub version: String,
}

/// Layout list response.
#[derive(Debug, Serialize)]
pub struct LayoutListResponse {
    /// Layout ids in document order.
    pub layouts: Vec<String>,
    /// Visible layout.
    pub active: Option<String>,
}

/// Layout switch request.
#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    /// Layout to show.
    pub id: String,
}

/// Mode change request.
#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    /// `set`, `picker` or `clear`.
    pub mode: String,
}

/// Picker colour request.
#[derive(Debug, Deserialize)]
pub struct PickerRequest {
    /// CSS colour string.
    pub color: String,
}

/// Effect background request.
#[derive(Debug, Deserialize)]
pub struct EffectRequest {
    /// Effect name.
    pub mode: String,
}

/// Indicator change request.
#[derive(Debug, Deserialize)]
pub struct IndicatorRequest {
    /// Whether the LED is shown.
    pub enabled: bool,
}

/// Indicator states keyed by element id; `null` when the diagram lacks the LED.
#[derive(Debug, Serialize)]
pub struct IndicatorListResponse {
    /// LED states.
    pub indicators: BTreeMap<String, Option<bool>>,
}

/// Key click response.
#[derive(Debug, Serialize)]
pub struct ClickResponse {
    /// `painted`, `cleared`, `sampled` or `ignored`.
    pub outcome: &'static str,
    /// Colour painted or sampled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Overlay state after the click.
    pub state: OverlaySnapshot,
}

/// Chrome command request.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// Wire form, with or without the scheme.
    pub command: String,
}

/// A command sent to the host.
#[derive(Debug, Serialize)]
pub struct CommandInfo {
    /// Full URL the host intercepts.
    pub url: String,
    /// Parsed command.
    pub command: HostCommand,
}

/// Drained host commands.
#[derive(Debug, Serialize)]
pub struct CommandListResponse {
    /// Commands in the order they were sent.
    pub commands: Vec<CommandInfo>,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

type ApiRejection = (StatusCode, Json<ApiError>);

/// Maps a controller error to its HTTP status.
fn overlay_rejection(err: OverlayError) -> ApiRejection {
    let status = match &err {
        OverlayError::UnknownLayout { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        OverlayError::UnknownMode(_) | OverlayError::UnknownEffect(_) => StatusCode::BAD_REQUEST,
        OverlayError::UnknownIndicator(_) => StatusCode::NOT_FOUND,
        OverlayError::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
        OverlayError::NoLayouts | OverlayError::MissingActiveLayout => StatusCode::CONFLICT,
        OverlayError::AlreadyLoaded
        | OverlayError::NoDocumentPath
        | OverlayError::Parse(_)
        | OverlayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = match &err {
        OverlayError::UnknownLayout { fallback, .. } => {
            ApiError::with_details(err.to_string(), format!("fallback: {fallback}"))
        }
        _ => ApiError::new(err.to_string()),
    };
    (status, Json(body))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/state - Current overlay snapshot.
async fn get_state(State(state): State<AppState>) -> Result<Json<OverlaySnapshot>, ApiRejection> {
    Ok(Json(state.overlay()?.snapshot()))
}

/// GET /api/keyboard.svg - The diagram as it currently looks.
async fn get_svg(State(state): State<AppState>) -> Result<impl IntoResponse, ApiRejection> {
    let svg = state.overlay()?.render_svg().map_err(overlay_rejection)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

/// GET /api/layouts - Layout ids.
async fn list_layouts(
    State(state): State<AppState>,
) -> Result<Json<LayoutListResponse>, ApiRejection> {
    let overlay = state.overlay()?;
    Ok(Json(LayoutListResponse {
        layouts: overlay.available_layouts(),
        active: overlay.active_layout().map(str::to_string),
    }))
}

/// PUT /api/layout - Show a layout.
async fn switch_layout(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<OverlaySnapshot>, ApiRejection> {
    let mut overlay = state.overlay()?;
    overlay.switch_to(&request.id).map_err(overlay_rejection)?;
    Ok(Json(overlay.snapshot()))
}

/// PUT /api/mode - Change what a key click does.
async fn set_mode(
    State(state): State<AppState>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<OverlaySnapshot>, ApiRejection> {
    let mut overlay = state.overlay()?;
    overlay
        .request_mode(&request.mode)
        .map_err(overlay_rejection)?;
    Ok(Json(overlay.snapshot()))
}

/// PUT /api/picker - Change the picker swatch.
async fn set_picker(
    State(state): State<AppState>,
    Json(request): Json<PickerRequest>,
) -> Result<Json<OverlaySnapshot>, ApiRejection> {
    let color = request.color.trim();
    if color.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("Picker colour must not be empty")),
        ));
    }
    let mut overlay = state.overlay()?;
    overlay.chrome_mut().set_picker_color(color);
    Ok(Json(overlay.snapshot()))
}

/// PUT /api/effect - Paint the effect background.
async fn set_effect(
    State(state): State<AppState>,
    Json(request): Json<EffectRequest>,
) -> Result<StatusCode, ApiRejection> {
    let mode: EffectMode = request.mode.parse().map_err(overlay_rejection)?;
    state
        .overlay()?
        .set_effect_background(mode)
        .map_err(overlay_rejection)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/keys/{row}/{col}/click - Apply the current mode to a key.
async fn click_key(
    State(state): State<AppState>,
    Path((row, col)): Path<(u16, u16)>,
) -> Result<Json<ClickResponse>, ApiRejection> {
    let mut overlay = state.overlay()?;
    let outcome = overlay.on_key_click(row, col).map_err(overlay_rejection)?;
    let (outcome, color) = match outcome {
        ClickOutcome::Painted { color } => ("painted", Some(color)),
        ClickOutcome::Cleared => ("cleared", None),
        ClickOutcome::Sampled { color } => ("sampled", color),
        ClickOutcome::Ignored => ("ignored", None),
    };
    Ok(Json(ClickResponse {
        outcome,
        color,
        state: overlay.snapshot(),
    }))
}

/// GET /api/indicators - Every LED and whether it is shown.
async fn list_indicators(
    State(state): State<AppState>,
) -> Result<Json<IndicatorListResponse>, ApiRejection> {
    let overlay = state.overlay()?;
    let indicators = Indicator::ALL
        .iter()
        .map(|&indicator| (indicator.to_string(), overlay.indicator_state(indicator)))
        .collect();
    Ok(Json(IndicatorListResponse { indicators }))
}

/// PUT /api/indicators/{name} - Show or hide an LED.
async fn set_indicator(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<IndicatorRequest>,
) -> Result<StatusCode, ApiRejection> {
    let indicator: Indicator = name.parse().map_err(overlay_rejection)?;
    let found = state
        .overlay()?
        .set_indicator(indicator, request.enabled)
        .map_err(overlay_rejection)?;
    if !found {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new(format!(
                "Indicator \"{indicator}\" is not part of this keyboard"
            ))),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/commands - Drain commands emitted since the last call.
async fn drain_commands(
    State(state): State<AppState>,
) -> Result<Json<CommandListResponse>, ApiRejection> {
    let commands = state
        .overlay()?
        .bridge_mut()
        .take()
        .into_iter()
        .map(|command| CommandInfo {
            url: command.to_url(&state.scheme),
            command,
        })
        .collect();
    Ok(Json(CommandListResponse { commands }))
}

/// POST /api/commands - Forward a chrome command (profiles, preferences, ...).
async fn forward_command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Result<StatusCode, ApiRejection> {
    let command: HostCommand = request.command.parse().map_err(|e: anyhow::Error| {
        warn!(command = %request.command, error = %e, "Rejected host command");
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::with_details("Invalid host command", e.to_string())),
        )
    })?;
    state.overlay()?.bridge_mut().send(command);
    Ok(StatusCode::ACCEPTED)
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // The server only ever runs next to its own web view on localhost.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Diagram
        .route("/api/state", get(get_state))
        .route("/api/keyboard.svg", get(get_svg))
        .route("/api/layouts", get(list_layouts))
        .route("/api/layout", put(switch_layout))
        // Interaction
        .route("/api/mode", put(set_mode))
        .route("/api/picker", put(set_picker))
        .route("/api/effect", put(set_effect))
        .route("/api/keys/{row}/{col}/click", post(click_key))
        .route("/api/indicators", get(list_indicators))
        .route("/api/indicators/{name}", put(set_indicator))
        // Host bridge
        .route("/api/commands", get(drain_commands).post(forward_command))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server.
///
/// # Arguments
///
/// * `config` - Application configuration
/// * `svg_path` - Keyboard SVG to serve
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an error if the SVG cannot be loaded or the server fails to start.
pub async fn run_server(config: Config, svg_path: PathBuf, addr: SocketAddr) -> anyhow::Result<()> {
    let svg = tokio::fs::read_to_string(&svg_path)
        .await
        .with_context(|| format!("Failed to read keyboard SVG: {}", svg_path.display()))?;
    let state = AppState::new(&config, &svg)?;
    let app = create_router(state);

    info!("Starting Chroma Overlay web server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
