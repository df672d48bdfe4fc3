//! Application entry point for the `ecosense-backend` service.
//!
//! This binary orchestrates the full startup sequence for the building
//! utility monitoring API, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the demand model (learned hourly profile or linear fallback)
//! - Constructing the in-memory store, anomaly detector, and optimizer
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `ECOSENSE_PORT` (optional) – HTTP port (default: 8080)
//! - `ECOSENSE_PEAK_RATE` / `ECOSENSE_OFF_PEAK_RATE` (optional) – tariffs
//! - `ECOSENSE_DETECTION` (optional) – `static` or `dynamic`
//! - `ECOSENSE_DEMAND_PROFILE` (optional) – hourly demand profile path
//! - `ECOSENSE_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `ECOSENSE_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! This module follows the Explicit Module Boundary Pattern (EMBP) by
//! delegating configuration parsing to `config`, engine construction to
//! the component modules, and route registration to `routes`.
use std::{env, io::IsTerminal, net::SocketAddr, sync::Arc};

use axum::Router;
use dotenvy::dotenv;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

mod baseline;
mod config;
mod detector;
mod models;
mod optimizer;
mod routes;
mod store;

// These are not used here but they are imported to be used by routes/*.rs, that way
// refactoring is easier since routes/*.rs do not have knowledge of config.rs, only
// of their parent module (main.rs)
pub use models::{OverrideCommand, RoomState, SensorReading};

use detector::Detector;
use optimizer::Optimizer;
use store::Store;

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let predictor = baseline::load(cfg.demand_profile.as_deref());
    let store = Arc::new(Store::new());
    let detector = Arc::new(Detector::new(
        cfg.detection,
        predictor.clone(),
        cfg.peak_rate,
    ));
    let optimizer = Arc::new(Optimizer::new(
        predictor,
        cfg.peak_rate,
        cfg.off_peak_rate,
        cfg.monthly_budget,
        cfg.forecast_days,
    ));

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(store, detector, optimizer);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `ECOSENSE_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `ECOSENSE_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked. It installs the subscriber globally
/// for the lifetime of the process.
fn init_tracing() {
    // ---
    let span_events = match env::var("ECOSENSE_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to ECOSENSE_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("ECOSENSE_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},tower_http=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
