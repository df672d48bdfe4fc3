//! Configuration loader for the `ecosense-backend` service.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). By consolidating configuration logic
//! here, we avoid scattering `env::var` calls throughout the codebase.

use std::env;

use anyhow::{anyhow, ensure, Result};

use crate::detector::DetectionStrategy;

/// Parse an optional environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Port the HTTP server binds on.
    pub port: u16,

    /// Peak electricity tariff, currency units per kWh.
    pub peak_rate: f64,

    /// Off-peak electricity tariff, currency units per kWh.
    pub off_peak_rate: f64,

    /// Anomaly detection strategy.
    pub detection: DetectionStrategy,

    /// Optional path to a learned hourly demand profile (JSON).
    pub demand_profile: Option<String>,

    /// Monthly pumping budget for the forecast verdict.
    pub monthly_budget: f64,

    /// Default budget forecast horizon, in days.
    pub forecast_days: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `ECOSENSE_PORT` – HTTP port (default: 8080)
/// - `ECOSENSE_PEAK_RATE` – peak tariff (default: 10.20)
/// - `ECOSENSE_OFF_PEAK_RATE` – off-peak tariff (default: 6.80)
/// - `ECOSENSE_DETECTION` – `static` or `dynamic` (default: `dynamic`)
/// - `ECOSENSE_DEMAND_PROFILE` – hourly demand profile path
/// - `ECOSENSE_MONTHLY_BUDGET` – monthly budget (default: 5000)
/// - `ECOSENSE_FORECAST_DAYS` – forecast horizon (default: 30)
///
/// Returns an error if any variable is present but invalid, or if a
/// tariff is not strictly positive.
pub fn load_from_env() -> Result<Config> {
    // ---
    let port = parse_env!("ECOSENSE_PORT", u16, 8080);
    let peak_rate = parse_env!("ECOSENSE_PEAK_RATE", f64, 10.20);
    let off_peak_rate = parse_env!("ECOSENSE_OFF_PEAK_RATE", f64, 6.80);
    let monthly_budget = parse_env!("ECOSENSE_MONTHLY_BUDGET", f64, 5000.0);
    let forecast_days = parse_env!("ECOSENSE_FORECAST_DAYS", u32, 30);

    let detection = match env::var("ECOSENSE_DETECTION").ok() {
        Some(raw) => raw.parse::<DetectionStrategy>()?,
        None => DetectionStrategy::Dynamic,
    };
    let demand_profile = env::var("ECOSENSE_DEMAND_PROFILE").ok();

    // Tariffs feed threshold and cost math; zero or negative rates would
    // produce degenerate estimates downstream.
    ensure!(peak_rate > 0.0, "ECOSENSE_PEAK_RATE must be > 0");
    ensure!(off_peak_rate > 0.0, "ECOSENSE_OFF_PEAK_RATE must be > 0");

    Ok(Config {
        port,
        peak_rate,
        off_peak_rate,
        detection,
        demand_profile,
        monthly_budget,
        forecast_days,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  ECOSENSE_PORT           : {}", self.port);
        tracing::info!("  ECOSENSE_PEAK_RATE      : {}", self.peak_rate);
        tracing::info!("  ECOSENSE_OFF_PEAK_RATE  : {}", self.off_peak_rate);
        tracing::info!("  ECOSENSE_DETECTION      : {:?}", self.detection);
        tracing::info!(
            "  ECOSENSE_DEMAND_PROFILE : {}",
            self.demand_profile.as_deref().unwrap_or("(linear fallback)")
        );
        tracing::info!("  ECOSENSE_MONTHLY_BUDGET : {}", self.monthly_budget);
        tracing::info!("  ECOSENSE_FORECAST_DAYS  : {}", self.forecast_days);
    }
}
