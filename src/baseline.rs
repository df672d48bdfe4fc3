//! Baseline water-demand prediction.
//!
//! The detector and optimizer consume a single operation: expected water
//! flow (L/min) for an hour of day, occupant count, and light level. The
//! model behind it is swappable; selection is explicit configuration, and
//! a failed profile load degrades to the conservative linear formula
//! rather than surfacing an error.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Deserialize;

// ---

/// Point estimator of expected water demand.
///
/// Implementations are total: valid inputs never fail, and the result is
/// always non-negative.
pub trait DemandModel: Send + Sync {
    fn predict_demand(&self, hour: u32, occupancy: u32, light_lux: f64) -> f64;
}

/// Conservative linear estimate used when no learned profile is available.
pub struct LinearModel;

impl DemandModel for LinearModel {
    fn predict_demand(&self, _hour: u32, occupancy: u32, _light_lux: f64) -> f64 {
        f64::from(occupancy) * 0.2 + 2.0
    }
}

/// Learned per-hour baseline: a base flow for each hour of the day plus
/// linear corrections for occupancy and light level.
///
/// Loaded from a JSON file produced offline by the training pipeline:
///
/// ```json
/// {
///   "hourly_base": [0.4, 0.3, ...24 entries...],
///   "per_occupant": 0.18,
///   "per_lux": 0.002
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct HourlyProfile {
    // ---
    hourly_base: [f64; 24],
    per_occupant: f64,
    per_lux: f64,
}

impl HourlyProfile {
    pub fn from_file(path: &str) -> Result<Self> {
        // ---
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read demand profile '{}': {}", path, e))?;
        let profile = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Failed to parse demand profile '{}': {}", path, e))?;
        Ok(profile)
    }
}

impl DemandModel for HourlyProfile {
    fn predict_demand(&self, hour: u32, occupancy: u32, light_lux: f64) -> f64 {
        // ---
        let base = self.hourly_base[(hour % 24) as usize];
        let predicted = base + f64::from(occupancy) * self.per_occupant + light_lux * self.per_lux;
        predicted.max(0.0)
    }
}

// ---

/// Build the configured demand model.
///
/// A profile path selects [`HourlyProfile`]; a load failure logs a warning
/// and degrades to [`LinearModel`]. No path means the linear model.
pub fn load(profile_path: Option<&str>) -> Arc<dyn DemandModel> {
    // ---
    match profile_path {
        Some(path) => match HourlyProfile::from_file(path) {
            Ok(profile) => {
                tracing::info!("Loaded hourly demand profile from {}", path);
                Arc::new(profile)
            }
            Err(e) => {
                tracing::warn!("{}; falling back to linear demand model", e);
                Arc::new(LinearModel)
            }
        },
        None => Arc::new(LinearModel),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn profile() -> HourlyProfile {
        // ---
        let mut hourly_base = [1.0; 24];
        hourly_base[2] = 0.3;
        hourly_base[12] = 4.0;
        HourlyProfile {
            hourly_base,
            per_occupant: 0.18,
            per_lux: 0.002,
        }
    }

    #[test]
    fn linear_model_formula() {
        // ---
        assert_eq!(LinearModel.predict_demand(12, 0, 0.0), 2.0);
        assert_eq!(LinearModel.predict_demand(3, 10, 450.0), 4.0);
    }

    #[test]
    fn profile_combines_hour_occupancy_and_light() {
        // ---
        let p = profile();
        assert!((p.predict_demand(2, 0, 0.0) - 0.3).abs() < 1e-9);
        assert!((p.predict_demand(12, 10, 100.0) - 6.0).abs() < 1e-9);
        // Hours wrap instead of indexing out of bounds
        assert_eq!(p.predict_demand(26, 0, 0.0), p.predict_demand(2, 0, 0.0));
    }

    #[test]
    fn profile_clamps_to_non_negative() {
        // ---
        let p = HourlyProfile {
            hourly_base: [0.1; 24],
            per_occupant: -1.0,
            per_lux: 0.0,
        };
        assert_eq!(p.predict_demand(0, 50, 0.0), 0.0);
    }

    #[test]
    fn profile_parses_from_json() {
        // ---
        let json = format!(
            r#"{{"hourly_base": {:?}, "per_occupant": 0.18, "per_lux": 0.002}}"#,
            [0.5; 24]
        );
        let p: HourlyProfile = serde_json::from_str(&json).unwrap();
        assert!((p.predict_demand(7, 1, 0.0) - 0.68).abs() < 1e-9);
    }

    #[test]
    fn missing_profile_degrades_to_linear() {
        // ---
        let model = load(Some("/nonexistent/profile.json"));
        assert_eq!(model.predict_demand(0, 0, 0.0), 2.0);
    }
}
