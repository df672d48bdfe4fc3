//! Anomaly detection and cost estimation over sensor readings.
//!
//! A reading is checked for abnormal water flow first, then abnormal energy
//! load; the water check strictly preempts the energy check so a single
//! reading never produces two alerts. Two strategies share one interface:
//! - `Dynamic` compares flow against a per-hour baseline from the demand
//!   model, with a 50% tolerance band and a fixed safety margin.
//! - `Static` is the degraded fallback using fixed thresholds on empty
//!   rooms, with probabilities from the confidence scorer.
//!
//! The detector decides *what* gets written; appending to the alert log and
//! mutating room state belong to the store.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Error};
use chrono::{DateTime, Timelike, Utc};

use crate::baseline::DemandModel;
use crate::models::{round1, round2, Alert, AlertKind, AlertStatus, SensorReading, Utility};

// ---

/// Water threshold = predicted * tolerance + margin. The margin keeps the
/// threshold strictly positive even when the baseline predicts zero.
const WATER_TOLERANCE: f64 = 1.5;
const WATER_MARGIN_LPM: f64 = 1.0;

/// Expected load = occupancy * per-occupant draw + standby draw.
const ENERGY_STANDBY_KW: f64 = 0.2;
const ENERGY_PER_OCCUPANT_KW: f64 = 0.2;
const ENERGY_TOLERANCE: f64 = 1.2;

/// Deviations at or below this are treated as sensor noise, not waste.
const ENERGY_NOISE_FLOOR_KW: f64 = 0.5;

/// Fixed thresholds for the static strategy (empty rooms only).
const STATIC_LEAK_LPM: f64 = 2.0;
const STATIC_WASTE_KW: f64 = 0.5;

/// Thresholds are structurally positive; the floor guards the division
/// in the probability calculation all the same.
const THRESHOLD_FLOOR: f64 = 1e-6;

/// Pumping energy per cubic meter of water, billed at the tariff rate.
pub(crate) const PUMP_ENERGY_KWH_PER_M3: f64 = 0.5;

// ---

/// How readings are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStrategy {
    /// Fixed thresholds on unoccupied rooms.
    Static,
    /// Per-hour learned baseline with tolerance band.
    Dynamic,
}

impl FromStr for DetectionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(DetectionStrategy::Static),
            "dynamic" => Ok(DetectionStrategy::Dynamic),
            other => Err(anyhow!("Unknown detection strategy: {other}")),
        }
    }
}

/// Outcome of evaluating one reading, before it is assigned a log id.
#[derive(Debug, Clone)]
pub struct Detection {
    pub kind: AlertKind,
    pub utility: Utility,
    pub message: String,
    pub wasted_amount: f64,
    pub wasted_unit: &'static str,
    pub estimated_cost: f64,
    pub probability: f64,
    pub status: AlertStatus,
}

impl Detection {
    /// Materialize the detection as an immutable alert record.
    pub fn into_alert(self, id: u64, time: DateTime<Utc>) -> Alert {
        // ---
        Alert {
            id,
            time,
            kind: self.kind,
            message: self.message,
            probable_wastage: format!("{:.1} {}", self.wasted_amount, self.wasted_unit),
            estimated_savings: format!("₹{:.2}", self.estimated_cost),
            probability_score: self.probability,
            action: "AUTO_CUTOFF".to_string(),
            status: self.status,
        }
    }
}

// ---

/// Convert a deviation above a threshold into a bounded confidence score.
///
/// Returns exactly `0` at or below the threshold, otherwise a value in
/// `(70, 99]` rounded to two decimals, non-decreasing in `value`.
/// The threshold must be positive; that is the caller's contract.
pub fn confidence_score(value: f64, threshold: f64) -> f64 {
    // ---
    if value <= threshold {
        return 0.0;
    }
    let ratio = value / threshold;
    let confidence = (0.7 + ratio * 0.1).min(0.99);
    round2(confidence * 100.0)
}

/// Classifies sensor readings and estimates wasted resource and cost.
pub struct Detector {
    // ---
    strategy: DetectionStrategy,
    predictor: Arc<dyn DemandModel>,
    peak_rate: f64,
}

impl Detector {
    pub fn new(strategy: DetectionStrategy, predictor: Arc<dyn DemandModel>, peak_rate: f64) -> Self {
        Self {
            strategy,
            predictor,
            peak_rate,
        }
    }

    /// Evaluate one reading. Returns `None` when nothing is abnormal;
    /// room state is still refreshed by the caller in that case.
    pub fn evaluate(&self, reading: &SensorReading, at: DateTime<Utc>) -> Option<Detection> {
        // ---
        match self.strategy {
            DetectionStrategy::Dynamic => self.evaluate_dynamic(reading, at),
            DetectionStrategy::Static => self.evaluate_static(reading),
        }
    }

    fn evaluate_dynamic(&self, reading: &SensorReading, at: DateTime<Utc>) -> Option<Detection> {
        // ---
        let predicted = self
            .predictor
            .predict_demand(at.hour(), reading.occupancy, reading.light_lux)
            .max(0.0);
        let water_threshold = (predicted * WATER_TOLERANCE + WATER_MARGIN_LPM).max(THRESHOLD_FLOOR);

        if reading.water_flow > water_threshold {
            let deviation = reading.water_flow - predicted;
            let wasted_liters = deviation * 60.0;
            return Some(Detection {
                kind: AlertKind::AiAnomalyWater,
                utility: Utility::Water,
                message: format!(
                    "Abnormal water flow in {}: {:.1} L/min (expected {:.1} L/min).",
                    reading.room_id, reading.water_flow, predicted
                ),
                wasted_amount: wasted_liters,
                wasted_unit: "L/hr",
                estimated_cost: water_energy_cost(wasted_liters, self.peak_rate),
                probability: round1((deviation / water_threshold * 100.0).min(99.9)),
                status: AlertStatus::Resolved,
            });
        }

        let expected = f64::from(reading.occupancy) * ENERGY_PER_OCCUPANT_KW + ENERGY_STANDBY_KW;
        let energy_threshold = (expected * ENERGY_TOLERANCE).max(THRESHOLD_FLOOR);

        if reading.energy_load > energy_threshold {
            let deviation = reading.energy_load - expected;
            if deviation > ENERGY_NOISE_FLOOR_KW {
                return Some(Detection {
                    kind: AlertKind::AiAnomalyEnergy,
                    utility: Utility::Power,
                    message: format!(
                        "Abnormal energy load in {}: {:.1} kW (expected {:.1} kW).",
                        reading.room_id, reading.energy_load, expected
                    ),
                    wasted_amount: deviation,
                    wasted_unit: "kWh",
                    estimated_cost: deviation * self.peak_rate,
                    probability: round1((deviation / energy_threshold * 100.0).min(99.9)),
                    status: AlertStatus::Resolved,
                });
            }
        }

        None
    }

    fn evaluate_static(&self, reading: &SensorReading) -> Option<Detection> {
        // ---
        if reading.occupancy == 0 && reading.water_flow > STATIC_LEAK_LPM {
            let wasted_liters = (reading.water_flow - STATIC_LEAK_LPM) * 60.0;
            return Some(Detection {
                kind: AlertKind::CriticalLeak,
                utility: Utility::Water,
                message: format!(
                    "Leak detected in {}! Flow: {:.1} L/min in an empty room.",
                    reading.room_id, reading.water_flow
                ),
                wasted_amount: wasted_liters,
                wasted_unit: "L/hr",
                estimated_cost: water_energy_cost(wasted_liters, self.peak_rate),
                probability: confidence_score(reading.water_flow, STATIC_LEAK_LPM),
                status: AlertStatus::Resolved,
            });
        }

        if reading.occupancy == 0 && reading.energy_load > STATIC_WASTE_KW {
            let wasted_kwh = reading.energy_load - STATIC_WASTE_KW;
            return Some(Detection {
                kind: AlertKind::EnergyWaste,
                utility: Utility::Power,
                message: format!(
                    "Energy waste in {}: {:.1} kW in an empty room.",
                    reading.room_id, reading.energy_load
                ),
                wasted_amount: wasted_kwh,
                wasted_unit: "kWh",
                estimated_cost: wasted_kwh * self.peak_rate,
                probability: confidence_score(reading.energy_load, STATIC_WASTE_KW),
                status: AlertStatus::Resolved,
            });
        }

        None
    }
}

/// Energy cost of moving `liters` of water, billed at `rate` per kWh.
pub(crate) fn water_energy_cost(liters: f64, rate: f64) -> f64 {
    liters / 1000.0 * PUMP_ENERGY_KWH_PER_M3 * rate
}
