//! Data models for the utility monitoring service.
//!
//! Everything that crosses the API boundary lives here: sensor readings,
//! alerts, per-room status, manual override commands, and the schedule
//! decision records produced by the optimizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// One utility sample for a room, as posted by the sensor gateway.
///
/// A missing `timestamp` resolves to ingestion time. The reading itself is
/// not persisted; only alerts derived from it are.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorReading {
    // ---
    pub room_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub occupancy: u32,
    pub light_lux: f64,
    pub water_flow: f64,
    pub energy_load: f64,
}

/// Alert category, serialized with the wire tags the dashboard expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    CriticalLeak,
    EnergyWaste,
    AiAnomalyWater,
    AiAnomalyEnergy,
    ManualOverride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Resolved,
    Manual,
}

/// A detected anomaly or manual action, as stored in the alert log.
///
/// Ids are assigned by the log at append time: strictly increasing,
/// gap-free, unique within the log. Once appended an alert is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    // ---
    pub id: u64,
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub probable_wastage: String,
    pub estimated_savings: String,
    pub probability_score: f64,
    pub action: String,
    pub status: AlertStatus,
}

/// Latest known status of a room. One entry per `room_id`, last writer
/// wins (detector or override handler).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoomState {
    // ---
    pub pump_on: bool,
    pub power_on: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub latest_alert: Option<Alert>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Utility {
    Water,
    Power,
}

impl Utility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Utility::Water => "WATER",
            Utility::Power => "POWER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchAction {
    On,
    Off,
}

impl SwitchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchAction::On => "ON",
            SwitchAction::Off => "OFF",
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, SwitchAction::On)
    }
}

/// Operator command forcing a utility on or off, superseding any
/// automated decision for the room.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideCommand {
    // ---
    pub room_id: String,
    pub utility: Utility,
    pub action: SwitchAction,
    pub user: String,
}

/// Off-peak pump fill plan appended to the pumping history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpSchedule {
    // ---
    pub date: String,
    pub timestamp: DateTime<Utc>,
    pub total_water_liters: f64,
    pub scheduled_time: String,
    pub duration_hours: f64,
    pub total_cost: f64,
    pub money_saved: f64,
    pub grid_status: String,
}

/// Off-peak battery charging plan appended to the battery history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatterySchedule {
    // ---
    pub date: String,
    pub timestamp: DateTime<Utc>,
    pub energy_kwh: f64,
    pub scheduled_time: String,
    pub duration_hours: f64,
    pub total_cost: f64,
    pub money_saved: f64,
    pub grid_status: String,
}

/// Multi-day water demand and cost projection.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetForecast {
    // ---
    pub generated_at: DateTime<Utc>,
    pub horizon_days: u32,
    pub projected_liters: f64,
    pub projected_cost: f64,
    pub monthly_budget: f64,
    pub verdict: String,
}

// ---

/// Round to two decimals for currency and display quantities.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal, used for probability scores.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
