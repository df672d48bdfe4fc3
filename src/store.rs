//! Process-owned state: alert log, schedule histories, and room status.
//!
//! Each log is a `Vec` plus an explicit id counter behind its own
//! `RwLock`, so id assignment is atomic with the append and ids stay
//! strictly increasing and gap-free under concurrent ingestion. Logs are
//! append-only and unbounded; room state is a last-writer-wins map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::detector::Detection;
use crate::models::{
    Alert, AlertKind, AlertStatus, BatterySchedule, OverrideCommand, PumpSchedule, RoomState,
    Utility,
};

// ---

#[derive(Default)]
struct AlertLog {
    entries: Vec<Alert>,
    next_id: u64,
}

impl AlertLog {
    /// Append under the write lock; id assignment is atomic with the
    /// append, and ids stay gap-free per log.
    fn append(&mut self, build: impl FnOnce(u64) -> Alert) -> Alert {
        // ---
        self.next_id += 1;
        let alert = build(self.next_id);
        self.entries.push(alert.clone());
        alert
    }
}

/// Shared state handle for detector, optimizer, and override paths.
pub struct Store {
    // ---
    alerts: RwLock<AlertLog>,
    pump_history: RwLock<Vec<PumpSchedule>>,
    battery_history: RwLock<Vec<BatterySchedule>>,
    rooms: RwLock<HashMap<String, RoomState>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(AlertLog::default()),
            pump_history: RwLock::new(Vec::new()),
            battery_history: RwLock::new(Vec::new()),
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Apply the outcome of one evaluated reading.
    ///
    /// With a detection: append the alert, then update the room by
    /// dropping the affected utility flag (the cut-off was issued) and
    /// pointing `latest_alert` at the new record. Without one: refresh
    /// `last_update`, clear `latest_alert`, leave the flags untouched.
    pub async fn record_reading(
        &self,
        room_id: &str,
        at: DateTime<Utc>,
        detection: Option<Detection>,
    ) -> Option<Alert> {
        // ---
        match detection {
            Some(det) => {
                let utility = det.utility;
                let alert = self.alerts.write().await.append(|id| det.into_alert(id, at));

                let mut rooms = self.rooms.write().await;
                let state = rooms.entry(room_id.to_string()).or_default();
                match utility {
                    Utility::Water => state.pump_on = false,
                    Utility::Power => state.power_on = false,
                }
                state.last_update = Some(at);
                state.latest_alert = Some(alert.clone());
                Some(alert)
            }
            None => {
                let mut rooms = self.rooms.write().await;
                let state = rooms.entry(room_id.to_string()).or_default();
                state.last_update = Some(at);
                state.latest_alert = None;
                None
            }
        }
    }

    /// Record a manual override. Always logs; the room flags are set
    /// strictly from `(utility, action)` when the room is known, and an
    /// unknown room skips the state write without failing.
    pub async fn record_override(&self, cmd: &OverrideCommand, at: DateTime<Utc>) -> Alert {
        // ---
        let alert = self.alerts.write().await.append(|id| Alert {
            id,
            time: at,
            kind: AlertKind::ManualOverride,
            message: format!(
                "{} forced {} {} in {}.",
                cmd.user,
                cmd.utility.as_str(),
                cmd.action.as_str(),
                cmd.room_id
            ),
            probable_wastage: "n/a".to_string(),
            estimated_savings: "₹0.00".to_string(),
            probability_score: 100.0,
            action: "EXECUTED".to_string(),
            status: AlertStatus::Manual,
        });

        if let Some(state) = self.rooms.write().await.get_mut(&cmd.room_id) {
            match cmd.utility {
                Utility::Water => state.pump_on = cmd.action.is_on(),
                Utility::Power => state.power_on = cmd.action.is_on(),
            }
            state.last_update = Some(at);
            state.latest_alert = Some(alert.clone());
        }

        alert
    }

    pub async fn push_pump(&self, decision: PumpSchedule) {
        self.pump_history.write().await.push(decision);
    }

    pub async fn push_battery(&self, decision: BatterySchedule) {
        self.battery_history.write().await.push(decision);
    }

    /// Full alert history, newest first.
    pub async fn alert_history(&self) -> Vec<Alert> {
        // ---
        let mut entries = self.alerts.read().await.entries.clone();
        entries.sort_by(|a, b| b.time.cmp(&a.time));
        entries
    }

    /// Pump decisions, newest first.
    pub async fn pump_history(&self) -> Vec<PumpSchedule> {
        // ---
        let mut entries = self.pump_history.read().await.clone();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    /// Battery decisions, newest first.
    pub async fn battery_history(&self) -> Vec<BatterySchedule> {
        // ---
        let mut entries = self.battery_history.read().await.clone();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    /// Point query for a room; unknown rooms report everything off.
    pub async fn room_status(&self, room_id: &str) -> RoomState {
        // ---
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
