//! History endpoints for the dashboard.
//!
//! Thin reads over the append-only logs; each returns the full log sorted
//! newest first.

use axum::{extract::State, routing::get, Json, Router};

use super::AppState;
use crate::models::{Alert, BatterySchedule, PumpSchedule};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/history/alerts", get(alerts))
        .route("/api/history/pumping", get(pumping))
        .route("/api/history/battery", get(battery))
}

async fn alerts(State(state): State<AppState>) -> Json<Vec<Alert>> {
    Json(state.store.alert_history().await)
}

async fn pumping(State(state): State<AppState>) -> Json<Vec<PumpSchedule>> {
    Json(state.store.pump_history().await)
}

async fn battery(State(state): State<AppState>) -> Json<Vec<BatterySchedule>> {
    Json(state.store.battery_history().await)
}
