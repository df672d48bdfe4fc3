//! Sensor ingestion endpoint.
//!
//! One reading per call, no batching. The handler validates at the
//! boundary, resolves the timestamp, runs the anomaly detector, and lets
//! the store apply whatever the detector decided. The response mirrors
//! what the gateway firmware expects: `{status, alert}` with `alert`
//! null for clean readings.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use super::AppState;
use crate::SensorReading;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/sensor/ingest", post(handler))
}

async fn handler(
    State(state): State<AppState>,
    Json(reading): Json<SensorReading>,
) -> impl IntoResponse {
    // ---
    debug!("POST /sensor/ingest - room {}", reading.room_id);

    if let Err(reason) = validate(&reading) {
        warn!("Rejected sensor reading: {}", reason);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "status": "rejected", "reason": reason })),
        )
            .into_response();
    }

    let at = reading.timestamp.unwrap_or_else(Utc::now);
    let detection = state.detector.evaluate(&reading, at);
    let alert = state.store.record_reading(&reading.room_id, at, detection).await;

    if let Some(ref alert) = alert {
        info!(
            "Alert {} ({:?}) for room {}: {}",
            alert.id, alert.kind, reading.room_id, alert.message
        );
    }

    (StatusCode::OK, Json(json!({ "status": "success", "alert": alert }))).into_response()
}

/// Boundary validation; the detection engine assumes validated input.
fn validate(reading: &SensorReading) -> Result<(), &'static str> {
    // ---
    if reading.room_id.trim().is_empty() {
        return Err("room_id must not be empty");
    }
    for value in [reading.light_lux, reading.water_flow, reading.energy_load] {
        if !value.is_finite() || value < 0.0 {
            return Err("sensor quantities must be finite and non-negative");
        }
    }
    Ok(())
}
