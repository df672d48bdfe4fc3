//! Manual override and room status endpoints.
//!
//! An override supersedes whatever the detector last decided: the command
//! is always logged, and the room's utility flags follow the operator's
//! word until a new reading arrives.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use super::AppState;
use crate::{OverrideCommand, RoomState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/control/override", post(override_handler))
        .route("/api/status/{room_id}", get(status))
}

async fn override_handler(
    State(state): State<AppState>,
    Json(cmd): Json<OverrideCommand>,
) -> impl IntoResponse {
    // ---
    if cmd.room_id.trim().is_empty() {
        warn!("Rejected override with empty room_id");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "status": "rejected", "reason": "room_id must not be empty" })),
        )
            .into_response();
    }

    let alert = state.store.record_override(&cmd, Utc::now()).await;
    info!("Override {}: {}", alert.id, alert.message);

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": format!(
                "Command {} sent to {} controller.",
                cmd.action.as_str(),
                cmd.utility.as_str()
            ),
            "override_log": alert,
        })),
    )
        .into_response()
}

/// Handle `GET /api/status/{room_id}`.
///
/// Unknown rooms report the default state (everything off) rather than
/// an error, so the app can poll before the first reading arrives.
async fn status(Path(room_id): Path<String>, State(state): State<AppState>) -> Json<RoomState> {
    // ---
    Json(state.store.room_status(&room_id).await)
}
