//! Schedule optimization endpoints.
//!
//! Each call computes a fresh decision from the current clock and the
//! demand model, appends it to the relevant history log, and returns it.
//! The budget forecast is a pure projection and is not logged.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::models::{BatterySchedule, BudgetForecast, PumpSchedule};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/pump/optimize", get(pump))
        .route("/api/battery/optimize", get(battery))
        .route("/api/budget/forecast", get(forecast))
}

async fn pump(State(state): State<AppState>) -> Json<PumpSchedule> {
    // ---
    let decision = state.optimizer.pump_schedule(Utc::now());
    info!(
        "Pump scheduled for {}: {} L, saving ₹{}",
        decision.scheduled_time, decision.total_water_liters, decision.money_saved
    );
    state.store.push_pump(decision.clone()).await;
    Json(decision)
}

async fn battery(State(state): State<AppState>) -> Json<BatterySchedule> {
    // ---
    let decision = state.optimizer.battery_schedule(Utc::now());
    info!(
        "Battery charge scheduled for {}: {} kWh, saving ₹{}",
        decision.scheduled_time, decision.energy_kwh, decision.money_saved
    );
    state.store.push_battery(decision.clone()).await;
    Json(decision)
}

#[derive(Debug, Deserialize)]
struct ForecastQuery {
    days: Option<u32>,
}

async fn forecast(
    Query(params): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Json<BudgetForecast> {
    // ---
    Json(state.optimizer.budget_forecast(Utc::now(), params.days))
}
