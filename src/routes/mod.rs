use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::detector::Detector;
use crate::optimizer::Optimizer;
use crate::store::Store;

mod control;
mod health;
mod history;
mod ingest;
mod optimize;

// ---

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub detector: Arc<Detector>,
    pub optimizer: Arc<Optimizer>,
}

pub fn router(store: Arc<Store>, detector: Arc<Detector>, optimizer: Arc<Optimizer>) -> Router {
    // ---
    let state = AppState {
        store,
        detector,
        optimizer,
    };

    Router::new()
        .merge(ingest::router())
        .merge(history::router())
        .merge(optimize::router())
        .merge(control::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        // Dashboard and mobile app are served from other origins.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
