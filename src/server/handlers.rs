//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use super::layer::compress_uidl;
use super::state::AppState;
use crate::monitor::StatsSummary;

/// Content type of UIDL payloads
const UIDL_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Create the router serving the demo UIDL endpoint
pub fn create_router(state: Arc<AppState>) -> Router {
    let uidl = Router::new().route(
        &state.config.uidl_path,
        get(demo_uidl).post(demo_uidl),
    );

    wrap_uidl_router(uidl, state)
}

/// Put `uidl` behind the compression stage and add the status routes.
///
/// Every response produced by `uidl` is compressed; the status routes
/// are not.
pub fn wrap_uidl_router(uidl: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    let uidl = uidl.route_layer(middleware::from_fn_with_state(
        Arc::clone(&state),
        compress_uidl,
    ));

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .route("/stats/reset", post(reset_stats))
        .route("/demo/stats", get(demo_stats))
        .merge(uidl);

    let router = if state.config.logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `ok`
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Configured strategy
    pub strategy: &'static str,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        strategy: state.selector.strategy().name(),
        uptime_secs: state.uptime().as_secs(),
    })
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsSummary> {
    Json(state.stats.summary())
}

async fn reset_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.stats.reset();
    Json(json!({"status": "reset"}))
}

async fn demo_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.demo_monitor.latest_report() {
        Some(report) => (StatusCode::OK, report),
        None => (StatusCode::NOT_FOUND, "No request measured yet".to_string()),
    }
}

/// Demo UIDL payload for the current frame
async fn demo_uidl(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.demo.uidl_payload() {
        Ok(payload) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, UIDL_CONTENT_TYPE)],
            payload,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}
