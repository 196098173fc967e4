//! # mrv-api: HTTP Surface
//!
//! Serves device usage data and issues verifiable credentials over it.
//!
//! ## Routes
//!
//! Keyed routes (first path segment is the API key, checked in constant
//! time by middleware):
//!
//! - `GET /{apikey}/usage/{device_id}`: raw usage rows
//! - `GET /{apikey}/userstats/{device_id}`: per-device power statistics
//! - `GET /{apikey}/userstats`: fleet-wide power statistics
//! - `GET /{apikey}/dailymrv`: facts for the reporting date (today minus 2)
//! - `GET /{apikey}/dailymrv-vc/{device_id}`: issue a credential
//! - `GET /{apikey}/verifysign`: standalone signature verification
//!
//! Operational routes (no key): `/health`, `/health/ready`, `/metrics`,
//! `/openapi.json`.
//!
//! ## Layering
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware (keyed routes) → Handler
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::{Extension, Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    let keyed = Router::new()
        .route("/:apikey/usage/:device_id", get(routes::usage::device_usage))
        .route(
            "/:apikey/userstats/:device_id",
            get(routes::usage::device_stats),
        )
        .route("/:apikey/userstats", get(routes::usage::all_stats))
        .route("/:apikey/dailymrv", get(routes::usage::daily_mrv))
        .route(
            "/:apikey/dailymrv-vc/:device_id",
            get(routes::credentials::issue_daily_credential),
        )
        .route("/:apikey/verifysign", get(routes::verify::verify_signature))
        .layer(from_fn_with_state(state.clone(), auth::require_api_key));

    let operational = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_handler));

    keyed
        .merge(operational)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(Extension(state.metrics.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Readiness probe. Pings the database when one is configured.
async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    if let Some(pool) = &state.pool {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(|e| AppError::Storage(format!("database ping failed: {e}")))?;
    }
    Ok(Json(serde_json::json!({
        "status": "ready",
        "database": state.pool.is_some(),
    })))
}

/// Prometheus text exposition.
async fn metrics_handler(Extension(metrics): Extension<ApiMetrics>) -> Result<String, AppError> {
    metrics.gather_and_encode().map_err(AppError::Internal)
}

/// Serve the generated OpenAPI document.
async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}
