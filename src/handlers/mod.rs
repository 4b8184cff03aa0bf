pub mod auth_context;
pub mod availability;
pub mod dashboard;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Padelyzer BFF (Rust)",
            "version": version,
            "description": "Aggregation tier in front of the Padelyzer domain API",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth_context": "GET /api/auth/context (bearer)",
                "dashboard": "GET /api/dashboard/overview (bearer)",
                "availability": "POST /api/reservations/availability (bearer)",
            }
        }
    }))
}

/// Liveness probe plus a per-target circuit breaker snapshot. Never calls
/// the upstream itself.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let now = chrono::Utc::now();

    let breakers: Value = state
        .breakers
        .snapshot()
        .into_iter()
        .map(|(target, breaker_state)| (target, Value::String(breaker_state.as_str().to_string())))
        .collect::<serde_json::Map<String, Value>>()
        .into();

    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": now,
            "breakers": breakers,
        }
    }))
}
