use std::time::Duration;

use axum::extract::{Query, State};
use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::aggregate::dashboard::build_dashboard;
use crate::cache::cache_key;
use crate::error::ApiError;
use crate::middleware::{AggregateResponse, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub club_id: Option<Uuid>,
}

/// GET /api/dashboard/overview?club_id=<uuid>
///
/// Club metrics view from three parallel upstream calls (analytics, top
/// clients, upcoming reservations). Each sub-call is independently
/// recoverable: a failure contributes zeroed/empty defaults and sets the
/// fallback marker, but the endpoint answers 200 even if every call
/// failed. Authorization failures are never defaulted.
pub async fn dashboard_overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<DashboardQuery>,
) -> Result<AggregateResponse<serde_json::Value>, ApiError> {
    if !state.config.flags.dashboard {
        return Err(ApiError::feature_disabled("dashboard"));
    }

    // Keys are scoped to the caller as well as the club: a hit means this
    // same user already passed the membership check within the TTL, so a
    // cached response skips upstream traffic entirely.
    let club_discriminator =
        query.club_id.map(|c| c.to_string()).unwrap_or_else(|| "default".to_string());
    let key = cache_key(
        "dashboard",
        auth.organization_id,
        &[&auth.user_id.to_string(), &club_discriminator],
    );
    if let Some(cached) = state.cache.get(&key) {
        return Ok(AggregateResponse::hit(cached));
    }

    // Memberships gate the club before any metrics fan-out
    let memberships = state.upstream.fetch_memberships(auth.user_id).await?;

    let club_id = match query.club_id {
        Some(requested) => {
            if !memberships.iter().any(|m| m.club_id == requested) {
                return Err(ApiError::forbidden("No membership for the requested club"));
            }
            requested
        }
        None => match memberships.first() {
            Some(m) => m.club_id,
            None => return Err(ApiError::forbidden("Caller has no club memberships")),
        },
    };

    let (analytics, top_clients, upcoming) = tokio::join!(
        state.upstream.fetch_analytics(club_id),
        state.upstream.fetch_top_clients(club_id),
        state.upstream.fetch_upcoming_reservations(club_id),
    );

    let analytics = analytics
        .map_err(|e| tracing::warn!("dashboard analytics fell back to defaults: {}", e))
        .ok();
    let top_clients = top_clients
        .map_err(|e| tracing::warn!("dashboard top clients fell back to defaults: {}", e))
        .ok();
    let upcoming = upcoming
        .map_err(|e| tracing::warn!("dashboard upcoming reservations fell back to defaults: {}", e))
        .ok();

    let (view, fallback) = build_dashboard(analytics, top_clients, upcoming);

    let body = serde_json::to_value(&view)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    // Degraded views are recomputed per request instead of pinning zeroes
    // for a full TTL window.
    if !fallback {
        state.cache.set(
            key,
            body.clone(),
            Duration::from_secs(state.config.cache.dashboard_ttl_secs),
        );
    }

    Ok(AggregateResponse::miss(body).with_fallback(fallback))
}
