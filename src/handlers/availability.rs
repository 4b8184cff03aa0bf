use std::collections::HashMap;
use std::time::Duration;

use axum::extract::State;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::aggregate::availability::build_availability;
use crate::cache::cache_key;
use crate::error::ApiError;
use crate::middleware::{AggregateResponse, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub club_id: Uuid,
    pub date: NaiveDate,
}

/// POST /api/reservations/availability  `{ "club_id": ..., "date": "YYYY-MM-DD" }`
///
/// Per-court slot view for one club and date. Courts, the day schedule and
/// the date's reservations are mandatory: if any of them fails the request
/// fails rather than fabricating availability. Pricing rules and
/// promotions are enrichment: on failure slots carry the base rate and the
/// fallback marker is set.
pub async fn reservations_availability(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<AggregateResponse<serde_json::Value>, ApiError> {
    if !state.config.flags.availability {
        return Err(ApiError::feature_disabled("availability"));
    }

    let request = parse_request(body)?;

    // Caller-scoped key: a hit proves this user already passed the club
    // check for this date within the TTL window.
    let key = cache_key(
        "availability",
        auth.organization_id,
        &[&auth.user_id.to_string(), &request.club_id.to_string(), &request.date.to_string()],
    );
    if let Some(cached) = state.cache.get(&key) {
        return Ok(AggregateResponse::hit(cached));
    }

    // Club access check before any availability fan-out
    let memberships = state.upstream.fetch_memberships(auth.user_id).await?;
    if !memberships.iter().any(|m| m.club_id == request.club_id) {
        return Err(ApiError::forbidden("No membership for the requested club"));
    }

    let (courts, schedule, reservations, pricing_rules, promotions) = tokio::join!(
        state.upstream.fetch_courts(request.club_id),
        state.upstream.fetch_day_schedule(request.club_id, request.date),
        state.upstream.fetch_reservations(request.club_id, request.date),
        state.upstream.fetch_pricing_rules(request.club_id),
        state.upstream.fetch_promotions(request.club_id),
    );

    let courts = courts?;
    let schedule = schedule?;
    let reservations = reservations?;

    let mut fallback = false;
    let pricing_rules = pricing_rules.unwrap_or_else(|e| {
        tracing::warn!("pricing rules fell back to base rates: {}", e);
        fallback = true;
        Vec::new()
    });
    let promotions = promotions.unwrap_or_else(|e| {
        tracing::warn!("promotions fell back to none: {}", e);
        fallback = true;
        Vec::new()
    });

    let view = build_availability(
        request.club_id,
        request.date,
        courts,
        schedule,
        reservations,
        &pricing_rules,
        &promotions,
    );

    let body = serde_json::to_value(&view)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    if !fallback {
        state.cache.set(
            key,
            body.clone(),
            Duration::from_secs(state.config.cache.availability_ttl_secs),
        );
    }

    Ok(AggregateResponse::miss(body).with_fallback(fallback))
}

/// Manual body parse so malformed input lands on the documented 400
/// VALIDATION_ERROR envelope instead of axum's extractor rejection.
fn parse_request(body: Value) -> Result<AvailabilityRequest, ApiError> {
    let mut field_errors = HashMap::new();

    match body.get("club_id") {
        None => {
            field_errors.insert("club_id".to_string(), "This field is required".to_string());
        }
        Some(v) => {
            if serde_json::from_value::<Uuid>(v.clone()).is_err() {
                field_errors.insert("club_id".to_string(), "Must be a UUID".to_string());
            }
        }
    }

    match body.get("date") {
        None => {
            field_errors.insert("date".to_string(), "This field is required".to_string());
        }
        Some(v) => {
            if serde_json::from_value::<NaiveDate>(v.clone()).is_err() {
                field_errors
                    .insert("date".to_string(), "Must be a date in YYYY-MM-DD format".to_string());
            }
        }
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid availability request", Some(field_errors)));
    }

    serde_json::from_value(body)
        .map_err(|e| ApiError::validation_error(e.to_string(), None))
}
