use std::time::Duration;

use axum::extract::State;
use axum::Extension;

use crate::aggregate::auth_context::build_auth_context;
use crate::cache::cache_key;
use crate::error::ApiError;
use crate::middleware::{AggregateResponse, AuthUser};
use crate::state::AppState;
use crate::upstream::error::UpstreamError;

/// GET /api/auth/context
///
/// Aggregated identity view: user profile, organization, accessible clubs
/// and the permissions map, composed from four parallel upstream fetches.
/// All four are mandatory; authorization data is never substituted with
/// defaults.
pub async fn auth_context(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<AggregateResponse<serde_json::Value>, ApiError> {
    if !state.config.flags.auth_context {
        return Err(ApiError::feature_disabled("auth context"));
    }

    // the view is per-user, so the user id rides along as a discriminator
    let key = cache_key("auth_context", auth.organization_id, &[&auth.user_id.to_string()]);
    if let Some(cached) = state.cache.get(&key) {
        return Ok(AggregateResponse::hit(cached));
    }

    let (user, organization, clubs, memberships) = tokio::join!(
        state.upstream.fetch_user(auth.user_id),
        state.upstream.fetch_organization(auth.organization_id),
        state.upstream.fetch_clubs(auth.organization_id),
        state.upstream.fetch_memberships(auth.user_id),
    );

    // A token that outlived its user or organization resolves to no
    // accessible tenant at all.
    let user = user.map_err(reject_stale_credential)?;
    let organization = organization.map_err(reject_stale_credential)?;

    let view = build_auth_context(user, organization, clubs?, memberships?);

    let body = serde_json::to_value(&view)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    state.cache.set(
        key,
        body.clone(),
        Duration::from_secs(state.config.cache.auth_context_ttl_secs),
    );

    Ok(AggregateResponse::miss(body))
}

fn reject_stale_credential(e: UpstreamError) -> ApiError {
    match e {
        UpstreamError::NotFound(_) => {
            ApiError::forbidden("Credential does not resolve to an accessible tenant")
        }
        other => other.into(),
    }
}
