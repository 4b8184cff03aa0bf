use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::ResponseCache;
use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::auth_middleware;
use crate::upstream::breaker::CircuitBreakerRegistry;
use crate::upstream::UpstreamApi;

/// Shared services handed to every request. Everything is injected here
/// (no module-level singletons) so tests can swap the upstream client and
/// config freely.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: Arc<ResponseCache>,
    pub breakers: Arc<CircuitBreakerRegistry>,
    pub upstream: Arc<dyn UpstreamApi>,
}

impl AppState {
    pub fn new(config: AppConfig, upstream: Arc<dyn UpstreamApi>) -> Self {
        let breakers = Arc::new(CircuitBreakerRegistry::new(
            config.breaker.failure_threshold,
            Duration::from_secs(config.breaker.cooldown_secs),
        ));
        Self {
            config: Arc::new(config),
            cache: Arc::new(ResponseCache::new()),
            breakers,
            upstream,
        }
    }

    /// Like `new` but reusing an existing breaker registry, so the HTTP
    /// client and the handlers observe the same breaker state.
    pub fn with_breakers(
        config: AppConfig,
        breakers: Arc<CircuitBreakerRegistry>,
        upstream: Arc<dyn UpstreamApi>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(ResponseCache::new()),
            breakers,
            upstream,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let aggregation_routes = Router::new()
        .route("/api/auth/context", get(handlers::auth_context::auth_context))
        .route("/api/dashboard/overview", get(handlers::dashboard::dashboard_overview))
        .route(
            "/api/reservations/availability",
            post(handlers::availability::reservations_availability),
        )
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(aggregation_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
