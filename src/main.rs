use std::sync::Arc;
use std::time::Duration;

use padelyzer_bff::config::AppConfig;
use padelyzer_bff::upstream::breaker::CircuitBreakerRegistry;
use padelyzer_bff::upstream::HttpUpstream;
use padelyzer_bff::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up BFF_UPSTREAM_BASE_URL,
    // BFF_JWT_SECRET, feature flags, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Padelyzer BFF in {:?} mode", config.environment);
    tracing::info!(
        "Aggregation flags: auth_context={} dashboard={} availability={}",
        config.flags.auth_context,
        config.flags.dashboard,
        config.flags.availability
    );

    // One breaker registry shared by the HTTP client and the health view
    let breakers = Arc::new(CircuitBreakerRegistry::new(
        config.breaker.failure_threshold,
        Duration::from_secs(config.breaker.cooldown_secs),
    ));
    let upstream = Arc::new(HttpUpstream::new(&config.upstream, breakers.clone())?);

    let state = AppState::with_breakers(config, breakers, upstream);
    let router = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("BFF_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3001);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Padelyzer BFF listening on http://{}", bind_addr);

    axum::serve(listener, router).await?;
    Ok(())
}
