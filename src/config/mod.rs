use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub breaker: BreakerConfig,
    pub flags: FeatureFlags,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the Padelyzer domain API, e.g. https://api.padelyzer.com/v1
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub auth_context_ttl_secs: u64,
    pub dashboard_ttl_secs: u64,
    /// Availability is booking-sensitive, so it expires much faster than
    /// the dashboard and auth-context views.
    pub availability_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures before a target's breaker opens.
    pub failure_threshold: u32,
    /// Seconds an open breaker waits before allowing a half-open probe.
    pub cooldown_secs: u64,
}

/// Per-endpoint toggles. A disabled endpoint answers 501 and tells the
/// caller to go straight to the domain API instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub auth_context: bool,
    pub dashboard: bool,
    pub availability: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::defaults(environment).with_env_overrides()
    }

    fn defaults(environment: Environment) -> Self {
        Self {
            environment,
            upstream: UpstreamConfig {
                base_url: "http://localhost:8000/api/v1".to_string(),
                request_timeout_secs: 10,
                retry_max_attempts: 3,
                retry_base_delay_ms: 250,
            },
            cache: CacheConfig {
                auth_context_ttl_secs: 300,
                dashboard_ttl_secs: 300,
                availability_ttl_secs: 45,
            },
            breaker: BreakerConfig {
                failure_threshold: 5,
                cooldown_secs: 60,
            },
            flags: FeatureFlags {
                auth_context: true,
                dashboard: true,
                availability: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
            },
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Upstream overrides
        if let Ok(v) = env::var("BFF_UPSTREAM_BASE_URL") {
            self.upstream.base_url = v;
        }
        if let Ok(v) = env::var("BFF_UPSTREAM_TIMEOUT_SECS") {
            self.upstream.request_timeout_secs = v.parse().unwrap_or(self.upstream.request_timeout_secs);
        }
        if let Ok(v) = env::var("BFF_RETRY_MAX_ATTEMPTS") {
            self.upstream.retry_max_attempts = v.parse().unwrap_or(self.upstream.retry_max_attempts);
        }
        if let Ok(v) = env::var("BFF_RETRY_BASE_DELAY_MS") {
            self.upstream.retry_base_delay_ms = v.parse().unwrap_or(self.upstream.retry_base_delay_ms);
        }

        // Cache overrides
        if let Ok(v) = env::var("BFF_CACHE_AUTH_CONTEXT_TTL_SECS") {
            self.cache.auth_context_ttl_secs = v.parse().unwrap_or(self.cache.auth_context_ttl_secs);
        }
        if let Ok(v) = env::var("BFF_CACHE_DASHBOARD_TTL_SECS") {
            self.cache.dashboard_ttl_secs = v.parse().unwrap_or(self.cache.dashboard_ttl_secs);
        }
        if let Ok(v) = env::var("BFF_CACHE_AVAILABILITY_TTL_SECS") {
            self.cache.availability_ttl_secs = v.parse().unwrap_or(self.cache.availability_ttl_secs);
        }

        // Breaker overrides
        if let Ok(v) = env::var("BFF_BREAKER_FAILURE_THRESHOLD") {
            self.breaker.failure_threshold = v.parse().unwrap_or(self.breaker.failure_threshold);
        }
        if let Ok(v) = env::var("BFF_BREAKER_COOLDOWN_SECS") {
            self.breaker.cooldown_secs = v.parse().unwrap_or(self.breaker.cooldown_secs);
        }

        // Feature flag overrides
        if let Ok(v) = env::var("BFF_FLAG_AUTH_CONTEXT") {
            self.flags.auth_context = v.parse().unwrap_or(self.flags.auth_context);
        }
        if let Ok(v) = env::var("BFF_FLAG_DASHBOARD") {
            self.flags.dashboard = v.parse().unwrap_or(self.flags.dashboard);
        }
        if let Ok(v) = env::var("BFF_FLAG_AVAILABILITY") {
            self.flags.availability = v.parse().unwrap_or(self.flags.availability);
        }

        // Security overrides
        if let Ok(v) = env::var("BFF_JWT_SECRET") {
            self.security.jwt_secret = v;
        }

        self
    }
}
