use axum::{
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

pub const CACHE_HEADER: &str = "x-cache";
pub const FALLBACK_HEADER: &str = "x-fallback";

/// Whether the response was served from the response cache or computed by
/// fanning out to the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
        }
    }
}

/// Wrapper for aggregated responses. Adds the success envelope plus the
/// cache and fallback markers callers and tests assert on, both in the
/// body meta block and as response headers.
#[derive(Debug)]
pub struct AggregateResponse<T: Serialize> {
    pub data: T,
    pub cache: CacheStatus,
    pub fallback: bool,
}

impl<T: Serialize> AggregateResponse<T> {
    pub fn hit(data: T) -> Self {
        Self { data, cache: CacheStatus::Hit, fallback: false }
    }

    pub fn miss(data: T) -> Self {
        Self { data, cache: CacheStatus::Miss, fallback: false }
    }

    /// Mark that one or more upstream sections were replaced by defaults.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }
}

impl<T: Serialize> IntoResponse for AggregateResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": true,
            "data": data_value,
            "meta": {
                "cache": self.cache.as_str(),
                "fallback": self.fallback,
            }
        });

        let mut response = (StatusCode::OK, Json(envelope)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            HeaderName::from_static(CACHE_HEADER),
            HeaderValue::from_static(match self.cache {
                CacheStatus::Hit => "HIT",
                CacheStatus::Miss => "MISS",
            }),
        );
        headers.insert(
            HeaderName::from_static(FALLBACK_HEADER),
            HeaderValue::from_static(if self.fallback { "true" } else { "false" }),
        );
        response
    }
}
