pub mod breaker;
pub mod call;
pub mod dto;
pub mod error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::config::UpstreamConfig;
use breaker::CircuitBreakerRegistry;
use call::{with_resilience, RetryPolicy};
use dto::*;
use error::{map_reqwest_error, UpstreamError};

// Logical upstream targets. Each gets its own breaker so one failing
// subsystem does not trip calls to the others.
pub const TARGET_IDENTITY: &str = "identity";
pub const TARGET_CLUBS: &str = "clubs";
pub const TARGET_ANALYTICS: &str = "analytics";
pub const TARGET_CLIENTS: &str = "clients";
pub const TARGET_RESERVATIONS: &str = "reservations";
pub const TARGET_PRICING: &str = "pricing";

/// Seam to the Padelyzer domain API. Handlers depend on this trait so the
/// integration tests can inject a counting mock instead of a live server.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    async fn fetch_user(&self, user_id: Uuid) -> Result<UserDto, UpstreamError>;
    async fn fetch_organization(&self, org_id: Uuid) -> Result<OrganizationDto, UpstreamError>;
    async fn fetch_clubs(&self, org_id: Uuid) -> Result<Vec<ClubDto>, UpstreamError>;
    async fn fetch_memberships(&self, user_id: Uuid) -> Result<Vec<MembershipDto>, UpstreamError>;

    async fn fetch_analytics(&self, club_id: Uuid) -> Result<AnalyticsDto, UpstreamError>;
    async fn fetch_top_clients(&self, club_id: Uuid) -> Result<Vec<TopClientDto>, UpstreamError>;
    async fn fetch_upcoming_reservations(
        &self,
        club_id: Uuid,
    ) -> Result<Vec<ReservationDto>, UpstreamError>;

    async fn fetch_courts(&self, club_id: Uuid) -> Result<Vec<CourtDto>, UpstreamError>;
    async fn fetch_day_schedule(
        &self,
        club_id: Uuid,
        date: NaiveDate,
    ) -> Result<DayScheduleDto, UpstreamError>;
    async fn fetch_reservations(
        &self,
        club_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ReservationDto>, UpstreamError>;
    async fn fetch_pricing_rules(&self, club_id: Uuid) -> Result<Vec<PricingRuleDto>, UpstreamError>;
    async fn fetch_promotions(&self, club_id: Uuid) -> Result<Vec<PromotionDto>, UpstreamError>;
}

/// Production client: reqwest with a bounded timeout, every call routed
/// through the per-target breaker and the shared retry policy.
pub struct HttpUpstream {
    http: reqwest::Client,
    base_url: String,
    breakers: Arc<CircuitBreakerRegistry>,
    retry: RetryPolicy,
}

impl HttpUpstream {
    pub fn new(
        config: &UpstreamConfig,
        breakers: Arc<CircuitBreakerRegistry>,
    ) -> anyhow::Result<Self> {
        // Fail fast on a malformed base URL instead of erroring per request
        let parsed = Url::parse(&config.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("padelyzer-bff/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            breakers,
            retry: RetryPolicy::new(
                config.retry_max_attempts,
                Duration::from_millis(config.retry_base_delay_ms),
            ),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        target: &str,
        path: &str,
    ) -> Result<T, UpstreamError> {
        let breaker = self.breakers.breaker(target);
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        with_resilience(&breaker, &self.retry, || {
            let url = url.clone();
            async move {
                let res = self.http.get(&url).send().await.map_err(map_reqwest_error)?;

                match res.status() {
                    s if s.is_success() => {
                        res.json::<T>().await.map_err(|e| UpstreamError::Decode(e.to_string()))
                    }
                    StatusCode::NOT_FOUND => Err(UpstreamError::NotFound(url.clone())),
                    s => {
                        let status = s.as_u16();
                        let body = res.text().await.unwrap_or_default();
                        Err(UpstreamError::Http { status, body })
                    }
                }
            }
        })
        .await
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstream {
    async fn fetch_user(&self, user_id: Uuid) -> Result<UserDto, UpstreamError> {
        self.get_json(TARGET_IDENTITY, &format!("users/{user_id}")).await
    }

    async fn fetch_organization(&self, org_id: Uuid) -> Result<OrganizationDto, UpstreamError> {
        self.get_json(TARGET_IDENTITY, &format!("organizations/{org_id}")).await
    }

    async fn fetch_clubs(&self, org_id: Uuid) -> Result<Vec<ClubDto>, UpstreamError> {
        self.get_json(TARGET_CLUBS, &format!("organizations/{org_id}/clubs")).await
    }

    async fn fetch_memberships(&self, user_id: Uuid) -> Result<Vec<MembershipDto>, UpstreamError> {
        self.get_json(TARGET_IDENTITY, &format!("users/{user_id}/memberships")).await
    }

    async fn fetch_analytics(&self, club_id: Uuid) -> Result<AnalyticsDto, UpstreamError> {
        self.get_json(TARGET_ANALYTICS, &format!("clubs/{club_id}/analytics/dashboard")).await
    }

    async fn fetch_top_clients(&self, club_id: Uuid) -> Result<Vec<TopClientDto>, UpstreamError> {
        self.get_json(TARGET_CLIENTS, &format!("clubs/{club_id}/clients/top")).await
    }

    async fn fetch_upcoming_reservations(
        &self,
        club_id: Uuid,
    ) -> Result<Vec<ReservationDto>, UpstreamError> {
        self.get_json(TARGET_RESERVATIONS, &format!("clubs/{club_id}/reservations/upcoming")).await
    }

    async fn fetch_courts(&self, club_id: Uuid) -> Result<Vec<CourtDto>, UpstreamError> {
        self.get_json(TARGET_CLUBS, &format!("clubs/{club_id}/courts")).await
    }

    async fn fetch_day_schedule(
        &self,
        club_id: Uuid,
        date: NaiveDate,
    ) -> Result<DayScheduleDto, UpstreamError> {
        self.get_json(TARGET_CLUBS, &format!("clubs/{club_id}/schedule?date={date}")).await
    }

    async fn fetch_reservations(
        &self,
        club_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ReservationDto>, UpstreamError> {
        self.get_json(TARGET_RESERVATIONS, &format!("clubs/{club_id}/reservations?date={date}"))
            .await
    }

    async fn fetch_pricing_rules(
        &self,
        club_id: Uuid,
    ) -> Result<Vec<PricingRuleDto>, UpstreamError> {
        self.get_json(TARGET_PRICING, &format!("clubs/{club_id}/pricing-rules")).await
    }

    async fn fetch_promotions(&self, club_id: Uuid) -> Result<Vec<PromotionDto>, UpstreamError> {
        self.get_json(TARGET_PRICING, &format!("clubs/{club_id}/promotions")).await
    }
}
