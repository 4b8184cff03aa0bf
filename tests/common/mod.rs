#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use padelyzer_bff::auth::{generate_token, Claims};
use padelyzer_bff::config::AppConfig;
use padelyzer_bff::upstream::dto::*;
use padelyzer_bff::upstream::error::UpstreamError;
use padelyzer_bff::upstream::UpstreamApi;
use padelyzer_bff::{app, AppState};

pub const JWT_SECRET: &str = "integration-test-secret";

/// The date every availability fixture is seeded for (a Monday).
pub fn fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Two-tenant fixture world: organization A with two clubs, organization B
/// with one. Every id is stable for the lifetime of the mock.
pub struct MockUpstream {
    pub org_a: Uuid,
    pub org_b: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub club_a1: Uuid,
    pub club_a2: Uuid,
    pub club_b1: Uuid,
    pub court_1: Uuid,
    pub court_2: Uuid,
    pub reservation_1: Uuid,

    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self {
            org_a: Uuid::new_v4(),
            org_b: Uuid::new_v4(),
            user_a: Uuid::new_v4(),
            user_b: Uuid::new_v4(),
            club_a1: Uuid::new_v4(),
            club_a2: Uuid::new_v4(),
            club_b1: Uuid::new_v4(),
            court_1: Uuid::new_v4(),
            court_2: Uuid::new_v4(),
            reservation_1: Uuid::new_v4(),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Make one upstream operation fail with a 500 until cleared.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// How many times an operation was attempted (including failed ones).
    pub fn calls(&self, op: &'static str) -> usize {
        *self.calls.lock().unwrap().get(op).unwrap_or(&0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn record(&self, op: &'static str) -> Result<(), UpstreamError> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(op) {
            Err(UpstreamError::Http { status: 500, body: "mock failure".into() })
        } else {
            Ok(())
        }
    }

}

#[async_trait]
impl UpstreamApi for MockUpstream {
    async fn fetch_user(&self, user_id: Uuid) -> Result<UserDto, UpstreamError> {
        self.record("user")?;
        Ok(UserDto {
            id: user_id,
            email: if user_id == self.user_b { "bruno@norte.mx".into() } else { "ana@valle.mx".into() },
            first_name: if user_id == self.user_b { "Bruno".into() } else { "Ana".into() },
            last_name: "Reyes".into(),
            is_active: true,
        })
    }

    async fn fetch_organization(&self, org_id: Uuid) -> Result<OrganizationDto, UpstreamError> {
        self.record("organization")?;
        if org_id != self.org_a && org_id != self.org_b {
            return Err(UpstreamError::NotFound(format!("organizations/{org_id}")));
        }
        Ok(OrganizationDto {
            id: org_id,
            trade_name: if org_id == self.org_a { "Padel Valle".into() } else { "Padel Norte".into() },
            business_name: "Operadora de Clubes SA de CV".into(),
            subscription_plan: "pro".into(),
            subscription_features: vec!["finance".into(), "leagues".into()],
        })
    }

    async fn fetch_clubs(&self, org_id: Uuid) -> Result<Vec<ClubDto>, UpstreamError> {
        self.record("clubs")?;
        let club = |id: Uuid, organization_id: Uuid, name: &str| ClubDto {
            id,
            organization_id,
            name: name.into(),
            is_active: true,
        };
        Ok(if org_id == self.org_b {
            vec![club(self.club_b1, self.org_b, "Norte Centro")]
        } else {
            vec![
                club(self.club_a1, self.org_a, "Valle Sur"),
                club(self.club_a2, self.org_a, "Valle Oriente"),
            ]
        })
    }

    async fn fetch_memberships(&self, user_id: Uuid) -> Result<Vec<MembershipDto>, UpstreamError> {
        self.record("memberships")?;
        Ok(if user_id == self.user_b {
            vec![MembershipDto { club_id: self.club_b1, role: "owner".into(), permissions: vec![] }]
        } else {
            vec![
                MembershipDto { club_id: self.club_a1, role: "admin".into(), permissions: vec![] },
                MembershipDto { club_id: self.club_a2, role: "staff".into(), permissions: vec![] },
            ]
        })
    }

    async fn fetch_analytics(&self, _club_id: Uuid) -> Result<AnalyticsDto, UpstreamError> {
        self.record("analytics")?;
        Ok(AnalyticsDto {
            monthly_revenue: dec!(48000),
            previous_month_revenue: dec!(40000),
            today_reservations: 22,
            previous_day_reservations: 20,
            active_clients: 180,
            previous_active_clients: 150,
            occupancy_rate: 0.64,
            previous_occupancy_rate: 0.8,
            daily_revenue: vec![
                DailyRevenueDto { date: fixture_date(), amount: dec!(1500) },
                DailyRevenueDto {
                    date: fixture_date().succ_opt().unwrap(),
                    amount: dec!(2500),
                },
            ],
            hourly_occupancy: vec![HourlyOccupancyDto { hour: 18, rate: 0.9 }],
            court_occupancy: vec![],
        })
    }

    async fn fetch_top_clients(&self, _club_id: Uuid) -> Result<Vec<TopClientDto>, UpstreamError> {
        self.record("top_clients")?;
        Ok(vec![TopClientDto {
            id: Uuid::new_v4(),
            full_name: "Marta Campos".into(),
            total_spent: dec!(3200),
            reservation_count: 14,
            last_reservation_at: None,
        }])
    }

    async fn fetch_upcoming_reservations(
        &self,
        _club_id: Uuid,
    ) -> Result<Vec<ReservationDto>, UpstreamError> {
        self.record("upcoming")?;
        Ok(vec![ReservationDto {
            id: Uuid::new_v4(),
            court_id: self.court_1,
            date: fixture_date(),
            start_time: t(18, 0),
            end_time: t(19, 30),
            status: ReservationStatus::Confirmed,
            player_name: Some("Liga nocturna".into()),
            player_count: Some(4),
        }])
    }

    async fn fetch_courts(&self, _club_id: Uuid) -> Result<Vec<CourtDto>, UpstreamError> {
        self.record("courts")?;
        Ok(vec![
            CourtDto {
                id: self.court_1,
                name: "Pista 1".into(),
                is_active: true,
                hourly_rate: dec!(400),
                currency: "MXN".into(),
            },
            CourtDto {
                id: self.court_2,
                name: "Pista 2".into(),
                is_active: true,
                hourly_rate: dec!(350),
                currency: "MXN".into(),
            },
        ])
    }

    async fn fetch_day_schedule(
        &self,
        _club_id: Uuid,
        _date: NaiveDate,
    ) -> Result<DayScheduleDto, UpstreamError> {
        self.record("schedule")?;
        Ok(DayScheduleDto { open_time: t(8, 0), close_time: t(22, 0), slot_minutes: 90 })
    }

    async fn fetch_reservations(
        &self,
        _club_id: Uuid,
        _date: NaiveDate,
    ) -> Result<Vec<ReservationDto>, UpstreamError> {
        self.record("reservations")?;
        Ok(vec![ReservationDto {
            id: self.reservation_1,
            court_id: self.court_1,
            date: fixture_date(),
            start_time: t(10, 0),
            end_time: t(11, 30),
            status: ReservationStatus::Confirmed,
            player_name: None,
            player_count: None,
        }])
    }

    async fn fetch_pricing_rules(
        &self,
        _club_id: Uuid,
    ) -> Result<Vec<PricingRuleDto>, UpstreamError> {
        self.record("pricing_rules")?;
        Ok(vec![PricingRuleDto {
            id: Uuid::new_v4(),
            name: "prime time".into(),
            start_time: t(18, 0),
            end_time: t(22, 0),
            days_of_week: None,
            price_override: None,
            multiplier: Some(dec!(1.5)),
        }])
    }

    async fn fetch_promotions(&self, _club_id: Uuid) -> Result<Vec<PromotionDto>, UpstreamError> {
        self.record("promotions")?;
        Ok(vec![PromotionDto {
            id: Uuid::new_v4(),
            name: "verano".into(),
            percent_off: dec!(10),
            valid_from: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        }])
    }
}

/// Default test configuration: all flags on, in-test JWT secret. The mock
/// upstream sits below the retry layer, so injected failures surface
/// immediately.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_env();
    config.security.jwt_secret = JWT_SECRET.to_string();
    config
}

pub fn build_app(config: AppConfig) -> (Router, Arc<MockUpstream>) {
    let upstream = Arc::new(MockUpstream::new());
    let state = AppState::new(config, upstream.clone());
    (app(state), upstream)
}

pub fn token_for(user_id: Uuid, email: &str, org_id: Uuid) -> String {
    let claims = Claims::new(user_id, email.to_string(), org_id, 4);
    generate_token(&claims, JWT_SECRET).expect("token generation")
}

pub fn expired_token_for(user_id: Uuid, org_id: Uuid) -> String {
    // Expired two hours ago, beyond jsonwebtoken's default leeway
    let claims = Claims::new(user_id, "stale@valle.mx".to_string(), org_id, -2);
    generate_token(&claims, JWT_SECRET).expect("token generation")
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, headers, body)
}

pub async fn get(
    router: &Router,
    path: &str,
    token: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    router: &Router,
    path: &str,
    token: Option<&str>,
    body: &Value,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(router, builder.body(Body::from(body.to_string())).unwrap()).await
}
