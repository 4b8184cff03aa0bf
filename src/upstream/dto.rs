//! Typed shapes for every domain-API payload the aggregator consumes.
//! Upstream JSON is always decoded into one of these before any
//! transformation; raw values are never passed through.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationDto {
    pub id: Uuid,
    pub trade_name: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub subscription_plan: String,
    #[serde(default)]
    pub subscription_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubDto {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Per-user, per-club grant. The caller may only read/act on clubs for
/// which one of these exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipDto {
    pub club_id: Uuid,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsDto {
    pub monthly_revenue: Decimal,
    #[serde(default)]
    pub previous_month_revenue: Decimal,
    pub today_reservations: u32,
    #[serde(default)]
    pub previous_day_reservations: u32,
    pub active_clients: u32,
    #[serde(default)]
    pub previous_active_clients: u32,
    pub occupancy_rate: f64,
    #[serde(default)]
    pub previous_occupancy_rate: f64,
    #[serde(default)]
    pub daily_revenue: Vec<DailyRevenueDto>,
    #[serde(default)]
    pub hourly_occupancy: Vec<HourlyOccupancyDto>,
    #[serde(default)]
    pub court_occupancy: Vec<CourtOccupancyDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRevenueDto {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyOccupancyDto {
    pub hour: u8,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtOccupancyDto {
    pub court_id: Uuid,
    pub court_name: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopClientDto {
    pub id: Uuid,
    pub full_name: String,
    pub total_spent: Decimal,
    pub reservation_count: u32,
    #[serde(default)]
    pub last_reservation_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDto {
    pub id: Uuid,
    pub court_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub player_count: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationDto {
    /// Cancelled bookings free their slot.
    pub fn blocks_slot(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtDto {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub hourly_rate: Decimal,
    pub currency: String,
}

/// Opening hours and slot granularity for one club on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayScheduleDto {
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub slot_minutes: u32,
}

/// Time-window price adjustment, e.g. prime-time evenings. Either a fixed
/// override or a multiplier on the base rate; the first matching rule wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRuleDto {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub days_of_week: Option<Vec<Weekday>>,
    #[serde(default)]
    pub price_override: Option<Decimal>,
    #[serde(default)]
    pub multiplier: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionDto {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    pub percent_off: Decimal,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

impl PromotionDto {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_until
    }
}

fn default_true() -> bool {
    true
}
