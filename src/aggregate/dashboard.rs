//! Dashboard overview view. Each section maps from its own upstream call
//! and degrades to a zeroed/empty default independently, so one failing
//! subsystem never blanks the whole dashboard.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::percent_change;
use crate::upstream::dto::{AnalyticsDto, ReservationDto, TopClientDto};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub monthly_revenue: Decimal,
    pub revenue_change: f64,
    pub today_reservations: u32,
    pub reservations_change: f64,
    pub active_clients: u32,
    pub clients_change: f64,
    pub occupancy_rate: f64,
    pub occupancy_change: f64,
    pub revenue_chart: RevenueChart,
    pub occupancy_heatmap: OccupancyHeatmap,
    pub top_clients: Vec<TopClientView>,
    pub upcoming_events: Vec<UpcomingEventView>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueChart {
    pub daily: Vec<DailyRevenuePoint>,
    pub total: Decimal,
    pub change: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenuePoint {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyHeatmap {
    pub hourly: Vec<HourlyOccupancyPoint>,
    pub courts: Vec<CourtOccupancyPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyOccupancyPoint {
    pub hour: u8,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtOccupancyPoint {
    pub court_id: Uuid,
    pub court_name: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopClientView {
    pub id: Uuid,
    pub name: String,
    pub total_spent: Decimal,
    pub reservation_count: u32,
    pub last_reservation_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEventView {
    pub id: Uuid,
    pub court_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub title: String,
    pub player_count: u8,
}

/// Assemble the view from whichever sub-calls succeeded. `None` means the
/// call failed after its retry/breaker budget; that section keeps its
/// zeroed default. Returns the view plus whether any fallback was used.
pub fn build_dashboard(
    analytics: Option<AnalyticsDto>,
    top_clients: Option<Vec<TopClientDto>>,
    upcoming: Option<Vec<ReservationDto>>,
) -> (DashboardView, bool) {
    let mut fallback = false;
    let mut view = DashboardView::default();

    match analytics {
        Some(dto) => apply_analytics(&mut view, dto),
        None => fallback = true,
    }

    match top_clients {
        Some(clients) => {
            view.top_clients = clients
                .into_iter()
                .map(|c| TopClientView {
                    id: c.id,
                    name: c.full_name,
                    total_spent: c.total_spent,
                    reservation_count: c.reservation_count,
                    last_reservation_at: c.last_reservation_at,
                })
                .collect();
        }
        None => fallback = true,
    }

    match upcoming {
        Some(reservations) => {
            view.upcoming_events = reservations
                .into_iter()
                .filter(ReservationDto::blocks_slot)
                .map(|r| UpcomingEventView {
                    id: r.id,
                    court_id: r.court_id,
                    date: r.date,
                    start_time: r.start_time,
                    end_time: r.end_time,
                    title: r.player_name.unwrap_or_else(|| "Reserva".to_string()),
                    player_count: r.player_count.unwrap_or(4),
                })
                .collect();
        }
        None => fallback = true,
    }

    (view, fallback)
}

fn apply_analytics(view: &mut DashboardView, dto: AnalyticsDto) {
    use rust_decimal::prelude::ToPrimitive;

    view.monthly_revenue = dto.monthly_revenue;
    view.revenue_change = percent_change(
        dto.monthly_revenue.to_f64().unwrap_or(0.0),
        dto.previous_month_revenue.to_f64().unwrap_or(0.0),
    );
    view.today_reservations = dto.today_reservations;
    view.reservations_change =
        percent_change(dto.today_reservations as f64, dto.previous_day_reservations as f64);
    view.active_clients = dto.active_clients;
    view.clients_change =
        percent_change(dto.active_clients as f64, dto.previous_active_clients as f64);
    view.occupancy_rate = dto.occupancy_rate;
    view.occupancy_change = percent_change(dto.occupancy_rate, dto.previous_occupancy_rate);

    let total: Decimal = dto.daily_revenue.iter().map(|d| d.amount).sum();
    view.revenue_chart = RevenueChart {
        daily: dto
            .daily_revenue
            .into_iter()
            .map(|d| DailyRevenuePoint { date: d.date, amount: d.amount })
            .collect(),
        total,
        change: view.revenue_change,
    };

    view.occupancy_heatmap = OccupancyHeatmap {
        hourly: dto
            .hourly_occupancy
            .into_iter()
            .map(|h| HourlyOccupancyPoint { hour: h.hour, rate: h.rate })
            .collect(),
        courts: dto
            .court_occupancy
            .into_iter()
            .map(|c| CourtOccupancyPoint {
                court_id: c.court_id,
                court_name: c.court_name,
                rate: c.rate,
            })
            .collect(),
    };
}
