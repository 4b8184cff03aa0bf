//! Availability view: merges courts, the day schedule, existing
//! reservations and pricing data into per-court time slots.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::upstream::dto::{
    CourtDto, DayScheduleDto, PricingRuleDto, PromotionDto, ReservationDto,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityView {
    pub club_id: Uuid,
    pub date: NaiveDate,
    pub courts: Vec<CourtAvailability>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtAvailability {
    pub id: Uuid,
    pub name: String,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub price: PriceView,
    /// Ids of reservations overlapping this slot; empty when available.
    pub conflicts: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceView {
    pub amount: Decimal,
    pub currency: String,
}

/// Build the per-court slot grid for one club and date. Inactive courts
/// are skipped; cancelled reservations never conflict.
pub fn build_availability(
    club_id: Uuid,
    date: NaiveDate,
    courts: Vec<CourtDto>,
    schedule: DayScheduleDto,
    reservations: Vec<ReservationDto>,
    pricing_rules: &[PricingRuleDto],
    promotions: &[PromotionDto],
) -> AvailabilityView {
    let grid = slot_grid(&schedule);

    let courts = courts
        .into_iter()
        .filter(|c| c.is_active)
        .map(|court| {
            let slots = grid
                .iter()
                .map(|&(start, end)| {
                    let conflicts: Vec<Uuid> = reservations
                        .iter()
                        .filter(|r| {
                            r.court_id == court.id
                                && r.blocks_slot()
                                && overlaps(start, end, r.start_time, r.end_time)
                        })
                        .map(|r| r.id)
                        .collect();

                    let amount = slot_price(
                        &court,
                        start,
                        date,
                        schedule.slot_minutes,
                        pricing_rules,
                        promotions,
                    );

                    SlotView {
                        start_time: start,
                        end_time: end,
                        is_available: conflicts.is_empty(),
                        price: PriceView { amount, currency: court.currency.clone() },
                        conflicts,
                    }
                })
                .collect();

            CourtAvailability { id: court.id, name: court.name, slots }
        })
        .collect();

    AvailabilityView { club_id, date, courts }
}

/// Half-open interval overlap.
fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    b_start < a_end && a_start < b_end
}

fn slot_grid(schedule: &DayScheduleDto) -> Vec<(NaiveTime, NaiveTime)> {
    let step = Duration::minutes(schedule.slot_minutes.max(1) as i64);
    let mut slots = Vec::new();
    let mut start = schedule.open_time;

    while start < schedule.close_time {
        let end = start + step;
        // NaiveTime arithmetic wraps at midnight
        if end <= start || end > schedule.close_time {
            break;
        }
        slots.push((start, end));
        start = end;
    }

    slots
}

/// Base rate scaled to the slot length, then the first matching pricing
/// rule, then any promotion active on the date. Rules and promotions are
/// enrichment data: callers pass empty slices when that fetch fell back.
fn slot_price(
    court: &CourtDto,
    slot_start: NaiveTime,
    date: NaiveDate,
    slot_minutes: u32,
    pricing_rules: &[PricingRuleDto],
    promotions: &[PromotionDto],
) -> Decimal {
    let slot_fraction = Decimal::from(slot_minutes) / Decimal::from(60u32);
    let mut hourly = court.hourly_rate;

    if let Some(rule) = pricing_rules.iter().find(|r| rule_matches(r, slot_start, date)) {
        if let Some(override_price) = rule.price_override {
            hourly = override_price;
        } else if let Some(multiplier) = rule.multiplier {
            hourly *= multiplier;
        }
    }

    let mut amount = hourly * slot_fraction;

    for promo in promotions.iter().filter(|p| p.applies_on(date)) {
        amount -= amount * promo.percent_off / Decimal::from(100u32);
    }

    // Fixed two-decimal wire format regardless of intermediate scale
    let mut amount = amount.round_dp(2);
    amount.rescale(2);
    amount
}

fn rule_matches(rule: &PricingRuleDto, slot_start: NaiveTime, date: NaiveDate) -> bool {
    if !(rule.start_time <= slot_start && slot_start < rule.end_time) {
        return false;
    }
    match &rule.days_of_week {
        Some(days) => days.contains(&date.weekday()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::dto::ReservationStatus;
    use chrono::Weekday;
    use rust_decimal_macros::dec;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 2025-06-02 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn court(id: Uuid) -> CourtDto {
        CourtDto {
            id,
            name: "Pista 1".into(),
            is_active: true,
            hourly_rate: dec!(400),
            currency: "MXN".into(),
        }
    }

    fn schedule() -> DayScheduleDto {
        DayScheduleDto { open_time: t(8, 0), close_time: t(22, 0), slot_minutes: 90 }
    }

    fn reservation(court_id: Uuid, start: NaiveTime, end: NaiveTime) -> ReservationDto {
        ReservationDto {
            id: Uuid::new_v4(),
            court_id,
            date: monday(),
            start_time: start,
            end_time: end,
            status: ReservationStatus::Confirmed,
            player_name: None,
            player_count: None,
        }
    }

    #[test]
    fn grid_covers_opening_hours() {
        let slots = slot_grid(&schedule());
        // 8:00-22:00 in 90-minute steps: 9 full slots, 21:30-23:00 does not fit
        assert_eq!(slots.len(), 9);
        assert_eq!(slots[0], (t(8, 0), t(9, 30)));
        assert_eq!(slots.last().unwrap().1, t(21, 30));
    }

    #[test]
    fn overlapping_reservation_blocks_slot_with_conflict_id() {
        let court_id = Uuid::new_v4();
        let res = reservation(court_id, t(9, 0), t(10, 0));
        let res_id = res.id;

        let view = build_availability(
            Uuid::new_v4(),
            monday(),
            vec![court(court_id)],
            schedule(),
            vec![res],
            &[],
            &[],
        );

        let slots = &view.courts[0].slots;
        // reservation 9:00-10:00 straddles both the 8:00-9:30 and 9:30-11:00 slots
        assert!(!slots[0].is_available);
        assert_eq!(slots[0].conflicts, vec![res_id]);
        assert!(!slots[1].is_available);
        // 11:00 onwards untouched
        assert!(slots[2].is_available);
        assert!(slots[2].conflicts.is_empty());
    }

    #[test]
    fn cancelled_reservation_frees_the_slot() {
        let court_id = Uuid::new_v4();
        let mut res = reservation(court_id, t(8, 0), t(9, 30));
        res.status = ReservationStatus::Cancelled;

        let view = build_availability(
            Uuid::new_v4(),
            monday(),
            vec![court(court_id)],
            schedule(),
            vec![res],
            &[],
            &[],
        );

        assert!(view.courts[0].slots[0].is_available);
    }

    #[test]
    fn reservation_on_other_court_does_not_conflict() {
        let court_id = Uuid::new_v4();
        let res = reservation(Uuid::new_v4(), t(8, 0), t(9, 30));

        let view = build_availability(
            Uuid::new_v4(),
            monday(),
            vec![court(court_id)],
            schedule(),
            vec![res],
            &[],
            &[],
        );

        assert!(view.courts[0].slots[0].is_available);
    }

    #[test]
    fn base_price_scales_to_slot_length() {
        let view = build_availability(
            Uuid::new_v4(),
            monday(),
            vec![court(Uuid::new_v4())],
            schedule(),
            vec![],
            &[],
            &[],
        );

        // 400/hour over a 90-minute slot
        assert_eq!(view.courts[0].slots[0].price.amount, dec!(600.00));
        assert_eq!(view.courts[0].slots[0].price.currency, "MXN");
    }

    #[test]
    fn prime_time_multiplier_applies_inside_window() {
        let rule = PricingRuleDto {
            id: Uuid::new_v4(),
            name: "prime".into(),
            start_time: t(18, 0),
            end_time: t(22, 0),
            days_of_week: None,
            price_override: None,
            multiplier: Some(dec!(1.5)),
        };

        let view = build_availability(
            Uuid::new_v4(),
            monday(),
            vec![court(Uuid::new_v4())],
            schedule(),
            vec![],
            &[rule],
            &[],
        );

        let slots = &view.courts[0].slots;
        // 18:30-20:00 slot falls in the window: 400 * 1.5 * 1.5h
        let prime = slots.iter().find(|s| s.start_time == t(18, 30)).unwrap();
        assert_eq!(prime.price.amount, dec!(900.00));
        // morning slot keeps the base price
        assert_eq!(slots[0].price.amount, dec!(600.00));
    }

    #[test]
    fn weekday_scoped_rule_skips_other_days() {
        let rule = PricingRuleDto {
            id: Uuid::new_v4(),
            name: "weekend".into(),
            start_time: t(8, 0),
            end_time: t(22, 0),
            days_of_week: Some(vec![Weekday::Sat, Weekday::Sun]),
            price_override: Some(dec!(500)),
            multiplier: None,
        };

        let view = build_availability(
            Uuid::new_v4(),
            monday(),
            vec![court(Uuid::new_v4())],
            schedule(),
            vec![],
            &[rule],
            &[],
        );

        assert_eq!(view.courts[0].slots[0].price.amount, dec!(600.00));
    }

    #[test]
    fn active_promotion_discounts_price() {
        let promo = PromotionDto {
            id: Uuid::new_v4(),
            name: "verano".into(),
            percent_off: dec!(10),
            valid_from: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        };

        let view = build_availability(
            Uuid::new_v4(),
            monday(),
            vec![court(Uuid::new_v4())],
            schedule(),
            vec![],
            &[],
            &[promo],
        );

        assert_eq!(view.courts[0].slots[0].price.amount, dec!(540.00));
    }

    #[test]
    fn expired_promotion_is_ignored() {
        let promo = PromotionDto {
            id: Uuid::new_v4(),
            name: "primavera".into(),
            percent_off: dec!(25),
            valid_from: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
        };

        let view = build_availability(
            Uuid::new_v4(),
            monday(),
            vec![court(Uuid::new_v4())],
            schedule(),
            vec![],
            &[],
            &[promo],
        );

        assert_eq!(view.courts[0].slots[0].price.amount, dec!(600.00));
    }

    #[test]
    fn inactive_court_is_excluded() {
        let mut c = court(Uuid::new_v4());
        c.is_active = false;

        let view = build_availability(
            Uuid::new_v4(),
            monday(),
            vec![c],
            schedule(),
            vec![],
            &[],
            &[],
        );

        assert!(view.courts.is_empty());
    }
}
