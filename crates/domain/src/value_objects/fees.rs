use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::value_objects::{enums::vehicle_categories::VehicleCategory, rates::RateCard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub total_minutes: i64,
    pub whole_hours: i64,
    pub remainder_minutes: i64,
    pub amount_minor: i64,
}

/// Minute-exact billing.
///
/// Elapsed time is truncated to whole minutes. Stays under an hour pay
/// `minutes * per_minute`; longer stays pay `hours * per_hour` plus the
/// leftover minutes at the per-minute rate. Negative elapsed time bills zero.
/// The amount saturates at `i64::MAX` instead of wrapping.
pub fn calculate_fee(
    entered_at: DateTime<Utc>,
    until: DateTime<Utc>,
    category: VehicleCategory,
    rates: &RateCard,
) -> FeeBreakdown {
    let total_minutes = (until - entered_at).num_minutes().max(0);
    let whole_hours = total_minutes / 60;
    let remainder_minutes = total_minutes % 60;
    let tier = rates.tier(category);

    let amount_minor = if whole_hours < 1 {
        total_minutes.saturating_mul(tier.per_minute_minor)
    } else {
        whole_hours
            .saturating_mul(tier.per_hour_minor)
            .saturating_add(remainder_minutes.saturating_mul(tier.per_minute_minor))
    };

    FeeBreakdown {
        total_minutes,
        whole_hours,
        remainder_minutes,
        amount_minor,
    }
}

/// Final billed amount, floored at zero when the discount exceeds the fee.
pub fn apply_discount(gross_minor: i64, discount_minor: i64) -> i64 {
    (gross_minor - discount_minor.max(0)).max(0)
}

/// Stored parked time, rounded to the nearest minute.
pub fn parked_minutes(entered_at: DateTime<Utc>, exited_at: DateTime<Utc>) -> i32 {
    let seconds = (exited_at - entered_at).num_seconds().max(0);
    i32::try_from((seconds + 30) / 60).unwrap_or(i32::MAX)
}

/// `"2h 20m"`; hours are not wrapped at 24.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_minutes = elapsed.num_minutes().max(0);
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn short_car_stay_is_billed_per_minute() {
        let fee = calculate_fee(at(9, 0), at(9, 45), VehicleCategory::Car, &RateCard::default());
        assert_eq!(fee.total_minutes, 45);
        assert_eq!(fee.amount_minor, 315_000);
    }

    #[test]
    fn long_car_stay_bills_hours_plus_remainder_minutes() {
        let fee = calculate_fee(at(9, 0), at(11, 20), VehicleCategory::Car, &RateCard::default());
        assert_eq!(fee.whole_hours, 2);
        assert_eq!(fee.remainder_minutes, 20);
        assert_eq!(fee.amount_minor, 540_000);
    }

    #[test]
    fn motorcycle_uses_its_own_tier() {
        let fee = calculate_fee(
            at(9, 0),
            at(10, 10),
            VehicleCategory::Motorcycle,
            &RateCard::default(),
        );
        assert_eq!(fee.amount_minor, 100_000 + 10 * 7_000);
    }

    #[test]
    fn every_duration_under_an_hour_is_minute_priced() {
        let rates = RateCard::default();
        for minutes in 0..60 {
            let fee = calculate_fee(
                at(8, 0),
                at(8, 0) + Duration::minutes(minutes),
                VehicleCategory::Car,
                &rates,
            );
            assert_eq!(fee.amount_minor, minutes * rates.car.per_minute_minor);
        }
    }

    #[test]
    fn exactly_one_hour_is_one_hourly_charge() {
        let fee = calculate_fee(at(9, 0), at(10, 0), VehicleCategory::Car, &RateCard::default());
        assert_eq!(fee.amount_minor, 200_000);
    }

    #[test]
    fn stays_longer_than_a_day_bill_every_hour() {
        let entered_at = at(9, 0);
        let fee = calculate_fee(
            entered_at,
            entered_at + Duration::hours(26) + Duration::minutes(5),
            VehicleCategory::Car,
            &RateCard::default(),
        );
        assert_eq!(fee.whole_hours, 26);
        assert_eq!(fee.amount_minor, 26 * 200_000 + 5 * 7_000);
    }

    #[test]
    fn seconds_are_truncated() {
        let fee = calculate_fee(
            at(9, 0),
            at(9, 0) + Duration::seconds(59),
            VehicleCategory::Car,
            &RateCard::default(),
        );
        assert_eq!(fee.amount_minor, 0);
    }

    #[test]
    fn exit_before_entry_bills_nothing() {
        let fee = calculate_fee(at(10, 0), at(9, 0), VehicleCategory::Car, &RateCard::default());
        assert_eq!(fee.total_minutes, 0);
        assert_eq!(fee.amount_minor, 0);
    }

    #[test]
    fn huge_rates_saturate_instead_of_wrapping() {
        let mut rates = RateCard::default();
        rates.car.per_hour_minor = 9_000_000_000_000_000_000;

        let fee = calculate_fee(at(9, 0), at(11, 0), VehicleCategory::Car, &rates);
        assert_eq!(fee.whole_hours, 2);
        assert_eq!(fee.amount_minor, i64::MAX);
    }

    #[test]
    fn discount_is_subtracted_and_floored_at_zero() {
        assert_eq!(apply_discount(540_000, 40_000), 500_000);
        assert_eq!(apply_discount(100_000, 250_000), 0);
        assert_eq!(apply_discount(100_000, -10), 100_000);
    }

    #[test]
    fn parked_minutes_round_to_nearest() {
        assert_eq!(parked_minutes(at(9, 0), at(9, 0) + Duration::seconds(89)), 1);
        assert_eq!(parked_minutes(at(9, 0), at(9, 0) + Duration::seconds(90)), 2);
    }

    #[test]
    fn elapsed_is_formatted_in_hours_and_minutes() {
        assert_eq!(format_elapsed(Duration::minutes(140)), "2h 20m");
        assert_eq!(format_elapsed(Duration::minutes(1505)), "25h 5m");
    }
}
