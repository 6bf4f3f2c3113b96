use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone, Utc};

/// The calendar day the till is counted against, in server local time.
pub fn business_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

/// Half-open UTC range `[start, end)` covering a local calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    (local_midnight(date), local_midnight(next))
}

/// Half-open UTC range from the first of the month up to the end of `date`.
pub fn month_to_date_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = date.with_day(1).unwrap_or(date);
    let (_, end) = day_bounds(date);
    (local_midnight(first), end)
}

fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_span_one_day() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 20).unwrap();
        let (start, end) = day_bounds(date);
        assert!(end > start);
        assert_eq!(business_date(start), date);
        assert_eq!(business_date(end), NaiveDate::from_ymd_opt(2026, 5, 21).unwrap());
    }

    #[test]
    fn month_to_date_starts_on_the_first() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 20).unwrap();
        let (start, _) = month_to_date_bounds(date);
        assert_eq!(business_date(start), NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
    }
}
