use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// Monday 00:00:00 UTC of the ISO week containing `now`.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_from_monday = now.weekday().num_days_from_monday() as i64;
    let monday = now.date_naive() - Duration::days(days_from_monday);
    Utc.from_utc_datetime(&monday.and_hms_opt(0, 0, 0).expect("midnight is valid"))
}

/// Half-open [Monday 00:00, next Monday 00:00) window around `now`.
pub fn week_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = week_start(now);
    (start, start + Duration::days(7))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn week_starts_on_monday_midnight() {
        // 2024-06-13 is a Thursday.
        let thursday = Utc.with_ymd_and_hms(2024, 6, 13, 15, 30, 0).unwrap();
        let start = week_start(thursday);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap());
        assert_eq!(start.weekday(), Weekday::Mon);
    }

    #[test]
    fn monday_is_its_own_week_start() {
        let monday = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn sunday_belongs_to_the_preceding_monday() {
        let sunday = Utc.with_ymd_and_hms(2024, 6, 16, 23, 59, 59).unwrap();
        assert_eq!(
            week_start(sunday),
            Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn bounds_span_exactly_seven_days() {
        let now = Utc.with_ymd_and_hms(2024, 6, 13, 12, 0, 0).unwrap();
        let (start, end) = week_bounds(now);
        assert_eq!(end - start, Duration::days(7));
        assert!(start <= now && now < end);
    }
}
