use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::interval::TimeInterval;

const INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses `YYYY-MM-DD HH:MM` as local wall-clock time.
pub fn parse_local_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), INPUT_FORMAT)
        .map_err(|_| "Invalid date format. Use YYYY-MM-DD HH:MM.".to_string())?;
    let result = Local.from_local_datetime(&naive);
    result
        .earliest()
        .or_else(|| result.latest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("{value} does not exist in the local time zone."))
}

/// `2026-02-03 10:00 → 11:00`, or with the end date when the span crosses a day.
pub fn format_span<Tz: TimeZone>(interval: &TimeInterval, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let start = interval.start().with_timezone(tz);
    let end = interval.end().with_timezone(tz);
    if start.date_naive() == end.date_naive() {
        format!("{} → {}", start.format(INPUT_FORMAT), end.format("%H:%M"))
    } else {
        format!("{} → {}", start.format(INPUT_FORMAT), end.format(INPUT_FORMAT))
    }
}

pub fn format_duration(seconds: i64) -> String {
    let minutes = seconds / 60;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::tests::{at, span};
    use chrono::Duration;

    #[test]
    fn parse_local_datetime_valid() {
        let parsed = parse_local_datetime("2026-02-03 10:15").unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2026-02-03 10:15");
    }

    #[test]
    fn parse_local_datetime_invalid() {
        assert!(parse_local_datetime("03-02-2026 10:15").is_err());
        assert!(parse_local_datetime("2026-02-03").is_err());
    }

    #[test]
    fn same_day_span_omits_end_date() {
        assert_eq!(format_span(&span((10, 0), (11, 30)), &Utc), "2026-02-03 10:00 → 11:30");
    }

    #[test]
    fn overnight_span_shows_both_dates() {
        let interval = TimeInterval::new(at(23, 0), at(23, 0) + Duration::hours(2)).unwrap();
        assert_eq!(
            format_span(&interval, &Utc),
            "2026-02-03 23:00 → 2026-02-04 01:00"
        );
    }

    #[test]
    fn duration_is_hours_and_minutes() {
        assert_eq!(format_duration(900), "0h 15m");
        assert_eq!(format_duration(3600 + 300 + 59), "1h 05m");
    }
}
