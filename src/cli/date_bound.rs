//! Date-bound token parsing for the extract command.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

/// Which side of the range a token belongs to.
///
/// Absolute from-dates resolve to the start of the day and absolute
/// to-dates to the end of it, so `--to-date 2025-04-30` includes notes
/// modified on the 30th. Relative "days ago" tokens resolve to an exact
/// instant on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundRole {
    From,
    To,
}

/// Parses a date-bound token.
///
/// Accepts:
/// - a bare non-negative integer: that many days ago from now
/// - `YYYY-MM-DD`
/// - `DD/MM/YYYY`
pub fn parse_bound(s: &str, role: BoundRole) -> Result<DateTime<Utc>, String> {
    let s = s.trim();

    if let Ok(days) = s.parse::<i64>() {
        if days < 0 {
            return Err(format!("days ago must be non-negative: {s}"));
        }
        // Checked arithmetic: absurd day counts are a user input
        // error, not an overflow abort.
        let span =
            Duration::try_days(days).ok_or_else(|| format!("days ago out of range: {s}"))?;
        return Utc::now()
            .checked_sub_signed(span)
            .ok_or_else(|| format!("days ago out of range: {s}"));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|_| {
            format!("invalid date token (expected YYYY-MM-DD, DD/MM/YYYY, or days ago): {s}")
        })?;

    let time = match role {
        BoundRole::From => date.and_hms_opt(0, 0, 0),
        BoundRole::To => date.and_hms_opt(23, 59, 59),
    }
    .ok_or_else(|| format!("invalid date: {s}"))?;

    let local = Local
        .from_local_datetime(&time)
        .earliest()
        .ok_or_else(|| format!("nonexistent local time for date: {s}"))?;
    Ok(local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn relative_days_ago() {
        let bound = parse_bound("7", BoundRole::From).unwrap();
        let expected = Utc::now() - Duration::days(7);
        assert!((bound - expected).num_seconds().abs() < 2);
    }

    #[test]
    fn zero_days_ago_is_now() {
        let bound = parse_bound("0", BoundRole::To).unwrap();
        assert!((Utc::now() - bound).num_seconds().abs() < 2);
    }

    #[test]
    fn negative_days_rejected() {
        assert!(parse_bound("-5", BoundRole::From).is_err());
    }

    #[test]
    fn huge_days_ago_is_an_error_not_a_panic() {
        assert!(parse_bound("9223372036854775807", BoundRole::From).is_err());
        // Representable as a Duration but far outside the datetime range.
        assert!(parse_bound("100000000000", BoundRole::To).is_err());
    }

    #[test]
    fn iso_date_parses() {
        let bound = parse_bound("2025-04-15", BoundRole::From).unwrap();
        let local = bound.with_timezone(&Local);
        assert_eq!((local.year(), local.month(), local.day()), (2025, 4, 15));
    }

    #[test]
    fn day_month_year_parses() {
        let bound = parse_bound("15/04/2025", BoundRole::From).unwrap();
        let local = bound.with_timezone(&Local);
        assert_eq!((local.year(), local.month(), local.day()), (2025, 4, 15));
    }

    #[test]
    fn to_bound_covers_the_whole_day() {
        let from = parse_bound("2025-04-30", BoundRole::From).unwrap();
        let to = parse_bound("2025-04-30", BoundRole::To).unwrap();
        assert!(to > from);
        assert_eq!((to - from).num_seconds(), 24 * 3600 - 1);
    }

    #[test]
    fn malformed_tokens_rejected() {
        assert!(parse_bound("yesterday", BoundRole::From).is_err());
        assert!(parse_bound("2025/04/15", BoundRole::From).is_err());
        assert!(parse_bound("15-04-2025", BoundRole::From).is_err());
        assert!(parse_bound("", BoundRole::From).is_err());
    }
}
