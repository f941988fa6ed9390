//! Display helpers

use chrono::{DateTime, Utc};

const MINUTES_IN_HOUR: f64 = 60.0;
const MINUTES_IN_DAY: f64 = 1440.0;
const MINUTES_IN_MONTH: f64 = 43_200.0;
const MINUTES_IN_YEAR: f64 = 525_600.0;

/// Distance between `instant` and `now` in the largest fitting unit,
/// e.g. `"3 minutes ago"` or `"in 2 hours"`
pub fn from_now(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let millis = (now - instant).num_milliseconds();
    let future = millis < 0;
    let minutes = millis.unsigned_abs() as f64 / 60_000.0;

    let (value, unit) = if minutes < 1.0 {
        ((millis.unsigned_abs() as f64 / 1000.0).round(), "second")
    } else if minutes < MINUTES_IN_HOUR {
        (minutes.round(), "minute")
    } else if minutes < MINUTES_IN_DAY {
        ((minutes / MINUTES_IN_HOUR).round(), "hour")
    } else if minutes < MINUTES_IN_MONTH {
        ((minutes / MINUTES_IN_DAY).round(), "day")
    } else if minutes < MINUTES_IN_YEAR {
        ((minutes / MINUTES_IN_MONTH).round(), "month")
    } else {
        ((minutes / MINUTES_IN_YEAR).round(), "year")
    };

    let value = value as u64;
    let plural = if value == 1 { "" } else { "s" };
    if future {
        format!("in {} {}{}", value, unit, plural)
    } else {
        format!("{} {}{} ago", value, unit, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_past_instants() {
        assert_eq!(from_now(now() - Duration::seconds(1), now()), "1 second ago");
        assert_eq!(from_now(now() - Duration::minutes(3), now()), "3 minutes ago");
        assert_eq!(from_now(now() - Duration::hours(5), now()), "5 hours ago");
        assert_eq!(from_now(now() - Duration::days(2), now()), "2 days ago");
        assert_eq!(from_now(now() - Duration::days(65), now()), "2 months ago");
        assert_eq!(from_now(now() - Duration::days(4 * 365), now()), "4 years ago");
    }

    #[test]
    fn test_future_instants() {
        assert_eq!(from_now(now() + Duration::minutes(1), now()), "in 1 minute");
        assert_eq!(from_now(now() + Duration::hours(2), now()), "in 2 hours");
    }

    #[test]
    fn test_same_instant() {
        assert_eq!(from_now(now(), now()), "0 seconds ago");
    }
}
