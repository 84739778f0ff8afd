//! Next-occurrence math for the cron-style jobs.

use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use std::time::Duration;

/// Time until the next `minute` past any hour (e.g. 5 for "hourly at :05").
pub fn until_next_minute_of_hour(now: DateTime<Utc>, minute: u32) -> Duration {
    let this_hour = now
        .with_minute(minute)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let next = if this_hour > now {
        this_hour
    } else {
        this_hour + ChronoDuration::hours(1)
    };
    (next - now).to_std().unwrap_or(Duration::from_secs(60))
}

/// Time until the next `HH:MM` UTC (e.g. 03:00 for the retention job).
pub fn until_next_time_of_day(now: DateTime<Utc>, hour: u32, minute: u32) -> Duration {
    let today = now
        .with_hour(hour)
        .and_then(|t| t.with_minute(minute))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let next = if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn next_minute_of_hour_rolls_over() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 14, 10, 0).unwrap();
        assert_eq!(
            until_next_minute_of_hour(now, 5),
            Duration::from_secs(55 * 60)
        );

        let before = Utc.with_ymd_and_hms(2025, 6, 1, 14, 4, 30).unwrap();
        assert_eq!(until_next_minute_of_hour(before, 5), Duration::from_secs(30));
    }

    #[test]
    fn next_time_of_day_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 1).unwrap();
        let wait = until_next_time_of_day(now, 3, 0);
        assert_eq!(wait, Duration::from_secs(24 * 3600 - 1));

        let earlier = Utc.with_ymd_and_hms(2025, 6, 1, 2, 59, 0).unwrap();
        assert_eq!(until_next_time_of_day(earlier, 3, 0), Duration::from_secs(60));
    }
}
