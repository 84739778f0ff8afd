//! Time-window evaluation for scheduled blocklists.
//!
//! Windows are minute-of-day ranges that may wrap midnight, intersected
//! with a day-of-week set, evaluated in the operator's configured timezone.

use crate::blocklist::Blocklist;
use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};

/// Parse `HH:MM` into an (hour, minute) pair.
pub fn parse_hhmm(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.split_once(':')?;
    let hour: u32 = h.trim().parse().ok()?;
    let minute: u32 = m.trim().parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Whether `current` falls inside `[start, end)` minute-of-day, wrapping
/// midnight when `end < start` (e.g. 22:00–06:00).
pub fn is_time_in_range(
    current_hour: u32,
    current_minute: u32,
    start_hour: u32,
    start_minute: u32,
    end_hour: u32,
    end_minute: u32,
) -> bool {
    let current = current_hour * 60 + current_minute;
    let start = start_hour * 60 + start_minute;
    let end = end_hour * 60 + end_minute;

    if start <= end {
        start <= current && current < end
    } else {
        current >= start || current < end
    }
}

fn day_token(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// Whether `day` is in the comma-separated `mon..sun` list. An empty list
/// means every day.
pub fn day_matches(schedule_days: Option<&str>, day: Weekday) -> bool {
    let Some(days) = schedule_days else {
        return true;
    };
    let days = days.trim().to_ascii_lowercase();
    if days.is_empty() {
        return true;
    }
    days.split(',').any(|d| d.trim() == day_token(day))
}

/// Whether a scheduled blocklist should currently be enabled.
///
/// A blocklist without `schedule_enabled`, or with an unparseable window,
/// is always active.
pub fn blocklist_should_be_active<Tz: TimeZone>(bl: &Blocklist, now: &DateTime<Tz>) -> bool {
    if !bl.schedule_enabled {
        return true;
    }

    let start = bl.schedule_start.as_deref().and_then(parse_hhmm);
    let end = bl.schedule_end.as_deref().and_then(parse_hhmm);
    let (Some((sh, sm)), Some((eh, em))) = (start, end) else {
        return true;
    };

    if !day_matches(bl.schedule_days.as_deref(), now.weekday()) {
        return false;
    }

    is_time_in_range(now.hour(), now.minute(), sh, sm, eh, em)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocklist::{BlocklistFormat, ListType};
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    fn scheduled(start: &str, end: &str, days: Option<&str>) -> Blocklist {
        let mut bl = Blocklist::new(
            "ads".to_string(),
            "https://lists.example/ads.txt".to_string(),
            BlocklistFormat::Hosts,
            ListType::Block,
        );
        bl.schedule_enabled = true;
        bl.schedule_start = Some(start.to_string());
        bl.schedule_end = Some(end.to_string());
        bl.schedule_days = days.map(str::to_string);
        bl
    }

    #[test]
    fn parses_hhmm_and_rejects_out_of_range() {
        assert_eq!(parse_hhmm("09:30"), Some((9, 30)));
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("nope"), None);
    }

    #[test]
    fn minute_grid_matches_normal_and_overnight_semantics() {
        // Normal window 09:00-17:00 and overnight window 22:00-06:00,
        // exhaustively over all 1440 minutes of a day.
        for h in 0..24u32 {
            for m in 0..60u32 {
                let cur = h * 60 + m;
                let normal = is_time_in_range(h, m, 9, 0, 17, 0);
                assert_eq!(normal, (540..1020).contains(&cur), "normal at {h}:{m}");

                let overnight = is_time_in_range(h, m, 22, 0, 6, 0);
                assert_eq!(overnight, cur >= 1320 || cur < 360, "overnight at {h}:{m}");
            }
        }
    }

    #[test]
    fn empty_day_set_means_all_days() {
        assert!(day_matches(None, chrono::Weekday::Sat));
        assert!(day_matches(Some(""), chrono::Weekday::Sun));
        assert!(day_matches(Some("mon,tue"), chrono::Weekday::Tue));
        assert!(!day_matches(Some("mon,tue"), chrono::Weekday::Wed));
    }

    #[test]
    fn overnight_weekday_schedule_in_local_timezone() {
        let bl = scheduled("22:00", "06:00", Some("mon,tue,wed,thu,fri"));

        // Tuesday 2025-03-11 23:30 local: inside the window.
        let tue_night = Los_Angeles.with_ymd_and_hms(2025, 3, 11, 23, 30, 0).unwrap();
        assert!(blocklist_should_be_active(&bl, &tue_night));

        // Saturday 2025-03-15 23:30 local: right time, wrong day.
        let sat_night = Los_Angeles.with_ymd_and_hms(2025, 3, 15, 23, 30, 0).unwrap();
        assert!(!blocklist_should_be_active(&bl, &sat_night));

        // Tuesday 12:00 local: right day, outside the window.
        let tue_noon = Los_Angeles.with_ymd_and_hms(2025, 3, 11, 12, 0, 0).unwrap();
        assert!(!blocklist_should_be_active(&bl, &tue_noon));
    }

    #[test]
    fn unscheduled_or_malformed_windows_are_always_active() {
        let mut bl = scheduled("22:00", "06:00", None);
        bl.schedule_enabled = false;
        let now = Los_Angeles.with_ymd_and_hms(2025, 3, 11, 12, 0, 0).unwrap();
        assert!(blocklist_should_be_active(&bl, &now));

        let mut broken = scheduled("2200", "06:00", None);
        broken.schedule_enabled = true;
        assert!(blocklist_should_be_active(&broken, &now));
    }
}
