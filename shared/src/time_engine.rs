//! Time Engine - timezone math for the shared 24-hour timeline
//!
//! Converts between instants and positions on the reference-day scale.
//! Every position on the timeline is an offset in hours from the start of
//! the reference day, so all of the helpers here are phrased in hours.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Number of hours on the visible scale
pub const SCALE_HOURS: f64 = 24.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Longest run of non-existent local time we step over when a day starts
/// inside a DST gap
const MAX_GAP_MINUTES: i64 = 180;

/// Error returned for timezone identifiers that are not in the IANA database
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimezoneError {
    #[error("Invalid timezone: {0}")]
    Unknown(String),
}

/// Parse an IANA timezone identifier
///
/// Unknown identifiers are rejected rather than replaced by a default, since
/// a wrong zone silently shifts the whole reference scale.
pub fn parse_timezone(tz_str: &str) -> Result<Tz, TimezoneError> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| TimezoneError::Unknown(tz_str.to_string()))
}

/// The instant showing wall-clock `time` on `date` in `tz`
///
/// A time inside a DST gap moves forward to the first valid instant after
/// it; a repeated time resolves to its earlier occurrence.
pub fn at_local_time(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let wall = date.and_time(time);

    for minutes in 0..=MAX_GAP_MINUTES {
        let candidate = wall + Duration::minutes(minutes);
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => continue,
        }
    }

    // No zone has a gap this long; treat the naive time as UTC
    tz.from_utc_datetime(&wall)
}

/// Start of the given calendar date in `tz`
///
/// When local midnight falls in a DST gap the first valid instant of the
/// date is returned instead.
pub fn start_of_local_day(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    at_local_time(tz, date, NaiveTime::MIN)
}

/// Start of the day containing `instant`, as seen in `tz`
///
/// Idempotent: `day_start(tz, day_start(tz, x)) == day_start(tz, x)`.
pub fn day_start<Z: TimeZone>(tz: Tz, instant: &DateTime<Z>) -> DateTime<Tz> {
    let local = instant.with_timezone(&tz);
    start_of_local_day(tz, local.date_naive())
}

/// Offset of `instant` from `reference_day` in fractional hours, unclamped
pub fn raw_hour_offset<Z: TimeZone>(instant: DateTime<Utc>, reference_day: &DateTime<Z>) -> f64 {
    let delta = instant - reference_day.with_timezone(&Utc);
    delta.num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Offset of `instant` from `reference_day` in hours, clamped to `[0, 24]`
///
/// Instants before or after the visible day saturate at the edges.
pub fn hour_offset<Z: TimeZone>(instant: DateTime<Utc>, reference_day: &DateTime<Z>) -> f64 {
    raw_hour_offset(instant, reference_day).clamp(0.0, SCALE_HOURS)
}

/// The instant `hours` after `reference_day`, at millisecond resolution
///
/// Not clamped: callers clamp only for display.
pub fn add_hours<Z: TimeZone>(reference_day: &DateTime<Z>, hours: f64) -> DateTime<Utc> {
    let millis = (hours * MILLIS_PER_HOUR).round() as i64;
    reference_day.with_timezone(&Utc) + Duration::milliseconds(millis)
}

/// Start of the local hour containing `instant` in `tz`
pub fn start_of_hour(tz: Tz, instant: DateTime<Utc>) -> DateTime<Utc> {
    let local = instant.with_timezone(&tz);
    let into_hour = Duration::minutes(i64::from(local.minute()))
        + Duration::seconds(i64::from(local.second()))
        + Duration::nanoseconds(i64::from(local.nanosecond()));
    instant - into_hour
}

/// Round `instant` to the nearest whole local hour in `tz`
///
/// Half past rounds up, so 23:45 becomes 00:00 of the following day.
pub fn snap_to_hour(tz: Tz, instant: DateTime<Utc>) -> DateTime<Utc> {
    start_of_hour(tz, instant + Duration::minutes(30))
}

/// Wall-clock time of `instant` in `tz`
pub fn local_time(tz: Tz, instant: DateTime<Utc>) -> NaiveTime {
    instant.with_timezone(&tz).time()
}

/// Calendar date of `instant` in `tz`
pub fn local_date(tz: Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Search timezones by name (case-insensitive partial match)
pub fn search_timezones(query: &str) -> Vec<Tz> {
    let query_lower = query.to_lowercase();
    chrono_tz::TZ_VARIANTS
        .iter()
        .filter(|tz| tz.name().to_lowercase().contains(&query_lower))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helsinki() -> Tz {
        "Europe/Helsinki".parse().unwrap()
    }

    #[test]
    fn test_parse_timezone_rejects_unknown() {
        assert!(parse_timezone("Europe/Helsinki").is_ok());
        assert_eq!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(TimezoneError::Unknown("Mars/Olympus_Mons".to_string()))
        );
    }

    #[test]
    fn test_day_start_is_local_midnight() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 13, 20, 5).unwrap();
        let start = day_start(helsinki(), &instant);
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        // Helsinki is UTC+2 in January
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 1, 14, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_day_start_idempotent() {
        let tz: Tz = "Australia/Sydney".parse().unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 4, 6, 15, 59, 0).unwrap();
        let once = day_start(tz, &instant);
        let twice = day_start(tz, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_day_start_inside_midnight_gap() {
        // Havana springs forward at 00:00 local, so 2024-03-10 has no midnight
        let tz: Tz = "America/Havana".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let start = start_of_local_day(tz, date);
        assert_eq!(start.date_naive(), date);
        assert_eq!(start.hour(), 1);
        assert_eq!(day_start(tz, &start), start);
    }

    #[test]
    fn test_hour_offset_clamps() {
        let reference = start_of_local_day(helsinki(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let before = Utc.with_ymd_and_hms(2024, 1, 14, 12, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 16, 12, 0, 0).unwrap();
        let inside = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap();

        assert_eq!(hour_offset(before, &reference), 0.0);
        assert_eq!(hour_offset(after, &reference), 24.0);
        assert_eq!(hour_offset(inside, &reference), 10.5);
        assert!(raw_hour_offset(before, &reference) < 0.0);
    }

    #[test]
    fn test_add_hours_is_unclamped() {
        let reference = start_of_local_day(helsinki(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let later = add_hours(&reference, 26.25);
        assert_eq!(raw_hour_offset(later, &reference), 26.25);
        let earlier = add_hours(&reference, -1.0);
        assert_eq!(raw_hour_offset(earlier, &reference), -1.0);
    }

    #[test]
    fn test_snap_rounds_half_up_across_midnight() {
        let tz = helsinki();
        // 23:45 Helsinki on the 15th
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 21, 45, 0).unwrap();
        let snapped = snap_to_hour(tz, instant).with_timezone(&tz);
        assert_eq!(snapped.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        assert_eq!((snapped.hour(), snapped.minute()), (0, 0));
    }

    #[test]
    fn test_snap_rounds_down_before_half() {
        let tz = helsinki();
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 10, 29, 59).unwrap();
        let snapped = snap_to_hour(tz, instant);
        assert_eq!(snapped, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());

        let half = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(
            snap_to_hour(tz, half),
            Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_snap_idempotent_in_half_hour_zone() {
        let tz: Tz = "Asia/Kolkata".parse().unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 7, 10, 0).unwrap();
        let once = snap_to_hour(tz, instant);
        assert_eq!(snap_to_hour(tz, once), once);
        // 12:40 IST rounds to 13:00 IST
        assert_eq!(once.with_timezone(&tz).hour(), 13);
        assert_eq!(once.with_timezone(&tz).minute(), 0);
    }

    #[test]
    fn test_local_time() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 7, 15, 0).unwrap();
        assert_eq!(local_time(helsinki(), instant), NaiveTime::from_hms_opt(9, 15, 0).unwrap());
    }

    #[test]
    fn test_at_local_time_keeps_wall_clock_on_dst_days() {
        let tz = helsinki();
        let half_past_two = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        for (y, m, d) in [(2024, 1, 15), (2024, 3, 31), (2024, 10, 27)] {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let dt = at_local_time(tz, date, half_past_two);
            assert_eq!(dt.date_naive(), date);
            assert_eq!(dt.time(), half_past_two);
        }
    }

    #[test]
    fn test_at_local_time_in_gap_moves_forward() {
        // Helsinki skips 03:00-04:00 on 2024-03-31
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let dt = at_local_time(helsinki(), date, NaiveTime::from_hms_opt(3, 30, 0).unwrap());
        assert_eq!((dt.hour(), dt.minute()), (4, 0));
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 3, 31, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_at_local_time_repeated_hour_takes_earlier() {
        // Helsinki repeats 03:00-04:00 on 2024-10-27; the first pass is still EEST
        let date = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();
        let dt = at_local_time(helsinki(), date, NaiveTime::from_hms_opt(3, 30, 0).unwrap());
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }

    #[test]
    fn test_search_timezones() {
        let results = search_timezones("New_York");
        assert!(!results.is_empty());
        assert!(results.iter().any(|tz| tz.name() == "America/New_York"));
        assert!(search_timezones("").len() > 400);
    }
}
