//! Timezone Utility
//!
//! Stateless lookups over the IANA database compiled into `chrono-tz`.

use chrono::{DateTime, Utc};
use chrono_tz::TZ_VARIANTS;
use serde::Serialize;

use crate::error::{CalendarError, Result};
use crate::zone::{CalendarZone, format_canonical, parse_datetime_input, parse_tz};

/// Result of `get_current_time`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentTime {
    pub timezone: String,
    pub datetime: String,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

/// Result of `convert_time`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeConversion {
    pub original_datetime: String,
    pub converted_datetime: String,
    pub from_timezone: String,
    pub to_timezone: String,
}

/// Current time in `timezone`
pub fn current_time(timezone: &str) -> Result<CurrentTime> {
    current_time_at(timezone, Utc::now())
}

/// Time `now` rendered in `timezone`
pub fn current_time_at(timezone: &str, now: DateTime<Utc>) -> Result<CurrentTime> {
    let tz = parse_tz(timezone)?;
    let local = CalendarZone::Named(tz).to_fixed(now);

    Ok(CurrentTime {
        timezone: tz.name().to_string(),
        datetime: format_canonical(&local),
        timestamp: now.timestamp_micros() as f64 / 1_000_000.0,
    })
}

/// Convert `datetime` from one zone to another
///
/// Input with an explicit offset is taken as that instant; naive input
/// is read as wall-clock time in `from_timezone`. Both zone names are
/// validated either way.
pub fn convert_time(
    datetime: &str,
    from_timezone: &str,
    to_timezone: &str,
) -> Result<TimeConversion> {
    let from = CalendarZone::Named(parse_tz(from_timezone)?);
    let to = CalendarZone::Named(parse_tz(to_timezone)?);

    let input = parse_datetime_input(datetime)
        .ok_or_else(|| CalendarError::InvalidDatetimeFormat(datetime.to_string()))?;
    let original = input.resolve(&from)?;
    let converted = to.to_fixed(original.with_timezone(&Utc));

    Ok(TimeConversion {
        original_datetime: format_canonical(&original),
        converted_datetime: format_canonical(&converted),
        from_timezone: from.to_string(),
        to_timezone: to.to_string(),
    })
}

/// Known zone names, sorted, optionally restricted to one region
///
/// `region` matches names beginning with `"<region>/"`, compared
/// without regard to case. A blank region lists everything.
pub fn list_timezones(region: Option<&str>) -> Vec<String> {
    let prefix = region
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| format!("{}/", r.trim_end_matches('/').to_lowercase()));

    let mut names: Vec<String> = TZ_VARIANTS
        .iter()
        .map(|tz| tz.name())
        .filter(|name| match &prefix {
            Some(prefix) => name.to_lowercase().starts_with(prefix.as_str()),
            None => true,
        })
        .map(str::to_string)
        .collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 16, 30, 5).unwrap()
    }

    #[test]
    fn test_current_time_utc() {
        let result = current_time_at("UTC", now()).unwrap();
        assert_eq!(result.timezone, "UTC");
        assert_eq!(result.datetime, "2026-10-19T16:30:05+00:00");
        assert_eq!(result.timestamp, now().timestamp() as f64);
    }

    #[test]
    fn test_current_time_new_york() {
        let result = current_time_at("America/New_York", now()).unwrap();
        assert_eq!(result.datetime, "2026-10-19T12:30:05-04:00");
        assert!(result.datetime.contains('T'));
    }

    #[test]
    fn test_current_time_unknown_zone() {
        let err = current_time_at("Invalid/Timezone", now()).unwrap_err();
        assert_eq!(err.kind(), "UnknownTimezone");
        assert!(err.to_string().contains("Unknown timezone"));
    }

    #[test]
    fn test_current_time_keeps_fractional_timestamp() {
        let instant = now() + chrono::Duration::milliseconds(250);
        let result = current_time_at("Europe/London", instant).unwrap();
        assert_eq!(result.timezone, "Europe/London");
        assert_eq!(result.datetime, "2026-10-19T17:30:05+01:00");
        assert_eq!(result.timestamp, now().timestamp() as f64 + 0.25);
    }

    #[test]
    fn test_current_then_convert_round_trip() {
        let current = current_time("UTC").unwrap();
        let converted = convert_time(&current.datetime, "UTC", "UTC").unwrap();
        assert_eq!(converted.converted_datetime, current.datetime);
        assert_eq!(converted.original_datetime, current.datetime);
    }

    #[test]
    fn test_convert_naive_utc_to_los_angeles() {
        let result = convert_time("2026-01-15T12:00:00", "UTC", "America/Los_Angeles").unwrap();
        assert_eq!(result.original_datetime, "2026-01-15T12:00:00+00:00");
        assert_eq!(result.converted_datetime, "2026-01-15T04:00:00-08:00");
        assert_eq!(result.from_timezone, "UTC");
        assert_eq!(result.to_timezone, "America/Los_Angeles");
    }

    #[test]
    fn test_convert_aware_input_keeps_instant() {
        let result = convert_time("2026-01-15T12:00:00+00:00", "UTC", "Asia/Tokyo").unwrap();
        assert_eq!(result.converted_datetime, "2026-01-15T21:00:00+09:00");

        // the offset wins over from_timezone
        let result = convert_time("2026-01-15T12:00:00+01:00", "UTC", "UTC").unwrap();
        assert_eq!(result.converted_datetime, "2026-01-15T11:00:00+00:00");
    }

    #[test]
    fn test_convert_errors() {
        let err = convert_time("2026-01-15T12:00:00", "Invalid/Zone", "UTC").unwrap_err();
        assert_eq!(err.kind(), "UnknownTimezone");

        let err = convert_time("2026-01-15T12:00:00", "UTC", "Invalid/Zone").unwrap_err();
        assert_eq!(err.kind(), "UnknownTimezone");

        let err = convert_time("not-a-datetime", "UTC", "UTC").unwrap_err();
        assert_eq!(err.kind(), "InvalidDatetimeFormat");
        assert!(err.to_string().contains("Invalid datetime string"));
    }

    #[test]
    fn test_list_all_timezones() {
        let all = list_timezones(None);
        assert!(all.contains(&"UTC".to_string()));
        assert!(all.contains(&"America/New_York".to_string()));
        assert!(all.contains(&"Europe/London".to_string()));
        assert!(all.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(list_timezones(Some("  ")), all);
    }

    #[test]
    fn test_list_region_is_subset_with_prefix() {
        let all = list_timezones(None);
        for region in ["America", "Europe", "Asia"] {
            let zones = list_timezones(Some(region));
            assert!(!zones.is_empty());
            assert!(zones.iter().all(|tz| tz.starts_with(&format!("{}/", region))));
            assert!(zones.iter().all(|tz| all.contains(tz)));
        }
        assert!(list_timezones(Some("Europe")).contains(&"Europe/Paris".to_string()));
        assert_eq!(list_timezones(Some("europe")), list_timezones(Some("Europe")));
    }

    #[test]
    fn test_list_unknown_region_is_empty() {
        assert!(list_timezones(Some("Atlantis")).is_empty());
    }
}
