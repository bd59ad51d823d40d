//! Zone handling and datetime text formats
//!
//! All output datetimes go through [`format_canonical`]; all input
//! datetimes go through [`parse_datetime_input`].

use std::str::FromStr;

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    SecondsFormat, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{CalendarError, Result};

/// The zone used to resolve "today" and to render datetimes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarZone {
    /// The host's local zone
    Local,
    /// A named IANA zone
    Named(Tz),
}

impl CalendarZone {
    /// Parse `"local"` (any case) or an IANA zone name
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        parse_tz(name).map(Self::Named)
    }

    /// Render an instant in this zone
    pub fn to_fixed(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Self::Local => instant.with_timezone(&Local).fixed_offset(),
            Self::Named(tz) => instant.with_timezone(tz).fixed_offset(),
        }
    }

    /// Calendar date of `now` in this zone
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.to_fixed(now).date_naive()
    }

    /// Attach this zone to a wall-clock time
    ///
    /// An ambiguous time (DST fold) resolves to the earlier instant; a
    /// nonexistent one (DST gap) is shifted forward by an hour.
    pub fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        let localized = match self {
            Self::Local => localize_in(&Local, naive),
            Self::Named(tz) => localize_in(tz, naive),
        };
        localized.ok_or_else(|| {
            CalendarError::InvalidDatetimeFormat(format!(
                "{} does not exist in zone {}",
                naive, self
            ))
        })
    }

    /// First instant of `date`
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<FixedOffset>> {
        self.localize(date.and_time(NaiveTime::MIN))
    }

    /// Last microsecond of `date`
    pub fn end_of_day(&self, date: NaiveDate) -> Result<DateTime<FixedOffset>> {
        let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
        self.localize(date.and_time(last))
    }
}

impl std::fmt::Display for CalendarZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

fn localize_in<Z: TimeZone>(zone: &Z, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.fixed_offset()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.fixed_offset()),
        LocalResult::None => zone
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.fixed_offset()),
    }
}

/// Look up an IANA zone name
pub fn parse_tz(name: &str) -> Result<Tz> {
    Tz::from_str(name.trim()).map_err(|_| CalendarError::UnknownTimezone(name.to_string()))
}

/// The single datetime text format used in every response
pub fn format_canonical(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// A parsed date or datetime argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    /// `YYYY-MM-DD`
    Date(NaiveDate),
    /// A wall-clock time without offset
    Naive(NaiveDateTime),
    /// A datetime carrying its own offset
    Aware(DateTime<FixedOffset>),
}

impl DateInput {
    /// Resolve to an instant, localizing naive forms in `zone`
    pub fn resolve(&self, zone: &CalendarZone) -> Result<DateTime<FixedOffset>> {
        match self {
            Self::Date(date) => zone.start_of_day(*date),
            Self::Naive(naive) => zone.localize(*naive),
            Self::Aware(dt) => Ok(*dt),
        }
    }

    pub fn is_date_only(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a date or datetime argument; `None` if no accepted form matches
pub fn parse_datetime_input(value: &str) -> Option<DateInput> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(DateInput::Date(date));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(DateInput::Aware(dt));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(DateInput::Naive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_zone() {
        assert_eq!(CalendarZone::parse("LOCAL").unwrap(), CalendarZone::Local);
        assert_eq!(
            CalendarZone::parse("Europe/Paris").unwrap(),
            CalendarZone::Named(chrono_tz::Europe::Paris)
        );
        assert!(matches!(
            CalendarZone::parse("Invalid/Timezone"),
            Err(CalendarError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn test_parse_datetime_input_forms() {
        assert!(matches!(
            parse_datetime_input("2026-10-19"),
            Some(DateInput::Date(_))
        ));
        assert!(matches!(
            parse_datetime_input("2026-10-19T09:30"),
            Some(DateInput::Naive(_))
        ));
        assert!(matches!(
            parse_datetime_input("2026-10-19 09:30:15.250"),
            Some(DateInput::Naive(_))
        ));
        assert!(matches!(
            parse_datetime_input("2026-10-19T09:30:00+09:00"),
            Some(DateInput::Aware(_))
        ));
        assert!(matches!(
            parse_datetime_input("2026-10-19T09:30:00Z"),
            Some(DateInput::Aware(_))
        ));
        assert_eq!(parse_datetime_input("19/10/2026"), None);
        assert_eq!(parse_datetime_input("2026-13-01"), None);
        assert_eq!(parse_datetime_input(""), None);
    }

    #[test]
    fn test_localize_fold_takes_earlier() {
        let zone = CalendarZone::Named(chrono_tz::America::New_York);
        // 2026-11-01 01:30 happens twice in New York
        let dt = zone.localize(naive("2026-11-01T01:30:00")).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn test_localize_gap_shifts_forward() {
        let zone = CalendarZone::Named(chrono_tz::America::New_York);
        // 2026-03-08 02:30 does not exist in New York
        let dt = zone.localize(naive("2026-03-08T02:30:00")).unwrap();
        assert_eq!(dt.hour(), 3);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_end_of_day() {
        let zone = CalendarZone::Named(chrono_tz::UTC);
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let end = zone.end_of_day(date).unwrap();
        assert_eq!(end.hour(), 23);
        assert_eq!(end.nanosecond(), 999_999_000);
    }

    #[test]
    fn test_format_canonical() {
        let dt = DateTime::parse_from_rfc3339("2026-10-19T09:30:15.75-07:00").unwrap();
        assert_eq!(format_canonical(&dt), "2026-10-19T09:30:15-07:00");

        let utc = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().fixed_offset();
        assert_eq!(format_canonical(&utc), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_today_in_zone() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 23, 30, 0).unwrap();
        let tokyo = CalendarZone::Named(chrono_tz::Asia::Tokyo);
        assert_eq!(tokyo.today(now), NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
    }
}
