//! Date window resolution
//!
//! Turns the optional `start_date` / `end_date` / `days_ahead` tool
//! arguments into a concrete inclusive `[start, end]` window.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::error::{CalendarError, Result};
use crate::zone::{CalendarZone, DateInput, format_canonical, parse_datetime_input};

/// Largest accepted `days_ahead`
pub const MAX_DAYS_AHEAD: i64 = 3650;

/// Inclusive time window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DateWindow {
    /// Build a window, rejecting `start > end`
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Result<Self> {
        if start > end {
            return Err(CalendarError::invalid(format!(
                "start {} is after end {}",
                format_canonical(&start),
                format_canonical(&end)
            )));
        }
        Ok(Self { start, end })
    }

    /// The whole of `date` in `zone`
    pub fn day(date: NaiveDate, zone: &CalendarZone) -> Result<Self> {
        Self::new(zone.start_of_day(date)?, zone.end_of_day(date)?)
    }

    /// Resolve tool arguments into a window
    ///
    /// * no start: `today` at midnight
    /// * end given as a date, as midnight, or on the start's date: end of that day
    /// * no end: end of the day `days_ahead` days after the start
    pub fn resolve(
        start_date: Option<&str>,
        end_date: Option<&str>,
        days_ahead: i64,
        zone: &CalendarZone,
        today: NaiveDate,
    ) -> Result<Self> {
        if !(0..=MAX_DAYS_AHEAD).contains(&days_ahead) {
            return Err(CalendarError::invalid(format!(
                "days_ahead must be between 0 and {}, got {}",
                MAX_DAYS_AHEAD, days_ahead
            )));
        }

        let start = match start_date {
            Some(text) => parse_arg("start_date", text)?.resolve(zone)?,
            None => zone.start_of_day(today)?,
        };
        let start_day = local_day(&start, zone);

        let end = match end_date {
            Some(text) => {
                let input = parse_arg("end_date", text)?;
                let end = zone.to_fixed(input.resolve(zone)?.with_timezone(&Utc));
                if input.is_date_only()
                    || end.time() == NaiveTime::MIN
                    || end.date_naive() == start_day
                {
                    zone.end_of_day(end.date_naive())?
                } else {
                    end
                }
            }
            None => {
                let last_day = start_day
                    .checked_add_days(Days::new(days_ahead as u64))
                    .ok_or_else(|| CalendarError::invalid("days_ahead overflows the calendar"))?;
                zone.end_of_day(last_day)?
            }
        };

        Self::new(start, end)
    }

    /// Whether `instant` lies inside the window
    pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
        self.start <= *instant && *instant <= self.end
    }

    /// Whether `[start, end]` intersects the window
    pub fn overlaps(&self, start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> bool {
        *start <= self.end && *end >= self.start
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }
}

/// Calendar date of `instant` in `zone`, whatever offset it was given with
fn local_day(instant: &DateTime<FixedOffset>, zone: &CalendarZone) -> NaiveDate {
    zone.today(instant.with_timezone(&Utc))
}

fn parse_arg(name: &str, text: &str) -> Result<DateInput> {
    parse_datetime_input(text).ok_or_else(|| {
        CalendarError::invalid(format!(
            "{} '{}' is not a valid date (expected YYYY-MM-DD)",
            name, text
        ))
    })
}
