//! Records as the store hands them over
//!
//! These mirror the OS store's objects field-for-field, with every
//! field the store may leave empty kept optional. They derive serde so
//! fixture files can describe a whole store.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of store entity a calendar holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Event,
    Reminder,
}

impl EntityKind {
    /// Privacy pane that controls access to this entity kind
    pub fn settings_pane(&self) -> &'static str {
        match self {
            Self::Event => "Calendars",
            Self::Reminder => "Reminders",
        }
    }
}

/// Process-wide authorization state for one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Restricted,
    Denied,
    /// Full read access
    Authorized,
    /// Write-only access; reads still need a full-access request
    WriteOnly,
}

impl AuthorizationStatus {
    /// Map the store's numeric authorization code
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Restricted,
            2 => Self::Denied,
            3 => Self::Authorized,
            4 => Self::WriteOnly,
            _ => Self::NotDetermined,
        }
    }
}

/// Calendar account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalendarKind {
    #[default]
    Local,
    #[serde(rename = "CalDAV")]
    CalDav,
    Exchange,
    Subscription,
    Birthday,
}

impl CalendarKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::CalDav,
            2 => Self::Exchange,
            3 => Self::Subscription,
            4 => Self::Birthday,
            _ => Self::Local,
        }
    }
}

/// A calendar or reminder list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeCalendar {
    pub title: String,
    #[serde(default)]
    pub kind: CalendarKind,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub entity: EntityKind,
}

/// An event attendee or organizer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NativeParticipant {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Usually `mailto:` form
    #[serde(default)]
    pub url: Option<String>,
    /// Numeric participant status
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub is_current_user: bool,
}

/// A calendar event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NativeEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub calendar: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub organizer: Option<NativeParticipant>,
    #[serde(default)]
    pub attendees: Vec<NativeParticipant>,
    /// Numeric availability; 0 is busy
    #[serde(default)]
    pub availability: i64,
}

impl NativeEvent {
    /// Whether the event intersects `[start, end]`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start <= end && self.end >= start
    }
}

/// Due date as the store keeps it: calendar components, time optional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeDueDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub minute: Option<u32>,
    #[serde(default)]
    pub second: Option<u32>,
}

impl NativeDueDate {
    /// Wall-clock due time; date-only components are due at midnight
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let time = match self.hour {
            Some(hour) => NaiveTime::from_hms_opt(
                hour,
                self.minute.unwrap_or(0),
                self.second.unwrap_or(0),
            )?,
            None => NaiveTime::MIN,
        };
        Some(date.and_time(time))
    }
}

/// A reminder
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NativeReminder {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub calendar: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// 0 none, 1-4 high, 5 medium, 6-9 low
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due: Option<NativeDueDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_authorization_codes() {
        assert_eq!(AuthorizationStatus::from_code(0), AuthorizationStatus::NotDetermined);
        assert_eq!(AuthorizationStatus::from_code(2), AuthorizationStatus::Denied);
        assert_eq!(AuthorizationStatus::from_code(3), AuthorizationStatus::Authorized);
        assert_eq!(AuthorizationStatus::from_code(4), AuthorizationStatus::WriteOnly);
        assert_eq!(AuthorizationStatus::from_code(42), AuthorizationStatus::NotDetermined);
    }

    #[test]
    fn test_due_date_components() {
        let due = NativeDueDate {
            year: 2026,
            month: 10,
            day: 19,
            hour: Some(10),
            minute: None,
            second: None,
        };
        assert_eq!(due.to_naive().unwrap().to_string(), "2026-10-19 10:00:00");

        let date_only = NativeDueDate { hour: None, ..due };
        assert_eq!(date_only.to_naive().unwrap().to_string(), "2026-10-19 00:00:00");

        let invalid = NativeDueDate { month: 13, ..due };
        assert_eq!(invalid.to_naive(), None);
    }

    #[test]
    fn test_native_event_from_json_defaults() {
        let event: NativeEvent = serde_json::from_str(
            r#"{"start": "2026-10-19T09:00:00Z", "end": "2026-10-19T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(event.title, None);
        assert!(event.attendees.is_empty());
        assert_eq!(event.availability, 0);
    }

    #[test]
    fn test_overlaps() {
        let event = NativeEvent {
            id: None,
            title: None,
            calendar: None,
            start: Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 10, 21, 0, 0, 0).unwrap(),
            all_day: true,
            location: None,
            notes: None,
            url: None,
            organizer: None,
            attendees: Vec::new(),
            availability: 0,
        };
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 10, 19, 23, 59, 59).unwrap();
        assert!(event.overlaps(start, end));
        assert!(!event.overlaps(end + chrono::Duration::days(5), end + chrono::Duration::days(6)));
    }
}
