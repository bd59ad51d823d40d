//! Normalized records returned to callers

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::error::CalendarError;
use crate::native::{CalendarKind, EntityKind};

/// Serde helpers writing datetimes in the canonical format
mod canonical {
    use chrono::{DateTime, FixedOffset};
    use serde::Serializer;

    use crate::zone::format_canonical;

    pub fn serialize<S: Serializer>(dt: &DateTime<FixedOffset>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_canonical(dt))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<FixedOffset>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_str(&format_canonical(dt)),
                None => s.serialize_none(),
            }
        }
    }
}

/// An attendee's response to an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RsvpStatus {
    Accepted,
    Declined,
    Tentative,
    Pending,
    Unknown,
}

impl RsvpStatus {
    /// Map the store's participant status code
    ///
    /// Delegated (5), Completed (6), InProcess (7) and anything
    /// unrecognized collapse to `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Pending,
            2 => Self::Accepted,
            3 => Self::Declined,
            4 => Self::Tentative,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Declined => "Declined",
            Self::Tentative => "Tentative",
            Self::Pending => "Pending",
            Self::Unknown => "Unknown",
        }
    }

    pub const ALL: [RsvpStatus; 5] = [
        Self::Accepted,
        Self::Declined,
        Self::Tentative,
        Self::Pending,
        Self::Unknown,
    ];
}

impl FromStr for RsvpStatus {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                CalendarError::invalid(format!(
                    "unknown RSVP status '{}' (expected one of Accepted, Declined, Tentative, Pending, Unknown)",
                    s
                ))
            })
    }
}

/// Free/busy state the event puts on the owner's calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Availability {
    Busy,
    Free,
    Tentative,
    Unavailable,
    NotSupported,
}

impl Availability {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Busy,
            1 => Self::Free,
            2 => Self::Tentative,
            3 => Self::Unavailable,
            _ => Self::NotSupported,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy | Self::Tentative | Self::Unavailable)
    }
}

/// Event attendee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attendee {
    pub name: String,
    pub email: String,
    pub status: RsvpStatus,
    pub is_current_user: bool,
}

impl Attendee {
    pub fn new(name: impl Into<String>, email: impl Into<String>, status: RsvpStatus) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            status,
            is_current_user: false,
        }
    }

    /// Mark this attendee as the store's current user
    pub fn current_user(mut self) -> Self {
        self.is_current_user = true;
        self
    }
}

/// Normalized calendar event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub calendar: String,
    #[serde(with = "canonical")]
    pub start_date: DateTime<FixedOffset>,
    #[serde(with = "canonical")]
    pub end_date: DateTime<FixedOffset>,
    pub all_day: bool,
    pub location: String,
    pub notes: String,
    pub meeting_url: Option<String>,
    pub organizer: String,
    pub organizer_email: String,
    pub availability: Availability,
    pub is_busy: bool,
    pub user_rsvp_status: Option<RsvpStatus>,
    pub attendee_count: usize,
    pub attendees: Vec<Attendee>,
}

impl Event {
    /// Create an event with empty optional fields
    pub fn new(
        title: impl Into<String>,
        calendar: impl Into<String>,
        start_date: DateTime<FixedOffset>,
        end_date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            calendar: calendar.into(),
            start_date,
            end_date,
            all_day: false,
            location: String::new(),
            notes: String::new(),
            meeting_url: None,
            organizer: String::new(),
            organizer_email: String::new(),
            availability: Availability::Busy,
            is_busy: true,
            user_rsvp_status: None,
            attendee_count: 0,
            attendees: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self.is_busy = availability.is_busy();
        self
    }

    /// Replace the attendee list, keeping the derived fields in step
    pub fn with_attendees(mut self, attendees: Vec<Attendee>) -> Self {
        self.user_rsvp_status = attendees
            .iter()
            .find(|a| a.is_current_user)
            .map(|a| a.status);
        self.attendee_count = attendees.len();
        self.attendees = attendees;
        self
    }
}

/// Reminder priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Map the store's 0-9 priority scale; `None` for anything else
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1..=4 => Some(Self::High),
            5 => Some(Self::Medium),
            6..=9 => Some(Self::Low),
            _ => None,
        }
    }
}

/// Normalized reminder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    pub calendar: String,
    #[serde(with = "canonical::option")]
    pub due_date: Option<DateTime<FixedOffset>>,
    pub notes: String,
    pub priority: Priority,
    pub is_completed: bool,
    #[serde(with = "canonical::option")]
    pub completion_date: Option<DateTime<FixedOffset>>,
}

impl Reminder {
    pub fn new(title: impl Into<String>, calendar: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            calendar: calendar.into(),
            due_date: None,
            notes: String::new(),
            priority: Priority::None,
            is_completed: false,
            completion_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: DateTime<FixedOffset>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }
}

/// Entry in the calendar listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarInfo {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: CalendarKind,
    pub source: String,
    pub color: Option<String>,
    pub entity: EntityKind,
}

/// A search match, tagged with its record type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    Event(Event),
    Reminder(Reminder),
}

/// Today's events and open reminders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub events_count: usize,
    pub events: Vec<Event>,
    pub reminders_count: usize,
    pub reminders: Vec<Reminder>,
}

impl TodaySummary {
    pub fn new(date: NaiveDate, events: Vec<Event>, reminders: Vec<Reminder>) -> Self {
        Self {
            date,
            events_count: events.len(),
            events,
            reminders_count: reminders.len(),
            reminders,
        }
    }
}
