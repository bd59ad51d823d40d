//! Filter Engine
//!
//! A [`FilterSpec`] is a conjunction of optional predicates. Unset
//! predicates always pass; a predicate that needs a field the record
//! type does not have (attendees on a reminder) never passes.

use crate::models::{Attendee, Event, Reminder, RsvpStatus};
use crate::window::DateWindow;

/// Field access the predicates need
pub trait Filterable {
    fn calendar(&self) -> &str;

    /// Whether the record belongs to `window`. `None` when the record
    /// has no date to test (undated reminders).
    fn in_window(&self, window: &DateWindow) -> Option<bool>;

    fn attendees(&self) -> Option<&[Attendee]> {
        None
    }

    fn all_day(&self) -> Option<bool> {
        None
    }

    fn busy(&self) -> Option<bool> {
        None
    }

    fn completed(&self) -> Option<bool> {
        None
    }

    /// Text searched by free-text queries
    fn text_fields(&self) -> Vec<&str>;
}

impl Filterable for Event {
    fn calendar(&self) -> &str {
        &self.calendar
    }

    fn in_window(&self, window: &DateWindow) -> Option<bool> {
        Some(window.overlaps(&self.start_date, &self.end_date))
    }

    fn attendees(&self) -> Option<&[Attendee]> {
        Some(&self.attendees)
    }

    fn all_day(&self) -> Option<bool> {
        Some(self.all_day)
    }

    fn busy(&self) -> Option<bool> {
        Some(self.is_busy)
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.notes.as_str(), self.location.as_str()]
    }
}

impl Filterable for Reminder {
    fn calendar(&self) -> &str {
        &self.calendar
    }

    fn in_window(&self, window: &DateWindow) -> Option<bool> {
        self.due_date.as_ref().map(|due| window.contains(due))
    }

    fn completed(&self) -> Option<bool> {
        Some(self.is_completed)
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.notes.as_str()]
    }
}

/// Predicate set applied to a record sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    window: Option<DateWindow>,
    include_undated: bool,
    calendar_names: Option<Vec<String>>,
    attendee_pattern: Option<String>,
    attendee_statuses: Option<Vec<RsvpStatus>>,
    all_day_only: bool,
    busy_only: bool,
    exclude_completed: bool,
    text: Option<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records inside `window`
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Keep records with no date when a window is set
    pub fn with_undated(mut self, include_undated: bool) -> Self {
        self.include_undated = include_undated;
        self
    }

    /// Exact, case-sensitive calendar membership; an empty list is no filter
    pub fn with_calendar_names(mut self, names: Vec<String>) -> Self {
        self.calendar_names = if names.is_empty() { None } else { Some(names) };
        self
    }

    /// Case-insensitive substring on attendee name or email; blank is no filter
    pub fn with_attendee_pattern(mut self, pattern: &str) -> Self {
        let pattern = pattern.trim();
        self.attendee_pattern = if pattern.is_empty() {
            None
        } else {
            Some(pattern.to_lowercase())
        };
        self
    }

    /// At least one attendee in one of `statuses`; an empty list is no filter
    pub fn with_attendee_statuses(mut self, statuses: Vec<RsvpStatus>) -> Self {
        self.attendee_statuses = if statuses.is_empty() {
            None
        } else {
            Some(statuses)
        };
        self
    }

    pub fn with_all_day_only(mut self, all_day_only: bool) -> Self {
        self.all_day_only = all_day_only;
        self
    }

    pub fn with_busy_only(mut self, busy_only: bool) -> Self {
        self.busy_only = busy_only;
        self
    }

    /// Drop completed records
    pub fn with_exclude_completed(mut self, exclude_completed: bool) -> Self {
        self.exclude_completed = exclude_completed;
        self
    }

    /// Case-insensitive substring over the record's text fields
    pub fn with_text(mut self, query: &str) -> Self {
        let query = query.trim();
        self.text = if query.is_empty() {
            None
        } else {
            Some(query.to_lowercase())
        };
        self
    }

    pub fn window(&self) -> Option<&DateWindow> {
        self.window.as_ref()
    }

    pub fn calendar_names(&self) -> Option<&[String]> {
        self.calendar_names.as_deref()
    }

    /// Whether every active predicate holds for `record`
    pub fn matches<T: Filterable>(&self, record: &T) -> bool {
        if let Some(window) = &self.window {
            match record.in_window(window) {
                Some(true) => {}
                Some(false) => return false,
                None if self.include_undated => {}
                None => return false,
            }
        }

        if let Some(names) = &self.calendar_names {
            if !names.iter().any(|n| n == record.calendar()) {
                return false;
            }
        }

        if let Some(pattern) = &self.attendee_pattern {
            let hit = record.attendees().is_some_and(|attendees| {
                attendees.iter().any(|a| {
                    a.name.to_lowercase().contains(pattern.as_str())
                        || a.email.to_lowercase().contains(pattern.as_str())
                })
            });
            if !hit {
                return false;
            }
        }

        if let Some(statuses) = &self.attendee_statuses {
            let hit = record
                .attendees()
                .is_some_and(|attendees| attendees.iter().any(|a| statuses.contains(&a.status)));
            if !hit {
                return false;
            }
        }

        if self.all_day_only && record.all_day() != Some(true) {
            return false;
        }

        if self.busy_only && record.busy() != Some(true) {
            return false;
        }

        if self.exclude_completed && record.completed() == Some(true) {
            return false;
        }

        if let Some(text) = &self.text {
            let hit = record
                .text_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(text.as_str()));
            if !hit {
                return false;
            }
        }

        true
    }

    /// Keep the matching records, in their original order
    pub fn apply<T: Filterable>(&self, mut records: Vec<T>) -> Vec<T> {
        records.retain(|record| self.matches(record));
        records
    }
}
