//! Record Normalizer
//!
//! Flattens native store records into [`Event`] and [`Reminder`],
//! filling sentinels for absent fields and mapping numeric codes onto
//! closed enums. Pure: no store access, no clock.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::models::{Attendee, Availability, CalendarInfo, Event, Priority, Reminder, RsvpStatus};
use crate::native::{NativeCalendar, NativeEvent, NativeParticipant, NativeReminder};
use crate::zone::CalendarZone;

/// Conferencing links recognized inside notes and locations
static MEETING_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)https?://(?:[\w-]+\.)*(?:zoom\.us|meet\.google\.com|teams\.microsoft\.com|teams\.live\.com|webex\.com|whereby\.com|gotomeeting\.com|chime\.aws)(?:/[^\s<>()\x22']*)?",
    )
    .expect("valid meeting url regex")
});

/// Find the first conferencing link in free text
pub fn extract_meeting_url(text: &str) -> Option<String> {
    MEETING_URL
        .find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';']).to_string())
}

fn strip_mailto(url: &str) -> &str {
    let url = url.trim();
    match url.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("mailto:") => &url[7..],
        _ => url,
    }
}

/// Maps native records into normalized ones, rendering times in `zone`
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    zone: CalendarZone,
}

impl Normalizer {
    pub fn new(zone: CalendarZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> &CalendarZone {
        &self.zone
    }

    /// Email of a participant, from its email field or its `mailto:` URL
    fn participant_email(participant: &NativeParticipant) -> String {
        participant
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .or(participant.url.as_deref().map(strip_mailto))
            .unwrap_or_default()
            .to_string()
    }

    fn attendee(&self, participant: &NativeParticipant) -> Attendee {
        let email = Self::participant_email(participant);
        let name = participant
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());

        Attendee {
            name,
            email,
            status: RsvpStatus::from_code(participant.status),
            is_current_user: participant.is_current_user,
        }
    }

    pub fn event(&self, native: &NativeEvent) -> Event {
        let start_date = self.zone.to_fixed(native.start);
        let mut end_date = self.zone.to_fixed(native.end);
        if end_date < start_date {
            warn!(
                event_id = native.id.as_deref().unwrap_or(""),
                "Event ends before it starts, clamping end to start"
            );
            end_date = start_date;
        }

        let location = native.location.clone().unwrap_or_default();
        let notes = native.notes.clone().unwrap_or_default();
        let meeting_url = native
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| extract_meeting_url(&notes))
            .or_else(|| extract_meeting_url(&location));

        let (organizer, organizer_email) = match &native.organizer {
            Some(p) => {
                let email = Self::participant_email(p);
                (p.name.clone().unwrap_or_else(|| email.clone()), email)
            }
            None => (String::new(), String::new()),
        };

        let attendees = native.attendees.iter().map(|p| self.attendee(p)).collect();
        let availability = Availability::from_code(native.availability);

        Event {
            id: native.id.clone().unwrap_or_default(),
            title: native.title.clone().unwrap_or_default(),
            calendar: native.calendar.clone().unwrap_or_default(),
            start_date,
            end_date,
            all_day: native.all_day,
            location,
            notes,
            meeting_url,
            organizer,
            organizer_email,
            availability,
            is_busy: availability.is_busy(),
            user_rsvp_status: None,
            attendee_count: 0,
            attendees: Vec::new(),
        }
        .with_attendees(attendees)
    }

    pub fn reminder(&self, native: &NativeReminder) -> Reminder {
        let id = native.id.clone().unwrap_or_default();

        let due_date = native.due.and_then(|due| match due.to_naive() {
            Some(naive) => match self.zone.localize(naive) {
                Ok(dt) => Some(dt),
                Err(e) => {
                    warn!(reminder_id = %id, "Dropping unusable due date: {}", e);
                    None
                }
            },
            None => {
                warn!(reminder_id = %id, ?due, "Dropping invalid due date components");
                None
            }
        });

        let priority = Priority::from_code(native.priority).unwrap_or_else(|| {
            warn!(reminder_id = %id, priority = native.priority, "Unknown priority, using None");
            Priority::None
        });

        Reminder {
            title: native.title.clone().unwrap_or_default(),
            calendar: native.calendar.clone().unwrap_or_default(),
            due_date,
            notes: native.notes.clone().unwrap_or_default(),
            priority,
            is_completed: native.completed,
            completion_date: native.completion_date.map(|dt| self.zone.to_fixed(dt)),
            id,
        }
    }

    pub fn calendar(&self, native: &NativeCalendar) -> CalendarInfo {
        CalendarInfo {
            title: native.title.clone(),
            kind: native.kind,
            source: native.source.clone().unwrap_or_default(),
            color: native.color.clone(),
            entity: native.entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{CalendarKind, EntityKind, NativeDueDate};
    use chrono::{TimeZone, Utc};

    fn normalizer() -> Normalizer {
        Normalizer::new(CalendarZone::Named(chrono_tz::America::Los_Angeles))
    }

    fn native_event() -> NativeEvent {
        NativeEvent {
            id: Some("evt-1".to_string()),
            title: Some("Design review".to_string()),
            calendar: Some("Work".to_string()),
            start: Utc.with_ymd_and_hms(2026, 10, 19, 16, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 10, 19, 17, 0, 0).unwrap(),
            all_day: false,
            location: None,
            notes: None,
            url: None,
            organizer: None,
            attendees: Vec::new(),
            availability: 0,
        }
    }

    #[test]
    fn test_event_sentinels() {
        let event = normalizer().event(&NativeEvent {
            id: None,
            title: None,
            calendar: None,
            ..native_event()
        });

        assert_eq!(event.id, "");
        assert_eq!(event.title, "");
        assert_eq!(event.calendar, "");
        assert_eq!(event.location, "");
        assert_eq!(event.notes, "");
        assert_eq!(event.organizer, "");
        assert_eq!(event.organizer_email, "");
        assert_eq!(event.meeting_url, None);
        assert_eq!(event.user_rsvp_status, None);
        assert_eq!(event.attendee_count, 0);
    }

    #[test]
    fn test_event_times_rendered_in_zone() {
        let event = normalizer().event(&native_event());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["start_date"], "2026-10-19T09:00:00-07:00");
        assert_eq!(json["end_date"], "2026-10-19T10:00:00-07:00");
    }

    #[test]
    fn test_end_before_start_is_clamped() {
        let native = NativeEvent {
            end: Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap(),
            ..native_event()
        };
        let event = normalizer().event(&native);
        assert_eq!(event.start_date, event.end_date);
    }

    #[test]
    fn test_attendees_and_user_status() {
        let native = NativeEvent {
            organizer: Some(NativeParticipant {
                name: Some("Alice".to_string()),
                url: Some("mailto:alice@example.com".to_string()),
                ..Default::default()
            }),
            attendees: vec![
                NativeParticipant {
                    name: None,
                    url: Some("MAILTO:bob@example.com".to_string()),
                    status: 3,
                    ..Default::default()
                },
                NativeParticipant {
                    name: Some("Me".to_string()),
                    email: Some("me@example.com".to_string()),
                    status: 4,
                    is_current_user: true,
                    ..Default::default()
                },
                NativeParticipant {
                    name: Some("Delegate".to_string()),
                    status: 5,
                    ..Default::default()
                },
            ],
            ..native_event()
        };

        let event = normalizer().event(&native);
        assert_eq!(event.organizer, "Alice");
        assert_eq!(event.organizer_email, "alice@example.com");
        assert_eq!(event.attendee_count, 3);
        assert_eq!(event.attendees[0].name, "bob@example.com");
        assert_eq!(event.attendees[0].email, "bob@example.com");
        assert_eq!(event.attendees[0].status, RsvpStatus::Declined);
        assert_eq!(event.attendees[2].status, RsvpStatus::Unknown);
        assert_eq!(event.attendees[2].email, "");
        assert_eq!(event.user_rsvp_status, Some(RsvpStatus::Tentative));
    }

    #[test]
    fn test_meeting_url_precedence() {
        let with_url = NativeEvent {
            url: Some("https://example.com/event".to_string()),
            notes: Some("Join https://meet.google.com/abc-defg-hij".to_string()),
            ..native_event()
        };
        assert_eq!(
            normalizer().event(&with_url).meeting_url.as_deref(),
            Some("https://example.com/event")
        );

        let from_notes = NativeEvent {
            notes: Some("Join: https://meet.google.com/abc-defg-hij.".to_string()),
            ..native_event()
        };
        assert_eq!(
            normalizer().event(&from_notes).meeting_url.as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );

        let from_location = NativeEvent {
            location: Some("https://acme.zoom.us/j/123456789".to_string()),
            ..native_event()
        };
        assert_eq!(
            normalizer().event(&from_location).meeting_url.as_deref(),
            Some("https://acme.zoom.us/j/123456789")
        );
    }

    #[test]
    fn test_extract_meeting_url_ignores_other_links() {
        assert_eq!(extract_meeting_url("See https://example.com/agenda"), None);
        assert_eq!(
            extract_meeting_url("Teams https://teams.microsoft.com/l/meetup-join/xyz now"),
            Some("https://teams.microsoft.com/l/meetup-join/xyz".to_string())
        );
    }

    #[test]
    fn test_unicode_fields_preserved() {
        let native = NativeEvent {
            title: Some("会議 🎉".to_string()),
            ..native_event()
        };
        assert_eq!(normalizer().event(&native).title, "会議 🎉");
    }

    #[test]
    fn test_reminder_mapping() {
        let native = NativeReminder {
            id: Some("rem-1".to_string()),
            title: Some("Call doctor".to_string()),
            calendar: Some("Personal".to_string()),
            notes: None,
            priority: 5,
            completed: true,
            completion_date: Some(Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap()),
            due: Some(NativeDueDate {
                year: 2026,
                month: 10,
                day: 19,
                hour: Some(10),
                minute: Some(30),
                second: None,
            }),
        };

        let reminder = normalizer().reminder(&native);
        let json = serde_json::to_value(&reminder).unwrap();
        assert_eq!(json["due_date"], "2026-10-19T10:30:00-07:00");
        assert_eq!(json["completion_date"], "2026-10-19T11:00:00-07:00");
        assert_eq!(json["priority"], "Medium");
        assert_eq!(json["notes"], "");
        assert!(reminder.is_completed);
    }

    #[test]
    fn test_reminder_invalid_due_and_priority() {
        let native = NativeReminder {
            id: None,
            title: None,
            calendar: None,
            notes: None,
            priority: 42,
            completed: false,
            completion_date: None,
            due: Some(NativeDueDate {
                year: 2026,
                month: 2,
                day: 30,
                hour: None,
                minute: None,
                second: None,
            }),
        };

        let reminder = normalizer().reminder(&native);
        assert_eq!(reminder.due_date, None);
        assert_eq!(reminder.priority, Priority::None);
        assert_eq!(reminder.title, "");
    }

    #[test]
    fn test_calendar_info() {
        let info = normalizer().calendar(&NativeCalendar {
            title: "Birthdays".to_string(),
            kind: CalendarKind::Birthday,
            source: None,
            color: None,
            entity: EntityKind::Event,
        });
        assert_eq!(info.source, "");
        assert_eq!(info.kind, CalendarKind::Birthday);
    }
}
