//! EventKit through the Objective-C runtime
//!
//! A fresh `EKEventStore` is created per call and released when the
//! call returns; nothing is held between requests.

use std::collections::HashSet;
use std::ptr;
use std::sync::mpsc;
use std::time::Duration;

use block2::RcBlock;
use chrono::{DateTime, TimeDelta, Utc};
use objc2::rc::{Retained, autoreleasepool};
use objc2::runtime::{AnyClass, AnyObject, Bool};
use objc2::{msg_send, msg_send_id, sel};
use tracing::{debug, warn};

use mcal_calendar::{
    AuthorizationStatus, CalendarError, CalendarKind, CalendarStore, EntityKind, NativeCalendar,
    NativeDueDate, NativeEvent, NativeParticipant, NativeReminder, Result,
};

use crate::util::{
    array_items, integer_for_key, lookup_class, mutable_array, nsdate_to_utc, nsstring_to_string,
    nsurl_to_string, utc_to_nsdate,
};

#[link(name = "EventKit", kind = "framework")]
unsafe extern "C" {}

/// `NSDateComponentUndefined`
const DATE_COMPONENT_UNDEFINED: isize = isize::MAX;

/// Longest span a single event predicate covers
const MAX_PREDICATE_DAYS: i64 = 4 * 365;

/// Wait for the asynchronous reminder fetch
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

fn unavailable(message: impl Into<String>) -> CalendarError {
    CalendarError::StoreUnavailable(message.into())
}

fn entity_type(entity: EntityKind) -> usize {
    match entity {
        EntityKind::Event => 0,
        EntityKind::Reminder => 1,
    }
}

fn event_store_class() -> Result<&'static AnyClass> {
    lookup_class("EKEventStore").ok_or_else(|| unavailable("EventKit framework is not loaded"))
}

fn new_event_store() -> Result<Retained<AnyObject>> {
    let class = event_store_class()?;
    let store: Option<Retained<AnyObject>> = unsafe { msg_send_id![class, new] };
    store.ok_or_else(|| unavailable("EKEventStore could not be created"))
}

fn calendar_title(calendar: *mut AnyObject) -> Option<String> {
    if calendar.is_null() {
        return None;
    }
    nsstring_to_string(unsafe { msg_send![calendar, title] })
}

/// `NSArray` of the calendars named in `names`; `None` when none exist
fn selected_calendars(
    store: &AnyObject,
    entity: EntityKind,
    names: &[String],
) -> Option<*mut AnyObject> {
    let all: *mut AnyObject =
        unsafe { msg_send![store, calendarsForEntityType: entity_type(entity)] };
    let matching: Vec<*mut AnyObject> = array_items(all)
        .into_iter()
        .filter(|calendar| calendar_title(*calendar).is_some_and(|title| names.contains(&title)))
        .collect();

    if matching.is_empty() {
        None
    } else {
        Some(mutable_array(&matching))
    }
}

fn native_calendar(calendar: *mut AnyObject, entity: EntityKind) -> NativeCalendar {
    let source: *mut AnyObject = unsafe { msg_send![calendar, source] };
    let source = if source.is_null() {
        None
    } else {
        nsstring_to_string(unsafe { msg_send![source, title] })
    };
    // `type` is a keyword, so go through KVC
    let kind = integer_for_key(calendar, "type").unwrap_or(0);

    NativeCalendar {
        title: calendar_title(calendar).unwrap_or_default(),
        kind: CalendarKind::from_code(kind as i64),
        source,
        color: None,
        entity,
    }
}

fn native_participant(participant: *mut AnyObject) -> NativeParticipant {
    let status: isize = unsafe { msg_send![participant, participantStatus] };
    let is_current_user: Bool = unsafe { msg_send![participant, isCurrentUser] };

    NativeParticipant {
        name: nsstring_to_string(unsafe { msg_send![participant, name] }),
        email: None,
        url: nsurl_to_string(unsafe { msg_send![participant, URL] }),
        status: status as i64,
        is_current_user: is_current_user.as_bool(),
    }
}

fn native_event(event: *mut AnyObject) -> Option<NativeEvent> {
    let start = nsdate_to_utc(unsafe { msg_send![event, startDate] })?;
    let end = nsdate_to_utc(unsafe { msg_send![event, endDate] }).unwrap_or(start);
    let all_day: Bool = unsafe { msg_send![event, isAllDay] };
    let availability: isize = unsafe { msg_send![event, availability] };
    let calendar: *mut AnyObject = unsafe { msg_send![event, calendar] };
    let organizer: *mut AnyObject = unsafe { msg_send![event, organizer] };
    let attendees: *mut AnyObject = unsafe { msg_send![event, attendees] };

    Some(NativeEvent {
        id: nsstring_to_string(unsafe { msg_send![event, eventIdentifier] }),
        title: nsstring_to_string(unsafe { msg_send![event, title] }),
        calendar: calendar_title(calendar),
        start,
        end,
        all_day: all_day.as_bool(),
        location: nsstring_to_string(unsafe { msg_send![event, location] }),
        notes: nsstring_to_string(unsafe { msg_send![event, notes] }),
        url: nsurl_to_string(unsafe { msg_send![event, URL] }),
        organizer: (!organizer.is_null()).then(|| native_participant(organizer)),
        attendees: array_items(attendees)
            .into_iter()
            .map(native_participant)
            .collect(),
        availability: availability as i64,
    })
}

fn due_components(components: *mut AnyObject) -> Option<NativeDueDate> {
    if components.is_null() {
        return None;
    }
    let defined = |value: isize| (value != DATE_COMPONENT_UNDEFINED).then_some(value);
    let unsigned = |value: isize| defined(value).and_then(|v| u32::try_from(v).ok());

    let year: isize = unsafe { msg_send![components, year] };
    let month: isize = unsafe { msg_send![components, month] };
    let day: isize = unsafe { msg_send![components, day] };
    let hour: isize = unsafe { msg_send![components, hour] };
    let minute: isize = unsafe { msg_send![components, minute] };
    let second: isize = unsafe { msg_send![components, second] };

    Some(NativeDueDate {
        year: defined(year).and_then(|y| i32::try_from(y).ok())?,
        month: unsigned(month)?,
        day: unsigned(day)?,
        hour: unsigned(hour),
        minute: unsigned(minute),
        second: unsigned(second),
    })
}

fn native_reminder(reminder: *mut AnyObject) -> NativeReminder {
    let priority: usize = unsafe { msg_send![reminder, priority] };
    let completed: Bool = unsafe { msg_send![reminder, isCompleted] };
    let calendar: *mut AnyObject = unsafe { msg_send![reminder, calendar] };

    NativeReminder {
        id: nsstring_to_string(unsafe { msg_send![reminder, calendarItemIdentifier] }),
        title: nsstring_to_string(unsafe { msg_send![reminder, title] }),
        calendar: calendar_title(calendar),
        notes: nsstring_to_string(unsafe { msg_send![reminder, notes] }),
        priority: priority as i64,
        completed: completed.as_bool(),
        completion_date: nsdate_to_utc(unsafe { msg_send![reminder, completionDate] }),
        due: due_components(unsafe { msg_send![reminder, dueDateComponents] }),
    }
}

/// Calendar store backed by macOS EventKit
#[derive(Debug)]
pub struct EventKitStore {
    _private: (),
}

impl EventKitStore {
    /// Fails with `StoreUnavailable` when EventKit cannot be loaded
    pub fn new() -> Result<Self> {
        event_store_class()?;
        Ok(Self { _private: () })
    }
}

impl CalendarStore for EventKitStore {
    fn authorization(&self, entity: EntityKind) -> AuthorizationStatus {
        match event_store_class() {
            Ok(class) => {
                let code: isize = unsafe {
                    msg_send![class, authorizationStatusForEntityType: entity_type(entity)]
                };
                AuthorizationStatus::from_code(code as i64)
            }
            Err(_) => AuthorizationStatus::NotDetermined,
        }
    }

    fn request_access(&self, entity: EntityKind, timeout: Duration) -> Result<bool> {
        let store = new_event_store()?;
        let (tx, rx) = mpsc::channel();
        let completion = RcBlock::new(move |granted: Bool, _error: *mut AnyObject| {
            let _ = tx.send(granted.as_bool());
        });

        let full_access = match entity {
            EntityKind::Event => sel!(requestFullAccessToEventsWithCompletion:),
            EntityKind::Reminder => sel!(requestFullAccessToRemindersWithCompletion:),
        };
        let has_full_access: Bool = unsafe { msg_send![&*store, respondsToSelector: full_access] };

        unsafe {
            match (has_full_access.as_bool(), entity) {
                (true, EntityKind::Event) => {
                    let _: () =
                        msg_send![&*store, requestFullAccessToEventsWithCompletion: &*completion];
                }
                (true, EntityKind::Reminder) => {
                    let _: () = msg_send![
                        &*store,
                        requestFullAccessToRemindersWithCompletion: &*completion
                    ];
                }
                (false, _) => {
                    let _: () = msg_send![
                        &*store,
                        requestAccessToEntityType: entity_type(entity),
                        completion: &*completion
                    ];
                }
            }
        }

        match rx.recv_timeout(timeout) {
            Ok(granted) => Ok(granted),
            Err(_) => {
                warn!(?entity, timeout_secs = timeout.as_secs(), "No answer to the access request");
                Ok(false)
            }
        }
    }

    fn calendars(&self, entity: EntityKind) -> Result<Vec<NativeCalendar>> {
        autoreleasepool(|_| {
            let store = new_event_store()?;
            let calendars: *mut AnyObject =
                unsafe { msg_send![&*store, calendarsForEntityType: entity_type(entity)] };
            Ok(array_items(calendars)
                .into_iter()
                .map(|calendar| native_calendar(calendar, entity))
                .collect())
        })
    }

    fn events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: Option<&[String]>,
    ) -> Result<Vec<NativeEvent>> {
        autoreleasepool(|_| {
            let store = new_event_store()?;
            let selected = match calendars {
                Some(names) => match selected_calendars(&store, EntityKind::Event, names) {
                    Some(array) => array,
                    None => return Ok(Vec::new()),
                },
                None => ptr::null_mut(),
            };

            // EventKit silently truncates longer predicates, so walk the window in spans
            let mut seen = HashSet::new();
            let mut events = Vec::new();
            let mut span_start = start;
            loop {
                let span_end = (span_start + TimeDelta::days(MAX_PREDICATE_DAYS)).min(end);
                let predicate: *mut AnyObject = unsafe {
                    msg_send![
                        &*store,
                        predicateForEventsWithStartDate: utc_to_nsdate(span_start),
                        endDate: utc_to_nsdate(span_end),
                        calendars: selected
                    ]
                };
                let matches: *mut AnyObject =
                    unsafe { msg_send![&*store, eventsMatchingPredicate: predicate] };

                for event in array_items(matches).into_iter().filter_map(native_event) {
                    if seen.insert((event.id.clone(), event.start)) {
                        events.push(event);
                    }
                }

                if span_end >= end {
                    break;
                }
                span_start = span_end;
            }

            events.sort_by_key(|event| event.start);
            debug!(count = events.len(), "Fetched EventKit events");
            Ok(events)
        })
    }

    fn reminders(
        &self,
        calendars: Option<&[String]>,
        include_completed: bool,
    ) -> Result<Vec<NativeReminder>> {
        autoreleasepool(|_| {
            let store = new_event_store()?;
            let selected = match calendars {
                Some(names) => match selected_calendars(&store, EntityKind::Reminder, names) {
                    Some(array) => array,
                    None => return Ok(Vec::new()),
                },
                None => ptr::null_mut(),
            };

            let predicate: *mut AnyObject = if include_completed {
                unsafe { msg_send![&*store, predicateForRemindersInCalendars: selected] }
            } else {
                let unbounded: *mut AnyObject = ptr::null_mut();
                unsafe {
                    msg_send![
                        &*store,
                        predicateForIncompleteRemindersWithDueDateStarting: unbounded,
                        ending: unbounded,
                        calendars: selected
                    ]
                }
            };

            let (tx, rx) = mpsc::channel();
            let completion = RcBlock::new(move |reminders: *mut AnyObject| {
                let reminders: Vec<NativeReminder> = array_items(reminders)
                    .into_iter()
                    .map(native_reminder)
                    .collect();
                let _ = tx.send(reminders);
            });
            let _: *mut AnyObject = unsafe {
                msg_send![
                    &*store,
                    fetchRemindersMatchingPredicate: predicate,
                    completion: &*completion
                ]
            };

            let reminders = rx
                .recv_timeout(FETCH_TIMEOUT)
                .map_err(|_| unavailable("timed out waiting for EventKit reminders"))?;
            debug!(count = reminders.len(), "Fetched EventKit reminders");
            Ok(reminders)
        })
    }
}
