//! mcal-eventkit: EventKit calendar store for mac-calendar-mcp
//!
//! Implements [`CalendarStore`](mcal_calendar::CalendarStore) over
//! macOS EventKit. On any other platform [`EventKitStore::new`] fails
//! with `StoreUnavailable`, so callers can fall back to a fixture store.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
mod util;

#[cfg(target_os = "macos")]
pub use macos::EventKitStore;

#[cfg(not(target_os = "macos"))]
pub use unsupported::EventKitStore;

#[cfg(not(target_os = "macos"))]
mod unsupported {
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use mcal_calendar::{
        AuthorizationStatus, CalendarError, CalendarStore, EntityKind, NativeCalendar, NativeEvent,
        NativeReminder, Result,
    };

    fn unavailable() -> CalendarError {
        CalendarError::StoreUnavailable("EventKit is only available on macOS".to_string())
    }

    /// Placeholder for platforms without EventKit
    #[derive(Debug)]
    pub struct EventKitStore {
        _private: (),
    }

    impl EventKitStore {
        pub fn new() -> Result<Self> {
            Err(unavailable())
        }
    }

    impl CalendarStore for EventKitStore {
        fn authorization(&self, _entity: EntityKind) -> AuthorizationStatus {
            AuthorizationStatus::NotDetermined
        }

        fn request_access(&self, _entity: EntityKind, _timeout: Duration) -> Result<bool> {
            Err(unavailable())
        }

        fn calendars(&self, _entity: EntityKind) -> Result<Vec<NativeCalendar>> {
            Err(unavailable())
        }

        fn events(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _calendars: Option<&[String]>,
        ) -> Result<Vec<NativeEvent>> {
            Err(unavailable())
        }

        fn reminders(
            &self,
            _calendars: Option<&[String]>,
            _include_completed: bool,
        ) -> Result<Vec<NativeReminder>> {
            Err(unavailable())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_os = "macos"))]
    fn test_unavailable_off_macos() {
        let err = EventKitStore::new().unwrap_err();
        assert_eq!(err.kind(), "StoreUnavailable");
        assert!(err.to_string().contains("macOS"));
    }

    // Needs a macOS host; does not prompt for access
    #[test]
    #[cfg(target_os = "macos")]
    fn test_authorization_status_readable() {
        use mcal_calendar::{CalendarStore, EntityKind};

        let store = EventKitStore::new().unwrap();
        let _ = store.authorization(EntityKind::Event);
        let _ = store.authorization(EntityKind::Reminder);
    }
}
