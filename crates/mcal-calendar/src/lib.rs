//! mcal-calendar: Calendar and reminder queries for mac-calendar-mcp
//!
//! Store records come in through the [`CalendarStore`] trait, are
//! flattened by the [`Normalizer`], filtered by a [`FilterSpec`] and
//! returned as [`Event`] / [`Reminder`] values.
//!
//! ## Features
//!
//! - Date window resolution with per-zone "today"
//! - Attendee, RSVP, all-day, busy, completion and free-text filters
//! - Permission gate with a per-process grant cache
//! - In-memory store loadable from a JSON fixture
//! - Timezone lookups over the IANA database
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::{sync::Arc, time::Duration};
//! use mcal_calendar::{AccessGuard, CalendarService, CalendarZone, EventQuery, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::from_json_file("fixture.json")?);
//! let guard = AccessGuard::new(store, Duration::from_secs(30));
//! let service = CalendarService::new(guard, CalendarZone::parse("Europe/Paris")?);
//!
//! let events = service.events(&EventQuery {
//!     busy_only: true,
//!     ..Default::default()
//! })?;
//! ```

pub mod error;
pub mod filter;
pub mod models;
pub mod native;
pub mod normalize;
pub mod service;
pub mod store;
pub mod timezone;
pub mod window;
pub mod zone;

pub use error::{CalendarError, Result};
pub use filter::{FilterSpec, Filterable};
pub use models::{
    Attendee, Availability, CalendarInfo, Event, Priority, Reminder, RsvpStatus, SearchHit,
    TodaySummary,
};
pub use native::{
    AuthorizationStatus, CalendarKind, EntityKind, NativeCalendar, NativeDueDate, NativeEvent,
    NativeParticipant, NativeReminder,
};
pub use normalize::{Normalizer, extract_meeting_url};
pub use service::{CalendarService, Clock, EventQuery, ReminderQuery, SearchQuery, ServiceDefaults};
pub use store::{AccessGuard, CalendarStore, MemoryStore, StoreFixture};
pub use timezone::{CurrentTime, TimeConversion, convert_time, current_time, list_timezones};
pub use window::DateWindow;
pub use zone::{CalendarZone, format_canonical};

/// Re-export the service surface for easy use
pub mod prelude {
    pub use super::{
        AccessGuard, CalendarService, CalendarStore, CalendarZone, EventQuery, MemoryStore,
        ReminderQuery, SearchQuery,
    };
}
