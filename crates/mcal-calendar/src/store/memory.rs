//! In-memory store
//!
//! Serves records held in process, either built up in code or loaded
//! from a JSON fixture. Mirrors the OS store's predicate semantics
//! (interval overlap, calendar-name restriction) so results match what
//! the real backend would return.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CalendarStore;
use crate::error::{CalendarError, Result};
use crate::native::{AuthorizationStatus, EntityKind, NativeCalendar, NativeEvent, NativeReminder};

/// Authorization state per entity kind in a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureAuthorization {
    #[serde(default = "authorized")]
    pub event: AuthorizationStatus,
    #[serde(default = "authorized")]
    pub reminder: AuthorizationStatus,
}

impl Default for FixtureAuthorization {
    fn default() -> Self {
        Self {
            event: AuthorizationStatus::Authorized,
            reminder: AuthorizationStatus::Authorized,
        }
    }
}

fn authorized() -> AuthorizationStatus {
    AuthorizationStatus::Authorized
}

fn default_grant_on_request() -> bool {
    true
}

/// On-disk description of a whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreFixture {
    #[serde(default)]
    pub authorization: FixtureAuthorization,
    /// Outcome of an access prompt
    #[serde(default = "default_grant_on_request")]
    pub grant_on_request: bool,
    #[serde(default)]
    pub calendars: Vec<NativeCalendar>,
    #[serde(default)]
    pub events: Vec<NativeEvent>,
    #[serde(default)]
    pub reminders: Vec<NativeReminder>,
}

/// Store backed by in-process records
pub struct MemoryStore {
    calendars: Vec<NativeCalendar>,
    events: Vec<NativeEvent>,
    reminders: Vec<NativeReminder>,
    authorization: Mutex<HashMap<EntityKind, AuthorizationStatus>>,
    grant_on_request: bool,
    access_requests: AtomicUsize,
    unavailable: Option<String>,
}

impl MemoryStore {
    /// Empty store with full access to both entity kinds
    pub fn new() -> Self {
        Self::from_fixture(StoreFixture {
            grant_on_request: true,
            ..StoreFixture::default()
        })
    }

    pub fn from_fixture(fixture: StoreFixture) -> Self {
        let authorization = HashMap::from([
            (EntityKind::Event, fixture.authorization.event),
            (EntityKind::Reminder, fixture.authorization.reminder),
        ]);

        Self {
            calendars: fixture.calendars,
            events: fixture.events,
            reminders: fixture.reminders,
            authorization: Mutex::new(authorization),
            grant_on_request: fixture.grant_on_request,
            access_requests: AtomicUsize::new(0),
            unavailable: None,
        }
    }

    /// Parse a JSON fixture
    pub fn from_json_str(json: &str) -> Result<Self> {
        let fixture: StoreFixture = serde_json::from_str(json)
            .map_err(|e| CalendarError::StoreUnavailable(format!("invalid fixture: {}", e)))?;
        Ok(Self::from_fixture(fixture))
    }

    /// Load a JSON fixture file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CalendarError::StoreUnavailable(format!(
                "cannot read fixture {}: {}",
                path.display(),
                e
            ))
        })?;
        let store = Self::from_json_str(&content)?;
        debug!(
            path = %path.display(),
            calendars = store.calendars.len(),
            events = store.events.len(),
            reminders = store.reminders.len(),
            "Loaded store fixture"
        );
        Ok(store)
    }

    pub fn with_calendar(mut self, calendar: NativeCalendar) -> Self {
        self.calendars.push(calendar);
        self
    }

    pub fn with_event(mut self, event: NativeEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_reminder(mut self, reminder: NativeReminder) -> Self {
        self.reminders.push(reminder);
        self
    }

    pub fn with_authorization(self, entity: EntityKind, status: AuthorizationStatus) -> Self {
        if let Ok(mut authorization) = self.authorization.lock() {
            authorization.insert(entity, status);
        }
        self
    }

    /// Whether an access prompt is answered with a grant
    pub fn with_grant_on_request(mut self, grant: bool) -> Self {
        self.grant_on_request = grant;
        self
    }

    /// Make every data call fail with `StoreUnavailable`
    pub fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.unavailable = Some(reason.into());
        self
    }

    /// Number of access prompts shown so far
    pub fn access_requests(&self) -> usize {
        self.access_requests.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        match &self.unavailable {
            Some(reason) => Err(CalendarError::StoreUnavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn in_calendars(calendar: Option<&str>, calendars: Option<&[String]>) -> bool {
    match calendars {
        Some(names) => names.iter().any(|n| Some(n.as_str()) == calendar),
        None => true,
    }
}

impl CalendarStore for MemoryStore {
    fn authorization(&self, entity: EntityKind) -> AuthorizationStatus {
        self.authorization
            .lock()
            .ok()
            .and_then(|authorization| authorization.get(&entity).copied())
            .unwrap_or_default()
    }

    fn request_access(&self, entity: EntityKind, _timeout: Duration) -> Result<bool> {
        self.access_requests.fetch_add(1, Ordering::SeqCst);
        if self.grant_on_request {
            if let Ok(mut authorization) = self.authorization.lock() {
                authorization.insert(entity, AuthorizationStatus::Authorized);
            }
        }
        Ok(self.grant_on_request)
    }

    fn calendars(&self, entity: EntityKind) -> Result<Vec<NativeCalendar>> {
        self.check_available()?;
        Ok(self
            .calendars
            .iter()
            .filter(|c| c.entity == entity)
            .cloned()
            .collect())
    }

    fn events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: Option<&[String]>,
    ) -> Result<Vec<NativeEvent>> {
        self.check_available()?;
        Ok(self
            .events
            .iter()
            .filter(|e| e.overlaps(start, end))
            .filter(|e| in_calendars(e.calendar.as_deref(), calendars))
            .cloned()
            .collect())
    }

    fn reminders(
        &self,
        calendars: Option<&[String]>,
        include_completed: bool,
    ) -> Result<Vec<NativeReminder>> {
        self.check_available()?;
        Ok(self
            .reminders
            .iter()
            .filter(|r| include_completed || !r.completed)
            .filter(|r| in_calendars(r.calendar.as_deref(), calendars))
            .cloned()
            .collect())
    }
}
