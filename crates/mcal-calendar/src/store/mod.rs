//! Store Accessor boundary
//!
//! [`CalendarStore`] is the seam to the OS personal-information store.
//! [`AccessGuard`] performs the permission check in front of it.

mod memory;

pub use memory::{MemoryStore, StoreFixture};

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{CalendarError, Result};
use crate::native::{AuthorizationStatus, EntityKind, NativeCalendar, NativeEvent, NativeReminder};

/// Bulk access to calendars, events and reminders
///
/// Calls block; async callers run them on a blocking worker.
pub trait CalendarStore: Send + Sync {
    /// Current authorization for `entity`, without prompting
    fn authorization(&self, entity: EntityKind) -> AuthorizationStatus;

    /// Ask the user for full access, waiting at most `timeout`.
    /// Returns whether access was granted.
    fn request_access(&self, entity: EntityKind, timeout: Duration) -> Result<bool>;

    /// Calendars (or reminder lists) holding `entity`
    fn calendars(&self, entity: EntityKind) -> Result<Vec<NativeCalendar>>;

    /// Events intersecting `[start, end]`, optionally restricted to the
    /// named calendars
    fn events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: Option<&[String]>,
    ) -> Result<Vec<NativeEvent>>;

    /// Reminders, optionally restricted to the named lists. Completed
    /// reminders are left out unless `include_completed`.
    fn reminders(
        &self,
        calendars: Option<&[String]>,
        include_completed: bool,
    ) -> Result<Vec<NativeReminder>>;
}

/// Permission gate in front of a [`CalendarStore`]
///
/// A grant is remembered for the lifetime of the guard; a denial is
/// not, so the user can fix it in System Settings without a restart.
pub struct AccessGuard {
    store: Arc<dyn CalendarStore>,
    timeout: Duration,
    granted: Mutex<HashSet<EntityKind>>,
}

impl AccessGuard {
    pub fn new(store: Arc<dyn CalendarStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            granted: Mutex::new(HashSet::new()),
        }
    }

    fn is_cached(&self, entity: EntityKind) -> bool {
        self.granted
            .lock()
            .map(|granted| granted.contains(&entity))
            .unwrap_or(false)
    }

    fn remember(&self, entity: EntityKind) {
        if let Ok(mut granted) = self.granted.lock() {
            granted.insert(entity);
        }
    }

    fn denied(entity: EntityKind) -> CalendarError {
        let pane = entity.settings_pane();
        CalendarError::PermissionDenied(format!(
            "{} access was not granted. Allow it in System Settings > Privacy & Security > {} and try again.",
            pane, pane
        ))
    }

    /// Make sure `entity` may be read, prompting the user if needed
    pub fn ensure(&self, entity: EntityKind) -> Result<()> {
        if self.is_cached(entity) {
            return Ok(());
        }

        match self.store.authorization(entity) {
            AuthorizationStatus::Authorized => {}
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                warn!(?entity, "Store access denied");
                return Err(Self::denied(entity));
            }
            AuthorizationStatus::NotDetermined | AuthorizationStatus::WriteOnly => {
                info!(?entity, timeout_secs = self.timeout.as_secs(), "Requesting store access");
                if !self.store.request_access(entity, self.timeout)? {
                    warn!(?entity, "Store access request was not granted");
                    return Err(Self::denied(entity));
                }
            }
        }

        info!(?entity, "Store access granted");
        self.remember(entity);
        Ok(())
    }

    /// The guarded store
    pub fn store(&self) -> &dyn CalendarStore {
        self.store.as_ref()
    }
}
