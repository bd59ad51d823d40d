//! Calendar queries
//!
//! [`CalendarService`] runs one request end to end: validate arguments,
//! resolve the date window, check access, fetch from the store,
//! normalize, filter. Every argument error is raised before the store
//! is touched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CalendarError, Result};
use crate::filter::FilterSpec;
use crate::models::{CalendarInfo, Event, Reminder, RsvpStatus, SearchHit, TodaySummary};
use crate::native::EntityKind;
use crate::normalize::Normalizer;
use crate::store::AccessGuard;
use crate::window::DateWindow;
use crate::zone::CalendarZone;

/// Defaults applied when a query leaves a setting out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDefaults {
    pub days_ahead: i64,
    pub search_days_ahead: i64,
    pub include_undated_reminders: bool,
}

impl Default for ServiceDefaults {
    fn default() -> Self {
        Self {
            days_ahead: 7,
            search_days_ahead: 30,
            include_undated_reminders: false,
        }
    }
}

/// Arguments of `get_calendar_events`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub days_ahead: Option<i64>,
    pub calendar_names: Vec<String>,
    pub attendee_name_pattern: Option<String>,
    pub attendee_status_filter: Vec<String>,
    pub all_day_only: bool,
    pub busy_only: bool,
}

/// Arguments of `get_reminders`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReminderQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub days_ahead: Option<i64>,
    pub calendar_names: Vec<String>,
    pub include_completed: bool,
    /// Keep reminders without a due date; falls back to the service default
    pub include_undated: Option<bool>,
}

/// Arguments of `search`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub query: String,
    pub search_events: bool,
    pub search_reminders: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub calendar_names: Vec<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            search_events: true,
            search_reminders: true,
            start_date: None,
            end_date: None,
            calendar_names: Vec::new(),
        }
    }
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Source of "now" for queries that default to today
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Read-only calendar and reminder queries over a guarded store
pub struct CalendarService {
    guard: AccessGuard,
    normalizer: Normalizer,
    defaults: ServiceDefaults,
    clock: Clock,
}

impl CalendarService {
    pub fn new(guard: AccessGuard, zone: CalendarZone) -> Self {
        Self {
            guard,
            normalizer: Normalizer::new(zone),
            defaults: ServiceDefaults::default(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, e.g. with a fixed instant
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn with_defaults(mut self, defaults: ServiceDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn zone(&self) -> &CalendarZone {
        self.normalizer.zone()
    }

    pub fn defaults(&self) -> &ServiceDefaults {
        &self.defaults
    }

    fn window(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        days_ahead: i64,
        now: DateTime<Utc>,
    ) -> Result<DateWindow> {
        let zone = self.zone();
        let window = DateWindow::resolve(start_date, end_date, days_ahead, zone, zone.today(now))?;
        debug!(start = %window.start, end = %window.end, "Resolved date window");
        Ok(window)
    }

    fn fetch_events(&self, spec: &FilterSpec) -> Result<Vec<Event>> {
        let window = spec
            .window()
            .ok_or_else(|| CalendarError::invalid("event queries need a date window"))?;

        self.guard.ensure(EntityKind::Event)?;
        let native = self
            .guard
            .store()
            .events(window.start_utc(), window.end_utc(), spec.calendar_names())?;
        let fetched = native.len();

        let events = spec.apply(native.iter().map(|e| self.normalizer.event(e)).collect());
        debug!(fetched, count = events.len(), "Filtered events");
        Ok(events)
    }

    fn fetch_reminders(&self, spec: &FilterSpec, include_completed: bool) -> Result<Vec<Reminder>> {
        self.guard.ensure(EntityKind::Reminder)?;
        let native = self
            .guard
            .store()
            .reminders(spec.calendar_names(), include_completed)?;
        let fetched = native.len();

        let reminders = spec.apply(native.iter().map(|r| self.normalizer.reminder(r)).collect());
        debug!(fetched, count = reminders.len(), "Filtered reminders");
        Ok(reminders)
    }

    /// Events overlapping the requested window
    pub fn events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        self.events_at(query, self.now())
    }

    pub fn events_at(&self, query: &EventQuery, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let statuses = query
            .attendee_status_filter
            .iter()
            .map(|s| s.parse::<RsvpStatus>())
            .collect::<Result<Vec<_>>>()?;
        let window = self.window(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            query.days_ahead.unwrap_or(self.defaults.days_ahead),
            now,
        )?;

        let spec = FilterSpec::new()
            .with_window(window)
            .with_calendar_names(query.calendar_names.clone())
            .with_attendee_pattern(query.attendee_name_pattern.as_deref().unwrap_or_default())
            .with_attendee_statuses(statuses)
            .with_all_day_only(query.all_day_only)
            .with_busy_only(query.busy_only);

        self.fetch_events(&spec)
    }

    /// Reminders due inside the requested window
    pub fn reminders(&self, query: &ReminderQuery) -> Result<Vec<Reminder>> {
        self.reminders_at(query, self.now())
    }

    pub fn reminders_at(&self, query: &ReminderQuery, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
        let window = self.window(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            query.days_ahead.unwrap_or(self.defaults.days_ahead),
            now,
        )?;

        let spec = FilterSpec::new()
            .with_window(window)
            .with_undated(
                query
                    .include_undated
                    .unwrap_or(self.defaults.include_undated_reminders),
            )
            .with_calendar_names(query.calendar_names.clone())
            .with_exclude_completed(!query.include_completed);

        self.fetch_reminders(&spec, query.include_completed)
    }

    /// Free-text search, events first, then open reminders
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        self.search_at(query, self.now())
    }

    pub fn search_at(&self, query: &SearchQuery, now: DateTime<Utc>) -> Result<Vec<SearchHit>> {
        if query.query.trim().is_empty() {
            return Err(CalendarError::invalid("query must not be empty"));
        }
        let window = self.window(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            self.defaults.search_days_ahead,
            now,
        )?;

        let spec = FilterSpec::new()
            .with_window(window)
            .with_calendar_names(query.calendar_names.clone())
            .with_text(&query.query);

        let mut hits = Vec::new();
        if query.search_events {
            hits.extend(self.fetch_events(&spec)?.into_iter().map(SearchHit::Event));
        }
        if query.search_reminders {
            let spec = spec.with_undated(true).with_exclude_completed(true);
            hits.extend(
                self.fetch_reminders(&spec, false)?
                    .into_iter()
                    .map(SearchHit::Reminder),
            );
        }

        debug!(query = %query.query, count = hits.len(), "Search finished");
        Ok(hits)
    }

    /// Today's events and the open reminders due today
    pub fn today_summary(&self) -> Result<TodaySummary> {
        self.today_summary_at(self.now())
    }

    pub fn today_summary_at(&self, now: DateTime<Utc>) -> Result<TodaySummary> {
        let today = self.zone().today(now);
        let window = DateWindow::day(today, self.zone())?;

        let events = self.fetch_events(&FilterSpec::new().with_window(window))?;
        let reminders = self.fetch_reminders(
            &FilterSpec::new()
                .with_window(window)
                .with_exclude_completed(true),
            false,
        )?;

        Ok(TodaySummary::new(today, events, reminders))
    }

    /// Calendars holding `entity`, or every calendar when `None`
    pub fn calendars(&self, entity: Option<EntityKind>) -> Result<Vec<CalendarInfo>> {
        let kinds = match entity {
            Some(kind) => vec![kind],
            None => vec![EntityKind::Event, EntityKind::Reminder],
        };

        let mut calendars = Vec::new();
        for kind in kinds {
            self.guard.ensure(kind)?;
            let native = self.guard.store().calendars(kind)?;
            calendars.extend(native.iter().map(|c| self.normalizer.calendar(c)));
        }

        debug!(count = calendars.len(), "Listed calendars");
        Ok(calendars)
    }
}
