//! Calendar and reminder tools

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use mcal_calendar::{
    CalendarError, CalendarService, EntityKind, EventQuery, ReminderQuery, RsvpStatus, SearchQuery,
};
use mcal_core::{Result, SchemaBuilder, Tool, ToolResult};

use crate::response::{parse_args, respond, run_blocking};

fn rsvp_values() -> Vec<&'static str> {
    RsvpStatus::ALL.iter().map(|s| s.as_str()).collect()
}

fn start_date_schema() -> Value {
    SchemaBuilder::string("Start date (YYYY-MM-DD or ISO datetime). Defaults to today")
}

fn end_date_schema() -> Value {
    SchemaBuilder::string("End date (YYYY-MM-DD or ISO datetime). Defaults to start + days_ahead")
}

fn calendar_names_schema() -> Value {
    SchemaBuilder::string_array("Only include these calendars (exact names)")
}

/// Events in a date window, with attendee and availability filters
///
/// Registered under `get_calendar_events` and its alias `get_events`.
pub struct GetCalendarEventsTool {
    service: Arc<CalendarService>,
    name: &'static str,
}

impl GetCalendarEventsTool {
    pub const NAME: &'static str = "get_calendar_events";
    pub const ALIAS: &'static str = "get_events";

    pub fn new(service: Arc<CalendarService>) -> Self {
        Self {
            service,
            name: Self::NAME,
        }
    }

    pub fn alias(service: Arc<CalendarService>) -> Self {
        Self {
            service,
            name: Self::ALIAS,
        }
    }
}

#[async_trait]
impl Tool for GetCalendarEventsTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Get calendar events in a date range, optionally filtered by calendar, attendee, RSVP status, all-day or busy events"
    }

    fn input_schema(&self) -> Value {
        let days_ahead = self.service.defaults().days_ahead;
        SchemaBuilder::object(vec![
            ("start_date", start_date_schema(), false),
            ("end_date", end_date_schema(), false),
            ("calendar_names", calendar_names_schema(), false),
            (
                "days_ahead",
                SchemaBuilder::integer(
                    "Days after start_date to include when end_date is absent",
                    Some(days_ahead),
                ),
                false,
            ),
            (
                "attendee_name_pattern",
                SchemaBuilder::string("Case-insensitive substring of an attendee name or email"),
                false,
            ),
            (
                "attendee_status_filter",
                SchemaBuilder::enum_array(
                    "Keep events with an attendee in one of these RSVP states",
                    rsvp_values(),
                ),
                false,
            ),
            (
                "all_day_only",
                SchemaBuilder::boolean("Only all-day events", false),
                false,
            ),
            (
                "busy_only",
                SchemaBuilder::boolean("Only events that mark the calendar busy", false),
                false,
            ),
        ])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let service = self.service.clone();
        let outcome = run_blocking(move || {
            let query: EventQuery = parse_args(input)?;
            service.events(&query)
        })
        .await?;
        respond(self.name, outcome)
    }
}

/// Reminders due in a date window
pub struct GetRemindersTool {
    service: Arc<CalendarService>,
}

impl GetRemindersTool {
    pub const NAME: &'static str = "get_reminders";

    pub fn new(service: Arc<CalendarService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetRemindersTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get reminders due in a date range, optionally including completed or undated ones"
    }

    fn input_schema(&self) -> Value {
        let defaults = self.service.defaults();
        SchemaBuilder::object(vec![
            ("start_date", start_date_schema(), false),
            ("end_date", end_date_schema(), false),
            (
                "calendar_names",
                SchemaBuilder::string_array("Only include these reminder lists"),
                false,
            ),
            (
                "days_ahead",
                SchemaBuilder::integer(
                    "Days after start_date to include when end_date is absent",
                    Some(defaults.days_ahead),
                ),
                false,
            ),
            (
                "include_completed",
                SchemaBuilder::boolean("Include completed reminders", false),
                false,
            ),
            (
                "include_undated",
                SchemaBuilder::boolean(
                    "Include reminders without a due date",
                    defaults.include_undated_reminders,
                ),
                false,
            ),
        ])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let service = self.service.clone();
        let outcome = run_blocking(move || {
            let query: ReminderQuery = parse_args(input)?;
            service.reminders(&query)
        })
        .await?;
        respond(Self::NAME, outcome)
    }
}

/// Free-text search across events and open reminders
pub struct SearchTool {
    service: Arc<CalendarService>,
}

impl SearchTool {
    pub const NAME: &'static str = "search";

    pub fn new(service: Arc<CalendarService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search event titles, notes and locations and reminder titles and notes for a text, case-insensitively"
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(vec![
            ("query", SchemaBuilder::string("Text to search for"), true),
            (
                "search_events",
                SchemaBuilder::boolean("Search calendar events", true),
                false,
            ),
            (
                "search_reminders",
                SchemaBuilder::boolean("Search open reminders", true),
                false,
            ),
            ("start_date", start_date_schema(), false),
            (
                "end_date",
                SchemaBuilder::string(&format!(
                    "End date (YYYY-MM-DD or ISO datetime). Defaults to start + {} days",
                    self.service.defaults().search_days_ahead
                )),
                false,
            ),
            ("calendar_names", calendar_names_schema(), false),
        ])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let service = self.service.clone();
        let outcome = run_blocking(move || {
            let query: SearchQuery = parse_args(input)?;
            service.search(&query)
        })
        .await?;
        respond(Self::NAME, outcome)
    }
}

/// Today's events and open reminders due today
pub struct GetTodaySummaryTool {
    service: Arc<CalendarService>,
}

impl GetTodaySummaryTool {
    pub const NAME: &'static str = "get_today_summary";

    pub fn new(service: Arc<CalendarService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetTodaySummaryTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Summarize today's events and the open reminders due today"
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::empty_object()
    }

    async fn execute(&self, _input: Value) -> Result<ToolResult> {
        let service = self.service.clone();
        let outcome = run_blocking(move || service.today_summary()).await?;
        respond(Self::NAME, outcome)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListCalendarsArgs {
    entity_type: Option<String>,
}

fn parse_entity_type(
    value: Option<&str>,
) -> std::result::Result<Option<EntityKind>, CalendarError> {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("all") => Ok(None),
        Some("event") => Ok(Some(EntityKind::Event)),
        Some("reminder") => Ok(Some(EntityKind::Reminder)),
        Some(other) => Err(CalendarError::InvalidParameter(format!(
            "unknown entity_type '{}' (expected event, reminder or all)",
            other
        ))),
    }
}

/// Calendars and reminder lists
pub struct ListCalendarsTool {
    service: Arc<CalendarService>,
}

impl ListCalendarsTool {
    pub const NAME: &'static str = "list_calendars";

    pub fn new(service: Arc<CalendarService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ListCalendarsTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "List available calendars and reminder lists"
    }

    fn input_schema(&self) -> Value {
        let mut entity_type = SchemaBuilder::string_enum(vec!["event", "reminder", "all"]);
        entity_type["description"] = "Which kind of calendar to list".into();
        entity_type["default"] = "all".into();
        SchemaBuilder::object(vec![("entity_type", entity_type, false)])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let service = self.service.clone();
        let outcome = run_blocking(move || {
            let args: ListCalendarsArgs = parse_args(input)?;
            let entity = parse_entity_type(args.entity_type.as_deref())?;
            service.calendars(entity)
        })
        .await?;
        respond(Self::NAME, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use mcal_calendar::{
        AccessGuard, AuthorizationStatus, CalendarZone, MemoryStore, NativeCalendar, NativeEvent,
        NativeParticipant, NativeReminder,
    };
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap()
    }

    fn store() -> MemoryStore {
        let now = now();
        MemoryStore::new()
            .with_calendar(NativeCalendar {
                title: "Work".to_string(),
                kind: Default::default(),
                source: Some("iCloud".to_string()),
                color: None,
                entity: EntityKind::Event,
            })
            .with_calendar(NativeCalendar {
                title: "Groceries".to_string(),
                kind: Default::default(),
                source: None,
                color: None,
                entity: EntityKind::Reminder,
            })
            .with_event(NativeEvent {
                id: Some("e1".to_string()),
                title: Some("Team Standup".to_string()),
                calendar: Some("Work".to_string()),
                start: now - TimeDelta::minutes(30),
                end: now + TimeDelta::minutes(30),
                attendees: vec![
                    NativeParticipant {
                        name: Some("Bob".to_string()),
                        status: 3,
                        ..Default::default()
                    },
                    NativeParticipant {
                        name: Some("Alice".to_string()),
                        status: 2,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            })
            .with_reminder(NativeReminder {
                id: Some("r1".to_string()),
                title: Some("Standup notes".to_string()),
                calendar: Some("Groceries".to_string()),
                ..Default::default()
            })
    }

    fn service_for(store: MemoryStore) -> Arc<CalendarService> {
        let guard = AccessGuard::new(Arc::new(store), Duration::from_secs(1));
        let service = CalendarService::new(guard, CalendarZone::parse("UTC").unwrap());
        Arc::new(service.with_clock(now))
    }

    fn output(result: &ToolResult) -> Value {
        serde_json::from_str(&result.output).unwrap()
    }

    fn error_kind(result: &ToolResult) -> String {
        assert!(result.is_error, "expected an error: {}", result.output);
        output(result)["error"]["kind"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_events_and_alias_agree() {
        let service = service_for(store());
        let primary = GetCalendarEventsTool::new(service.clone());
        let alias = GetCalendarEventsTool::alias(service);

        assert_eq!(primary.input_schema(), alias.input_schema());

        let a = primary.execute(json!({})).await.unwrap();
        let b = alias.execute(Value::Null).await.unwrap();
        assert!(!a.is_error);
        assert_eq!(a.output, b.output);
        assert_eq!(output(&a)[0]["title"], "Team Standup");
    }

    #[tokio::test]
    async fn test_events_status_filter() {
        let tool = GetCalendarEventsTool::new(service_for(store()));

        let result = tool
            .execute(json!({"attendee_status_filter": ["Accepted"]}))
            .await
            .unwrap();
        assert_eq!(output(&result).as_array().unwrap().len(), 1);

        let result = tool
            .execute(json!({"attendee_status_filter": ["Tentative"]}))
            .await
            .unwrap();
        assert_eq!(output(&result), json!([]));

        let result = tool
            .execute(json!({"attendee_status_filter": ["Maybe"]}))
            .await
            .unwrap();
        assert_eq!(error_kind(&result), "InvalidParameter");
    }

    #[tokio::test]
    async fn test_events_bad_arguments() {
        let tool = GetCalendarEventsTool::new(service_for(store()));

        for args in [
            json!({"days_ahead": "a week"}),
            json!({"start_date": "2026-13-01"}),
            json!({"start_date": "2026-10-25", "end_date": "2026-10-20"}),
        ] {
            let result = tool.execute(args.clone()).await.unwrap();
            assert_eq!(error_kind(&result), "InvalidParameter", "{}", args);
        }
    }

    #[tokio::test]
    async fn test_permission_denied_envelope() {
        let service = service_for(
            store().with_authorization(EntityKind::Event, AuthorizationStatus::Denied),
        );
        let result = GetCalendarEventsTool::new(service)
            .execute(json!({}))
            .await
            .unwrap();
        assert_eq!(error_kind(&result), "PermissionDenied");
        assert!(output(&result)["error"]["message"]
            .as_str()
            .unwrap()
            .contains("System Settings"));
    }

    #[tokio::test]
    async fn test_reminders_undated_parameter() {
        let tool = GetRemindersTool::new(service_for(store()));

        let result = tool.execute(json!({})).await.unwrap();
        assert_eq!(output(&result), json!([]));

        let result = tool.execute(json!({"include_undated": true})).await.unwrap();
        assert_eq!(output(&result)[0]["title"], "Standup notes");
        assert_eq!(output(&result)[0]["due_date"], Value::Null);
    }

    #[tokio::test]
    async fn test_search_scopes() {
        let tool = SearchTool::new(service_for(store()));

        let result = tool
            .execute(json!({"query": "STANDUP", "search_reminders": false}))
            .await
            .unwrap();
        let hits = output(&result);
        assert_eq!(hits.as_array().unwrap().len(), 1);
        assert_eq!(hits[0]["type"], "event");

        let result = tool.execute(json!({"query": "standup"})).await.unwrap();
        let hits = output(&result);
        assert_eq!(hits[0]["type"], "event");
        assert_eq!(hits[1]["type"], "reminder");
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let tool = SearchTool::new(service_for(store()));
        assert_eq!(error_kind(&tool.execute(json!({})).await.unwrap()), "InvalidParameter");
        assert_eq!(
            error_kind(&tool.execute(json!({"query": " "})).await.unwrap()),
            "InvalidParameter"
        );
        assert_eq!(tool.input_schema()["required"], json!(["query"]));
    }

    #[tokio::test]
    async fn test_today_summary_empty_is_valid() {
        let tool = GetTodaySummaryTool::new(service_for(MemoryStore::new()));
        let result = tool.execute(json!({})).await.unwrap();
        assert!(!result.is_error);

        let summary = output(&result);
        assert_eq!(summary["events_count"], 0);
        assert_eq!(summary["events"], json!([]));
        assert_eq!(summary["reminders_count"], 0);
        assert_eq!(summary["reminders"], json!([]));
    }

    #[tokio::test]
    async fn test_list_calendars() {
        let tool = ListCalendarsTool::new(service_for(store()));

        let all = output(&tool.execute(json!({})).await.unwrap());
        assert_eq!(all.as_array().unwrap().len(), 2);
        assert_eq!(all[0]["type"], "Local");

        let reminders = output(&tool.execute(json!({"entity_type": "Reminder"})).await.unwrap());
        assert_eq!(reminders, json!([{
            "title": "Groceries",
            "type": "Local",
            "source": "",
            "color": null,
            "entity": "reminder"
        }]));

        let result = tool.execute(json!({"entity_type": "todo"})).await.unwrap();
        assert_eq!(error_kind(&result), "InvalidParameter");
    }

    #[test]
    fn test_parse_entity_type() {
        assert_eq!(parse_entity_type(None).unwrap(), None);
        assert_eq!(parse_entity_type(Some("ALL")).unwrap(), None);
        assert_eq!(parse_entity_type(Some("event")).unwrap(), Some(EntityKind::Event));
        assert!(parse_entity_type(Some("calendar")).is_err());
    }
}
