//! Timezone tools

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use mcal_calendar::{convert_time, current_time, list_timezones};
use mcal_core::{Result, SchemaBuilder, Tool, ToolResult};

use crate::response::{parse_args, respond};

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CurrentTimeArgs {
    timezone: String,
}

impl Default for CurrentTimeArgs {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

/// Current time in a named zone
pub struct GetCurrentTimeTool;

#[async_trait]
impl Tool for GetCurrentTimeTool {
    fn name(&self) -> &str {
        "get_current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time in a timezone"
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(vec![(
            "timezone",
            SchemaBuilder::string_with_default(
                "IANA timezone name, e.g. 'America/New_York'",
                "UTC",
            ),
            false,
        )])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let outcome =
            parse_args::<CurrentTimeArgs>(input).and_then(|args| current_time(&args.timezone));
        respond(self.name(), outcome)
    }
}

#[derive(Debug, Deserialize)]
struct ConvertTimeArgs {
    datetime_str: String,
    from_timezone: String,
    to_timezone: String,
}

/// Datetime conversion between named zones
pub struct ConvertTimeTool;

#[async_trait]
impl Tool for ConvertTimeTool {
    fn name(&self) -> &str {
        "convert_time"
    }

    fn description(&self) -> &str {
        "Convert a datetime from one timezone to another"
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(vec![
            (
                "datetime_str",
                SchemaBuilder::string(
                    "Datetime to convert (ISO format, e.g. '2026-01-15T12:00:00')",
                ),
                true,
            ),
            ("from_timezone", SchemaBuilder::string("Source IANA timezone"), true),
            ("to_timezone", SchemaBuilder::string("Target IANA timezone"), true),
        ])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let outcome = parse_args::<ConvertTimeArgs>(input)
            .and_then(|args| {
                convert_time(&args.datetime_str, &args.from_timezone, &args.to_timezone)
            });
        respond(self.name(), outcome)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListTimezonesArgs {
    region: Option<String>,
}

/// Known zone names, optionally for one region
pub struct ListTimezonesTool;

#[async_trait]
impl Tool for ListTimezonesTool {
    fn name(&self) -> &str {
        "list_timezones"
    }

    fn description(&self) -> &str {
        "List available timezone names, optionally only those in a region such as 'Europe'"
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(vec![(
            "region",
            SchemaBuilder::string("Region prefix, e.g. 'America', 'Europe' or 'Asia'"),
            false,
        )])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let outcome = parse_args::<ListTimezonesArgs>(input)
            .map(|args| list_timezones(args.region.as_deref()));
        respond(self.name(), outcome)
    }
}
