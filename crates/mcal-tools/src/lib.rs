//! mcal-tools: Tools exposed by mac-calendar-mcp
//!
//! One [`Tool`](mcal_core::Tool) per operation. Calendar tools run their
//! store calls on a blocking worker; timezone tools are pure.

use std::sync::Arc;

use mcal_calendar::CalendarService;
use mcal_core::ToolManager;

pub mod calendar;
pub mod response;
pub mod time;

pub use calendar::{
    GetCalendarEventsTool, GetRemindersTool, GetTodaySummaryTool, ListCalendarsTool, SearchTool,
};
pub use time::{ConvertTimeTool, GetCurrentTimeTool, ListTimezonesTool};

/// Register every calendar and timezone tool with the tool manager
pub fn register_default_tools(manager: &mut ToolManager, service: Arc<CalendarService>) {
    manager.register(Arc::new(GetCalendarEventsTool::new(service.clone())));
    manager.register(Arc::new(GetCalendarEventsTool::alias(service.clone())));
    manager.register(Arc::new(GetRemindersTool::new(service.clone())));
    manager.register(Arc::new(SearchTool::new(service.clone())));
    manager.register(Arc::new(GetTodaySummaryTool::new(service.clone())));
    manager.register(Arc::new(ListCalendarsTool::new(service)));
    manager.register(Arc::new(GetCurrentTimeTool));
    manager.register(Arc::new(ConvertTimeTool));
    manager.register(Arc::new(ListTimezonesTool));
    tracing::info!(count = manager.len(), "Registered tools");
}
