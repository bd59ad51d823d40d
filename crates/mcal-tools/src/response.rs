//! Argument parsing and result envelopes shared by the tools

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use mcal_calendar::CalendarError;
use mcal_core::{Error, Result, ToolResult};

/// Deserialize tool arguments; any shape error is `InvalidParameter`
///
/// Absent arguments (`null`) read as an empty object.
pub fn parse_args<T: DeserializeOwned>(input: Value) -> std::result::Result<T, CalendarError> {
    let input = match input {
        Value::Null => Value::Object(Default::default()),
        Value::Object(_) => input,
        other => {
            return Err(CalendarError::InvalidParameter(format!(
                "arguments must be an object, got {}",
                other
            )));
        }
    };
    serde_json::from_value(input).map_err(|e| CalendarError::InvalidParameter(e.to_string()))
}

/// `{"error": {"kind", "message"}}` as an error result
pub fn error_result(error: &CalendarError) -> Result<ToolResult> {
    let envelope = json!({
        "error": {
            "kind": error.kind(),
            "message": error.to_string(),
        }
    });
    Ok(ToolResult::error(serde_json::to_string_pretty(&envelope)?))
}

/// Pretty JSON on success, the error envelope otherwise
pub fn respond<T: Serialize>(
    tool: &str,
    outcome: std::result::Result<T, CalendarError>,
) -> Result<ToolResult> {
    match outcome {
        Ok(value) => ToolResult::json(&value),
        Err(e) => {
            tracing::warn!(tool = %tool, kind = e.kind(), "Tool failed: {}", e);
            error_result(&e)
        }
    }
}

/// Run a store-backed call on a blocking worker
pub async fn run_blocking<T, F>(f: F) -> Result<std::result::Result<T, CalendarError>>
where
    T: Send + 'static,
    F: FnOnce() -> std::result::Result<T, CalendarError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::ToolExecution(format!("Calendar worker failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    struct Args {
        days_ahead: Option<i64>,
    }

    #[test]
    fn test_parse_args_null_is_empty() {
        let args: Args = parse_args(Value::Null).unwrap();
        assert_eq!(args.days_ahead, None);
    }

    #[test]
    fn test_parse_args_type_mismatch() {
        let err = parse_args::<Args>(json!({"days_ahead": "soon"})).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");

        let err = parse_args::<Args>(json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");
    }

    #[test]
    fn test_error_envelope() {
        let result = error_result(&CalendarError::UnknownTimezone("Mars/Base".into())).unwrap();
        assert!(result.is_error);

        let value: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(value["error"]["kind"], "UnknownTimezone");
        assert_eq!(value["error"]["message"], "Unknown timezone: Mars/Base");
    }

    #[test]
    fn test_respond_success_is_not_error() {
        let result = respond("t", Ok::<_, CalendarError>(Vec::<u8>::new())).unwrap();
        assert!(!result.is_error);
        assert_eq!(result.output, "[]");
    }

    #[tokio::test]
    async fn test_run_blocking() {
        let outcome = run_blocking(|| Ok::<_, CalendarError>(42)).await.unwrap();
        assert_eq!(outcome, Ok(42));
    }
}
