//! Error types for mcal-calendar

use thiserror::Error;

/// mcal-calendar error type
///
/// Every variant is permanent for the request that raised it; callers
/// report it as-is rather than retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("{0}")]
    PermissionDenied(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid datetime string: {0}")]
    InvalidDatetimeFormat(String),

    #[error("Calendar store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CalendarError {
    /// Stable kind name reported to callers alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "PermissionDenied",
            Self::InvalidParameter(_) => "InvalidParameter",
            Self::UnknownTimezone(_) => "UnknownTimezone",
            Self::InvalidDatetimeFormat(_) => "InvalidDatetimeFormat",
            Self::StoreUnavailable(_) => "StoreUnavailable",
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CalendarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CalendarError::PermissionDenied("x".into()).kind(),
            "PermissionDenied"
        );
        assert_eq!(CalendarError::invalid("x").kind(), "InvalidParameter");
        assert_eq!(
            CalendarError::UnknownTimezone("Mars/Base".into()).to_string(),
            "Unknown timezone: Mars/Base"
        );
        assert_eq!(
            CalendarError::InvalidDatetimeFormat("nope".into()).to_string(),
            "Invalid datetime string: nope"
        );
    }
}
