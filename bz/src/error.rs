//! Chart derivation error types

use thiserror::Error;

/// Which birth-data field an input error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Date,
    Time,
}

impl std::fmt::Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
        }
    }
}

/// Errors that can occur while deriving a chart
///
/// All three are terminal for the call; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    /// Missing or unparseable birth date/time
    #[error("Invalid birth {field}: {reason}")]
    InvalidInput { field: InputField, reason: String },

    /// The calendar conversion engine is not initialized or reachable
    #[error("Calendar engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine was reachable but rejected this particular moment
    #[error("Chart calculation failed: {0}")]
    CalculationFailed(String),
}

impl ChartError {
    pub fn missing(field: InputField) -> Self {
        ChartError::InvalidInput {
            field,
            reason: "value is required".to_string(),
        }
    }

    pub fn unparseable(field: InputField, value: &str) -> Self {
        ChartError::InvalidInput {
            field,
            reason: format!("'{}' is not a valid {}", value, field),
        }
    }

    /// The field named by an input error
    pub fn field(&self) -> Option<InputField> {
        match self {
            ChartError::InvalidInput { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Check if the caller should re-prompt the user rather than reload the engine
    pub fn is_user_error(&self) -> bool {
        matches!(self, ChartError::InvalidInput { .. })
    }
}
