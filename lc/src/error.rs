//! Calendar error types

use thiserror::Error;

/// Errors raised while converting between calendars
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("Year {year} is outside the supported range {min}-{max}")]
    OutOfRange { year: i32, min: i32, max: i32 },

    #[error("Invalid solar date: {0}")]
    InvalidSolarDate(String),

    #[error("Invalid lunar date: {0}")]
    InvalidLunarDate(String),

    #[error("Invalid time of day: {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },
}

impl CalendarError {
    /// Build an out-of-range error against the supported year window
    pub fn out_of_range(year: i32) -> Self {
        CalendarError::OutOfRange {
            year,
            min: crate::MIN_YEAR,
            max: crate::MAX_YEAR,
        }
    }
}

/// Result alias for calendar operations
pub type Result<T> = std::result::Result<T, CalendarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = CalendarError::out_of_range(1800);
        assert_eq!(err.to_string(), "Year 1800 is outside the supported range 1900-2100");
    }

    #[test]
    fn test_invalid_time_message() {
        let err = CalendarError::InvalidTime { hour: 25, minute: 7 };
        assert_eq!(err.to_string(), "Invalid time of day: 25:07");
    }
}
