use thiserror::Error;

use crate::models::{EventNumber, Fincode, Millis};

/// Error type for time parsing, split layout and results reconciliation.
///
/// Unknown status codes are not represented here: they classify as
/// `Finished` (see [`crate::status::ResultStatus::classify`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimingError {
    #[error("invalid time '{input}': expected {expected}")]
    InvalidFormat { input: String, expected: &'static str },

    #[error("invalid time for leg {leg}: '{input}'")]
    InvalidLegTime { leg: usize, input: String },

    #[error("relay incomplete: missing legs {missing_legs:?}")]
    IncompleteRelay { missing_legs: Vec<usize> },

    #[error("a relay has {expected} legs, got {found}")]
    LegCount { expected: usize, found: usize },

    #[error("event {0} not found")]
    EventNotFound(EventNumber),

    #[error("athlete {0} not found")]
    AthleteNotFound(Fincode),

    #[error("distance {distance} is not a multiple of the {interval}m split interval")]
    InvalidDistance { distance: u32, interval: u32 },

    #[error("race distance {distance}m exceeds the {max}m limit")]
    DistanceTooLong { distance: u64, max: u32 },

    #[error("{distance}m is not a checkpoint of this race")]
    UnknownCheckpoint { distance: u32 },

    #[error("{millis}ms cannot be written as a race clock code")]
    OutOfRange { millis: Millis },

    #[error("malformed {table} row: {message}")]
    RowShape { table: &'static str, message: String },

    #[error("invalid timing config: {0}")]
    Config(String),

    #[error("relay events do not take individual entries (event {0})")]
    RelayEvent(EventNumber),
}

impl TimingError {
    pub(crate) fn invalid_code(input: &str) -> Self {
        TimingError::InvalidFormat {
            input: input.to_string(),
            expected: "mmsscc (e.g. 012345 for 1:23.45)",
        }
    }

    pub(crate) fn invalid_display(input: &str) -> Self {
        TimingError::InvalidFormat {
            input: input.to_string(),
            expected: "mm:ss.cc",
        }
    }

    /// Input validation errors the caller should show to the user as-is.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TimingError::InvalidFormat { .. }
                | TimingError::InvalidLegTime { .. }
                | TimingError::IncompleteRelay { .. }
                | TimingError::LegCount { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_error_display() {
        let err = TimingError::invalid_code("12345");
        assert_eq!(
            err.to_string(),
            "invalid time '12345': expected mmsscc (e.g. 012345 for 1:23.45)"
        );

        let err = TimingError::InvalidLegTime {
            leg: 3,
            input: "9".to_string(),
        };
        assert_eq!(err.to_string(), "invalid time for leg 3: '9'");

        let err = TimingError::IncompleteRelay {
            missing_legs: vec![2, 4],
        };
        assert_eq!(err.to_string(), "relay incomplete: missing legs [2, 4]");

        let err = TimingError::InvalidDistance {
            distance: 75,
            interval: 50,
        };
        assert_eq!(
            err.to_string(),
            "distance 75 is not a multiple of the 50m split interval"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(TimingError::invalid_display("1:2").is_validation());
        assert!(TimingError::IncompleteRelay { missing_legs: vec![1] }.is_validation());
        assert!(TimingError::LegCount { expected: 4, found: 5 }.is_validation());
        assert!(!TimingError::EventNotFound(EventNumber(4)).is_validation());
        assert!(!TimingError::Config("bad".to_string()).is_validation());
    }
}
