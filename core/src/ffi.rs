//! Surface exported to the mobile app through uniffi.
//!
//! Only primitive and record types cross the boundary. Full entities stay
//! on the Rust side.

use crate::duration::{
    format_duration, format_entry_time, format_lap, parse_display_duration, parse_race_clock_code,
    validate_time_input,
};
use crate::config::TimingConfig;
use crate::error::TimingError;
use crate::relay::aggregate_legs;
use crate::splits::lap_times;
use crate::status::{display_text, ResultStatus};

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    /// Bad user input; show the message next to the field.
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl From<TimingError> for FfiError {
    fn from(err: TimingError) -> Self {
        let message = err.to_string();
        if err.is_validation() {
            FfiError::Validation { message }
        } else {
            FfiError::Other { message }
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiLapLine {
    pub distance: u32,
    pub cumulative: String,
    pub lap: String,
}

#[uniffi::export]
pub fn parse_time_code(code: String) -> Result<u64, FfiError> {
    Ok(parse_race_clock_code(&code)?)
}

#[uniffi::export]
pub fn validate_time_code(code: String) -> Result<u64, FfiError> {
    Ok(validate_time_input(&code)?)
}

#[uniffi::export]
pub fn parse_display_time(text: String) -> Result<u64, FfiError> {
    Ok(parse_display_duration(&text)?)
}

#[uniffi::export]
pub fn format_time(ms: u64) -> String {
    format_duration(ms)
}

#[uniffi::export]
pub fn race_checkpoints(distance: u32) -> Result<Vec<u32>, FfiError> {
    Ok(TimingConfig::default().checkpoints(distance)?)
}

#[uniffi::export]
pub fn relay_race_checkpoints(leg_distance: u32, legs: u32) -> Result<Vec<u32>, FfiError> {
    Ok(TimingConfig::default().relay_checkpoints(leg_distance, legs)?)
}

/// Split table rows for checkpoints and their cumulative times (same length,
/// ordered by distance). Missing times are blank.
#[uniffi::export]
pub fn split_table(distances: Vec<u32>, cumulative_ms: Vec<Option<u64>>) -> Vec<FfiLapLine> {
    let laps = lap_times(&cumulative_ms);
    distances
        .into_iter()
        .zip(cumulative_ms)
        .zip(laps)
        .map(|((distance, cumulative), lap)| FfiLapLine {
            distance,
            cumulative: format_entry_time(cumulative.unwrap_or(0)),
            lap: format_lap(lap),
        })
        .collect()
}

#[uniffi::export]
pub fn relay_total(legs: Vec<u64>) -> Result<u64, FfiError> {
    Ok(aggregate_legs(&legs)?)
}

#[uniffi::export]
pub fn result_display(status_code: Option<i16>, time_ms: u64) -> String {
    display_text(ResultStatus::classify(status_code), time_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        match parse_time_code("12".to_string()) {
            Err(FfiError::Validation { message }) => assert!(message.contains("'12'")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(matches!(
            relay_total(vec![1, 2]),
            Err(FfiError::Validation { .. })
        ));
    }

    #[test]
    fn test_split_table() {
        let rows = split_table(vec![50, 100, 150], vec![Some(28_500), Some(58_000), None]);
        assert_eq!(
            rows[1],
            FfiLapLine {
                distance: 100,
                cumulative: "00:58.00".to_string(),
                lap: "00:29.50".to_string(),
            }
        );
        assert_eq!(rows[2].cumulative, "");
        assert_eq!(rows[2].lap, "--:--.--");
    }

    #[test]
    fn test_exports() {
        assert_eq!(format_time(83_450), "01:23.45");
        assert_eq!(validate_time_code("000000".to_string()).unwrap(), 0);
        assert_eq!(parse_display_time("1:23.45".to_string()).unwrap(), 83_450);
        assert_eq!(race_checkpoints(100).unwrap(), vec![50, 100]);
        assert_eq!(relay_race_checkpoints(50, 4).unwrap(), vec![50, 100, 150, 200]);
        assert_eq!(relay_total(vec![60_000, 58_000, 59_500, 57_000]).unwrap(), 234_500);
        assert_eq!(result_display(Some(2), 0), "DNF");
    }

    #[test]
    fn test_relay_total_needs_four_timed_legs() {
        assert!(matches!(
            relay_total(vec![60_000, 58_000, 59_500, 57_000, 99_999]),
            Err(FfiError::Validation { .. })
        ));
        match relay_total(vec![60_000, 0, 0, 0]) {
            Err(FfiError::Validation { message }) => assert!(message.contains("[2, 3, 4]")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_extreme_inputs_do_not_panic() {
        assert_eq!(format_time(u64::MAX), "307445734561825:51.62");
        assert!(matches!(
            relay_race_checkpoints(2_000_000_000, 4),
            Err(FfiError::Other { .. })
        ));
        assert!(matches!(
            race_checkpoints(u32::MAX),
            Err(FfiError::Other { .. })
        ));
    }
}
