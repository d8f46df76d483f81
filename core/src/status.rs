//! Result outcome classification and the rules for recording an outcome.

use tracing::debug;

use crate::duration::{format_entry_time, validate_time_input};
use crate::error::TimingError;
use crate::models::{Millis, RELAY_LEGS};
use crate::relay::validate_leg_input;

/// Status code of a row that is still an entry (not yet competed).
pub const ENTRY_STATUS: i16 = 0;

pub const DSQ_STATUS: i16 = 1;
pub const DNF_STATUS: i16 = 2;
pub const DNS_STATUS: i16 = 3;
pub const FINISHED_STATUS: i16 = 4;

/// Outcome of a competed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultStatus {
    Finished,
    Disqualified,
    DidNotFinish,
    DidNotStart,
}

impl ResultStatus {
    /// Map a store status code to an outcome.
    ///
    /// Codes 1-3 are DSQ/DNF/DNS. Everything else, including a missing code
    /// and codes outside the known domain, is `Finished`. Entry rows (code 0)
    /// are expected to be filtered out before classification.
    pub fn classify(code: Option<i16>) -> Self {
        match code {
            Some(DSQ_STATUS) => ResultStatus::Disqualified,
            Some(DNF_STATUS) => ResultStatus::DidNotFinish,
            Some(DNS_STATUS) => ResultStatus::DidNotStart,
            Some(FINISHED_STATUS) | Some(ENTRY_STATUS) | None => ResultStatus::Finished,
            Some(other) => {
                debug!(code = other, "Unknown result status code, treating as finished");
                ResultStatus::Finished
            }
        }
    }

    /// Code written to the store when this outcome is recorded.
    pub fn code(&self) -> i16 {
        match self {
            ResultStatus::Finished => FINISHED_STATUS,
            ResultStatus::Disqualified => DSQ_STATUS,
            ResultStatus::DidNotFinish => DNF_STATUS,
            ResultStatus::DidNotStart => DNS_STATUS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResultStatus::Finished => "FINISHED",
            ResultStatus::Disqualified => "DSQ",
            ResultStatus::DidNotFinish => "DNF",
            ResultStatus::DidNotStart => "DNS",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "FINISHED" => Some(ResultStatus::Finished),
            "DSQ" => Some(ResultStatus::Disqualified),
            "DNF" => Some(ResultStatus::DidNotFinish),
            "DNS" => Some(ResultStatus::DidNotStart),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, ResultStatus::Finished)
    }
}

/// Text shown in a results list: the time for a finished result (blank while
/// no time is recorded), otherwise the status code.
pub fn display_text(status: ResultStatus, time_ms: Millis) -> String {
    if status.is_finished() {
        format_entry_time(time_ms)
    } else {
        status.label().to_string()
    }
}

/// What to write back for an individual result after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedOutcome {
    pub status_code: i16,
    pub time_ms: Millis,
    /// Splits are only kept for finished results.
    pub keeps_splits: bool,
}

/// Apply the save rule for an individual result.
///
/// A non-finished outcome always records a zero time and drops its splits,
/// whatever was typed. A finished outcome must carry a valid time code.
pub fn record_outcome(status: ResultStatus, input: &str) -> Result<RecordedOutcome, TimingError> {
    let time_ms = if status.is_finished() {
        validate_time_input(input)?
    } else {
        0
    };

    Ok(RecordedOutcome {
        status_code: status.code(),
        time_ms,
        keeps_splits: status.is_finished(),
    })
}

/// What to write back for a relay result after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRelayOutcome {
    pub status_code: i16,
    pub leg_times_ms: [Millis; RELAY_LEGS],
}

/// Apply the save rule for a relay result.
///
/// Legs are validated in order and the first failing leg is reported.
pub fn record_relay_outcome(
    status: ResultStatus,
    inputs: [&str; RELAY_LEGS],
) -> Result<RecordedRelayOutcome, TimingError> {
    let mut leg_times_ms = [0; RELAY_LEGS];
    if status.is_finished() {
        for (i, input) in inputs.iter().enumerate() {
            leg_times_ms[i] =
                validate_leg_input(input).map_err(|_| TimingError::InvalidLegTime {
                    leg: i + 1,
                    input: input.to_string(),
                })?;
        }
    }

    Ok(RecordedRelayOutcome {
        status_code: status.code(),
        leg_times_ms,
    })
}
