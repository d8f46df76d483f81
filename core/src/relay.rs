//! Relay leg aggregation and relay split layout.

use crate::config::TimingConfig;
use crate::duration::validate_time_input;
use crate::error::TimingError;
use crate::models::{Event, Millis, RelayResult, RelaySplit, RELAY_LEGS};
use crate::splits::{split_sheet, SplitSlot, MAX_RACE_DISTANCE};
use crate::status::{display_text, ResultStatus};

/// Total relay time: the plain sum of the legs.
pub fn aggregate(legs: [Millis; RELAY_LEGS]) -> Millis {
    legs.iter().fold(0, |total, &ms| total.saturating_add(ms))
}

/// 1-based numbers of the legs with no time.
fn zero_legs(legs: &[Millis]) -> Vec<usize> {
    legs.iter()
        .enumerate()
        .filter(|(_, ms)| **ms == 0)
        .map(|(i, _)| i + 1)
        .collect()
}

/// Total relay time from typed legs. Exactly four legs are required, and a
/// zero leg is missing, so fewer than four valid legs blocks the total.
pub fn aggregate_legs(legs: &[Millis]) -> Result<Millis, TimingError> {
    if legs.len() > RELAY_LEGS {
        return Err(TimingError::LegCount {
            expected: RELAY_LEGS,
            found: legs.len(),
        });
    }

    let mut missing_legs = zero_legs(legs);
    missing_legs.extend(legs.len() + 1..=RELAY_LEGS);
    if !missing_legs.is_empty() {
        return Err(TimingError::IncompleteRelay { missing_legs });
    }

    legs.iter()
        .try_fold(0, |total: Millis, &ms| total.checked_add(ms))
        .ok_or(TimingError::OutOfRange { millis: Millis::MAX })
}

/// Validate one typed leg time. `000000` is an explicit zero leg.
pub fn validate_leg_input(code: &str) -> Result<Millis, TimingError> {
    validate_time_input(code)
}

impl RelayResult {
    /// Sum of leg times. Used as the ranking key even when legs are missing.
    pub fn total_time(&self) -> Millis {
        aggregate(self.leg_times())
    }

    /// Sum of leg entry times.
    pub fn entry_total(&self) -> Millis {
        aggregate(self.leg_entry_times())
    }

    /// Total time, defined only when every leg has a time. A zero leg is
    /// missing data, not a zero-time swim.
    pub fn completed_total(&self) -> Result<Millis, TimingError> {
        aggregate_legs(&self.leg_times())
    }
}

/// Text shown for a relay in a results list: the status label, or for a
/// finished relay its total. A finished relay with a missing leg is blank.
pub fn display_total(relay: &RelayResult) -> String {
    match relay.status() {
        ResultStatus::Finished => display_text(
            ResultStatus::Finished,
            relay.completed_total().unwrap_or(0),
        ),
        status => display_text(status, 0),
    }
}

impl TimingConfig {
    /// Checkpoints across all legs of a relay. Leg `k` contributes its own
    /// checkpoints offset by `(k - 1) * leg_distance`.
    ///
    /// The whole relay distance is bounded by [`MAX_RACE_DISTANCE`].
    pub fn relay_checkpoints(&self, leg_distance: u32, legs: u32) -> Result<Vec<u32>, TimingError> {
        let within_limit = leg_distance
            .checked_mul(legs)
            .is_some_and(|total| total <= MAX_RACE_DISTANCE);
        if !within_limit {
            return Err(TimingError::DistanceTooLong {
                distance: u64::from(leg_distance) * u64::from(legs),
                max: MAX_RACE_DISTANCE,
            });
        }

        let local = self.checkpoints(leg_distance)?;
        if local.is_empty() {
            return Ok(Vec::new());
        }
        let mut checkpoints = Vec::with_capacity(local.len() * legs as usize);
        for leg in 0..legs {
            let offset = leg * leg_distance;
            checkpoints.extend(local.iter().map(|d| offset + d));
        }
        Ok(checkpoints)
    }

    /// Edit sheet for a relay's splits. Events without a race have none.
    pub fn relay_split_sheet(
        &self,
        event: &Event,
        existing: &[RelaySplit],
    ) -> Result<Vec<SplitSlot>, TimingError> {
        let Some(race) = event.race.as_ref() else {
            return Ok(Vec::new());
        };
        let legs = if race.relay_count > 1 {
            race.relay_count
        } else {
            self.relay_legs
        };
        let checkpoints = self.relay_checkpoints(race.distance, legs)?;
        Ok(split_sheet(&checkpoints, existing, None))
    }
}

/// Relay checkpoints under the default split rules. Relays past
/// [`MAX_RACE_DISTANCE`] have none.
pub fn relay_checkpoints(leg_distance: u32, legs: u32) -> Vec<u32> {
    TimingConfig::default()
        .relay_checkpoints(leg_distance, legs)
        .unwrap_or_default()
}
