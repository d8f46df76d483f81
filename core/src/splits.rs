//! Split checkpoints, lap times and split edit reconciliation.
//!
//! Races are split every 50m, except distance races (800m and 1500m by
//! default) which are split every 100m. The last checkpoint is always the
//! race distance.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{TimingConfig, UnevenDistance};
use crate::duration::{
    format_entry_time, format_lap, normalize_masked_input, parse_display_duration,
};
use crate::error::TimingError;
use crate::models::{Millis, Split, SplitId};

/// Longest race, relays included, that gets a checkpoint layout.
pub const MAX_RACE_DISTANCE: u32 = 100_000;

impl TimingConfig {
    /// Checkpoint spacing for a race distance.
    pub fn split_interval(&self, distance: u32) -> u32 {
        if self.long_interval_distances.contains(&distance) {
            self.long_interval
        } else {
            self.standard_interval
        }
    }

    /// Checkpoint distances for a race, strictly increasing and ending at
    /// `distance`. A zero distance has no checkpoints.
    pub fn checkpoints(&self, distance: u32) -> Result<Vec<u32>, TimingError> {
        if distance == 0 {
            return Ok(Vec::new());
        }
        if distance > MAX_RACE_DISTANCE {
            return Err(TimingError::DistanceTooLong {
                distance: u64::from(distance),
                max: MAX_RACE_DISTANCE,
            });
        }
        let interval = self.split_interval(distance);
        if interval == 0 {
            return Err(TimingError::Config(
                "split intervals must be positive".to_string(),
            ));
        }
        let mut checkpoints: Vec<u32> = (1..=distance / interval).map(|i| i * interval).collect();

        if distance % interval != 0 {
            match self.uneven_distance {
                UnevenDistance::AppendFinish => {
                    debug!(distance, interval, "Uneven race distance, appending finish checkpoint");
                    checkpoints.push(distance);
                }
                UnevenDistance::Reject => {
                    return Err(TimingError::InvalidDistance { distance, interval });
                }
            }
        }
        Ok(checkpoints)
    }
}

/// Checkpoint spacing for a race distance under the default rules.
pub fn split_interval(distance: u32) -> u32 {
    TimingConfig::default().split_interval(distance)
}

/// Checkpoint distances for a race under the default rules. Distances past
/// [`MAX_RACE_DISTANCE`] have none.
pub fn generate_checkpoints(distance: u32) -> Vec<u32> {
    TimingConfig::default()
        .checkpoints(distance)
        .unwrap_or_default()
}

/// Lap times from cumulative times ordered by distance.
///
/// A lap is defined only when its own cumulative time is positive and, past
/// the first checkpoint, the previous cumulative time is positive too. A
/// cumulative time below the previous one is an entry mistake and leaves the
/// lap undefined.
pub fn lap_times(cumulative: &[Option<Millis>]) -> Vec<Option<Millis>> {
    let positive = |t: Option<Millis>| t.filter(|&ms| ms > 0);

    cumulative
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            let current = positive(current)?;
            if i == 0 {
                return Some(current);
            }
            let previous = positive(cumulative[i - 1])?;
            current.checked_sub(previous)
        })
        .collect()
}

/// One row of a split table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LapLine {
    pub distance: u32,
    pub cumulative_ms: Option<Millis>,
    pub lap_ms: Option<Millis>,
}

impl LapLine {
    pub fn cumulative_text(&self) -> String {
        format_entry_time(self.cumulative_ms.unwrap_or(0))
    }

    pub fn lap_text(&self) -> String {
        format_lap(self.lap_ms)
    }
}

/// Split table for stored splits, sorted by distance.
pub fn lap_lines(splits: &[Split]) -> Vec<LapLine> {
    let mut sorted: Vec<&Split> = splits.iter().collect();
    sorted.sort_by_key(|s| s.distance);

    let cumulative: Vec<Option<Millis>> = sorted.iter().map(|s| Some(s.cumulative_ms)).collect();
    let laps = lap_times(&cumulative);

    sorted
        .iter()
        .zip(laps)
        .map(|(split, lap_ms)| LapLine {
            distance: split.distance,
            cumulative_ms: Some(split.cumulative_ms),
            lap_ms,
        })
        .collect()
}

/// One checkpoint of a split edit sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSlot {
    pub distance: u32,
    /// Stored split at this checkpoint, if any.
    pub split_id: Option<SplitId>,
    /// `None` while the checkpoint is blank.
    pub cumulative_ms: Option<Millis>,
}

impl SplitSlot {
    /// Fill a slot from typed text. Blank text leaves the checkpoint empty.
    pub fn with_input(mut self, text: &str) -> Result<Self, TimingError> {
        self.cumulative_ms = parse_split_input(text)?;
        Ok(self)
    }
}

/// Parse a typed split (`mm:ss.cc`, masked `_` allowed). Blank is `None`.
pub fn parse_split_input(text: &str) -> Result<Option<Millis>, TimingError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    parse_display_duration(&normalize_masked_input(text)).map(Some)
}

/// Lay out an edit sheet: one slot per checkpoint, prefilled from stored
/// splits. When `final_time_ms` is given and positive it overwrites the last
/// checkpoint.
pub fn split_sheet(
    checkpoints: &[u32],
    existing: &[Split],
    final_time_ms: Option<Millis>,
) -> Vec<SplitSlot> {
    let mut slots: Vec<SplitSlot> = checkpoints
        .iter()
        .map(|&distance| {
            let stored = existing.iter().find(|s| s.distance == distance);
            SplitSlot {
                distance,
                split_id: stored.and_then(|s| s.id),
                cumulative_ms: stored.map(|s| s.cumulative_ms),
            }
        })
        .collect();

    if let (Some(last), Some(final_ms)) = (slots.last_mut(), final_time_ms.filter(|&t| t > 0)) {
        last.cumulative_ms = Some(final_ms);
    }
    slots
}

/// Edit sheet for an individual result under the default split rules.
pub fn result_split_sheet(
    race_distance: u32,
    existing: &[Split],
    final_time_ms: Millis,
) -> Vec<SplitSlot> {
    split_sheet(&generate_checkpoints(race_distance), existing, Some(final_time_ms))
}

/// Lap table for an edit sheet, blanks included.
pub fn sheet_lap_lines(slots: &[SplitSlot]) -> Vec<LapLine> {
    let cumulative: Vec<Option<Millis>> = slots.iter().map(|s| s.cumulative_ms).collect();
    slots
        .iter()
        .zip(lap_times(&cumulative))
        .map(|(slot, lap_ms)| LapLine {
            distance: slot.distance,
            cumulative_ms: slot.cumulative_ms,
            lap_ms,
        })
        .collect()
}

/// A split row to insert (`id` is `None`) or update in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitUpsert {
    pub id: Option<SplitId>,
    pub distance: u32,
    pub cumulative_ms: Millis,
}

/// Two-phase change set for the splits of one result: delete first, then
/// upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitPlan {
    pub delete: Vec<SplitId>,
    pub upsert: Vec<SplitUpsert>,
}

impl SplitPlan {
    /// Drop every stored split, e.g. when the outcome is no longer finished.
    pub fn clear(existing: &[Split]) -> Self {
        SplitPlan {
            delete: existing.iter().filter_map(|s| s.id).collect(),
            upsert: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.upsert.is_empty()
    }
}

/// Reconcile edited slots against stored splits, keyed by checkpoint
/// distance.
///
/// Blank slots are dropped. Stored splits whose distance is not kept are
/// deleted; kept distances update the stored row, new distances insert.
/// Unchanged rows are left out. When `final_time_ms` is positive the last
/// checkpoint is set to it.
pub fn plan_split_changes(
    checkpoints: &[u32],
    existing: &[Split],
    edited: &[SplitSlot],
    final_time_ms: Option<Millis>,
) -> Result<SplitPlan, TimingError> {
    let mut kept: BTreeMap<u32, Millis> = BTreeMap::new();
    for slot in edited {
        if !checkpoints.contains(&slot.distance) {
            return Err(TimingError::UnknownCheckpoint {
                distance: slot.distance,
            });
        }
        if let Some(ms) = slot.cumulative_ms {
            kept.insert(slot.distance, ms);
        }
    }
    let final_ms = final_time_ms.filter(|&t| t > 0);
    if let (Some(&finish), Some(final_ms)) = (checkpoints.last(), final_ms) {
        kept.insert(finish, final_ms);
    }

    let mut plan = SplitPlan::default();
    let mut stored: BTreeMap<u32, &Split> = BTreeMap::new();
    for split in existing {
        let duplicate = stored.contains_key(&split.distance);
        if duplicate || !kept.contains_key(&split.distance) {
            plan.delete.extend(split.id);
        } else {
            stored.insert(split.distance, split);
        }
    }

    for (&distance, &cumulative_ms) in &kept {
        match stored.get(&distance) {
            Some(split) if split.cumulative_ms == cumulative_ms && split.id.is_some() => {}
            Some(split) => plan.upsert.push(SplitUpsert {
                id: split.id,
                distance,
                cumulative_ms,
            }),
            None => plan.upsert.push(SplitUpsert {
                id: None,
                distance,
                cumulative_ms,
            }),
        }
    }

    debug!(
        deletes = plan.delete.len(),
        upserts = plan.upsert.len(),
        "Planned split changes"
    );
    Ok(plan)
}
