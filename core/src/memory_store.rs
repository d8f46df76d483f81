use std::collections::BTreeMap;

use crate::models::{EventNumber, Fincode, IndividualResult, MeetId, ResultId, Split, SplitId};
use crate::reconcile::NewEntry;
use crate::splits::SplitUpsert;
use crate::storage::{ResultStore, SplitOwner};

/// In-memory [`ResultStore`] enforcing the same uniqueness rules as the
/// database: one split per (owner, distance) and one row per
/// (meet, event, athlete). Each batch is checked as a whole and either
/// lands completely or not at all.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub splits: BTreeMap<SplitOwner, Vec<Split>>,
    pub results: Vec<IndividualResult>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(results: Vec<IndividualResult>) -> Self {
        let next_id = results.iter().map(|r| r.id.0).max().unwrap_or(0);
        Self {
            results,
            next_id,
            ..Self::default()
        }
    }

    /// Splits of one owner, ordered by distance.
    pub fn splits_for(&self, owner: SplitOwner) -> Vec<Split> {
        let mut splits = self.splits.get(&owner).cloned().unwrap_or_default();
        splits.sort_by_key(|s| s.distance);
        splits
    }
}

impl ResultStore for MemoryStore {
    fn delete_splits(&mut self, owner: SplitOwner, ids: &[SplitId]) -> Result<(), String> {
        if let Some(splits) = self.splits.get_mut(&owner) {
            splits.retain(|s| s.id.map_or(true, |id| !ids.contains(&id)));
        }
        Ok(())
    }

    fn upsert_splits(&mut self, owner: SplitOwner, rows: &[SplitUpsert]) -> Result<(), String> {
        let mut splits = self.splits.get(&owner).cloned().unwrap_or_default();
        let mut next_id = self.next_id;

        for row in rows {
            match row.id {
                Some(id) => {
                    let split = splits
                        .iter_mut()
                        .find(|s| s.id == Some(id))
                        .ok_or_else(|| format!("split {} not found", id.0))?;
                    split.distance = row.distance;
                    split.cumulative_ms = row.cumulative_ms;
                }
                None => {
                    next_id += 1;
                    splits.push(Split {
                        id: Some(SplitId(next_id)),
                        distance: row.distance,
                        cumulative_ms: row.cumulative_ms,
                    });
                }
            }
        }

        let mut distances: Vec<u32> = splits.iter().map(|s| s.distance).collect();
        distances.sort_unstable();
        if let Some(pair) = distances.windows(2).find(|w| w[0] == w[1]) {
            return Err(format!("duplicate split at {}m", pair[0]));
        }

        self.splits.insert(owner, splits);
        self.next_id = next_id;
        Ok(())
    }

    fn delete_entries(
        &mut self,
        meet: MeetId,
        event: EventNumber,
        fincodes: &[Fincode],
    ) -> Result<(), String> {
        self.results.retain(|r| {
            !(r.meet_id == meet && r.event_number == event && fincodes.contains(&r.fincode))
        });
        Ok(())
    }

    fn insert_entries(&mut self, entries: &[NewEntry]) -> Result<(), String> {
        let mut added: Vec<IndividualResult> = Vec::with_capacity(entries.len());
        let mut next_id = self.next_id;

        for entry in entries {
            let taken = self.results.iter().chain(&added).any(|r| {
                r.meet_id == entry.meet_id
                    && r.event_number == entry.event_number
                    && r.fincode == entry.fincode
            });
            if taken {
                return Err(format!(
                    "athlete {} already entered in event {}",
                    entry.fincode, entry.event_number
                ));
            }
            next_id += 1;
            added.push(IndividualResult {
                id: ResultId(next_id),
                fincode: entry.fincode,
                meet_id: entry.meet_id,
                event_number: entry.event_number,
                time_ms: entry.time_ms(),
                entry_time_ms: Some(entry.entry_time_ms),
                entry_time_result_id: entry.entry_time_result_id,
                status_code: Some(entry.status_code()),
            });
        }

        self.results.extend(added);
        self.next_id = next_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splits::{generate_checkpoints, plan_split_changes, split_sheet, SplitPlan};
    use crate::storage::ApplyError;

    const OWNER: SplitOwner = SplitOwner::Result(ResultId(1));

    #[test]
    fn test_split_plan_apply_then_replan_is_empty() {
        let mut store = MemoryStore::new();
        let checkpoints = generate_checkpoints(100);

        let mut sheet = split_sheet(&checkpoints, &[], Some(58_000));
        sheet[0].cumulative_ms = Some(28_500);
        let plan = plan_split_changes(&checkpoints, &[], &sheet, Some(58_000)).unwrap();
        plan.apply(&mut store, OWNER).unwrap();

        let stored = store.splits_for(OWNER);
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].cumulative_ms, 58_000);

        let sheet = split_sheet(&checkpoints, &stored, Some(58_000));
        let replan = plan_split_changes(&checkpoints, &stored, &sheet, Some(58_000)).unwrap();
        assert!(replan.is_empty());
    }

    #[test]
    fn test_replaying_inserts_hits_uniqueness() {
        let mut store = MemoryStore::new();
        let checkpoints = generate_checkpoints(50);
        let plan = plan_split_changes(&checkpoints, &[], &[], Some(30_000)).unwrap();

        plan.apply(&mut store, OWNER).unwrap();
        assert!(matches!(plan.apply(&mut store, OWNER), Err(ApplyError::Write(_))));
    }

    #[test]
    fn test_clear_plan_removes_all_splits() {
        let mut store = MemoryStore::new();
        let checkpoints = generate_checkpoints(100);
        let sheet = split_sheet(&checkpoints, &[], Some(58_000));
        plan_split_changes(&checkpoints, &[], &sheet, Some(58_000))
            .unwrap()
            .apply(&mut store, OWNER)
            .unwrap();

        SplitPlan::clear(&store.splits_for(OWNER))
            .apply(&mut store, OWNER)
            .unwrap();
        assert!(store.splits_for(OWNER).is_empty());
    }

    #[test]
    fn test_failed_split_batch_writes_nothing() {
        let mut store = MemoryStore::new();
        let rows = vec![
            SplitUpsert {
                id: None,
                distance: 50,
                cumulative_ms: 28_000,
            },
            SplitUpsert {
                id: None,
                distance: 50,
                cumulative_ms: 28_500,
            },
        ];
        assert_eq!(
            store.upsert_splits(OWNER, &rows),
            Err("duplicate split at 50m".to_string())
        );
        assert!(store.splits_for(OWNER).is_empty());

        store.upsert_splits(OWNER, &rows[..1]).unwrap();
        assert_eq!(store.splits_for(OWNER)[0].id, Some(SplitId(1)));
    }

    #[test]
    fn test_failed_entry_batch_writes_nothing() {
        let entry = |fincode: i64| NewEntry {
            meet_id: MeetId(1),
            event_number: EventNumber(3),
            fincode: Fincode(fincode),
            entry_time_ms: 31_000,
            entry_time_result_id: None,
        };
        let mut store = MemoryStore::new();
        assert!(store.insert_entries(&[entry(7), entry(8), entry(7)]).is_err());
        assert!(store.results.is_empty());

        store.insert_entries(&[entry(7), entry(8)]).unwrap();
        let ids: Vec<i64> = store.results.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_update_missing_split_fails() {
        let mut store = MemoryStore::new();
        let rows = vec![SplitUpsert {
            id: Some(SplitId(42)),
            distance: 50,
            cumulative_ms: 1,
        }];
        assert_eq!(
            store.upsert_splits(OWNER, &rows),
            Err("split 42 not found".to_string())
        );
    }
}
