use thiserror::Error;
use tracing::debug;

use crate::models::{EventNumber, Fincode, MeetId, RelayResultId, ResultId, SplitId};
use crate::reconcile::{EntryPlan, NewEntry};
use crate::splits::{SplitPlan, SplitUpsert};

/// Result a set of splits hangs off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SplitOwner {
    Result(ResultId),
    Relay(RelayResultId),
}

/// Write side of the results store.
///
/// Implementations talk to the backing database. The core never calls this
/// on its own; callers hand a store to [`SplitPlan::apply`] or
/// [`EntryPlan::apply`].
///
/// Each call is one batch: it either lands completely or returns an error
/// having changed nothing.
pub trait ResultStore {
    fn delete_splits(&mut self, owner: SplitOwner, ids: &[SplitId]) -> Result<(), String>;
    fn upsert_splits(&mut self, owner: SplitOwner, rows: &[SplitUpsert]) -> Result<(), String>;

    fn delete_entries(
        &mut self,
        meet: MeetId,
        event: EventNumber,
        fincodes: &[Fincode],
    ) -> Result<(), String>;
    fn insert_entries(&mut self, entries: &[NewEntry]) -> Result<(), String>;
}

/// Which phase of a two-phase plan failed. A failed delete leaves the store
/// untouched by the upsert phase.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    #[error("delete phase failed: {0}")]
    Delete(String),

    #[error("write phase failed: {0}")]
    Write(String),
}

impl SplitPlan {
    /// Delete, then upsert.
    pub fn apply<S: ResultStore>(
        &self,
        store: &mut S,
        owner: SplitOwner,
    ) -> Result<(), ApplyError> {
        if !self.delete.is_empty() {
            store
                .delete_splits(owner, &self.delete)
                .map_err(ApplyError::Delete)?;
        }
        if !self.upsert.is_empty() {
            store
                .upsert_splits(owner, &self.upsert)
                .map_err(ApplyError::Write)?;
        }
        debug!(
            ?owner,
            deleted = self.delete.len(),
            upserted = self.upsert.len(),
            "Applied split plan"
        );
        Ok(())
    }
}

impl EntryPlan {
    /// Remove, then add.
    pub fn apply<S: ResultStore>(&self, store: &mut S) -> Result<(), ApplyError> {
        if !self.remove.is_empty() {
            store
                .delete_entries(self.meet_id, self.event_number, &self.remove)
                .map_err(ApplyError::Delete)?;
        }
        if !self.add.is_empty() {
            store.insert_entries(&self.add).map_err(ApplyError::Write)?;
        }
        debug!(
            event = self.event_number.0,
            removed = self.remove.len(),
            added = self.add.len(),
            "Applied entry plan"
        );
        Ok(())
    }
}
