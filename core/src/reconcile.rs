//! Grouping of raw result rows into per-event entry and result views.
//!
//! Rows with status code 0 are entries (declared, not yet competed). Every
//! other row, including one with no status code, is a result. Events are
//! only shown in a view when at least one row of that view belongs to them.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, warn};

use crate::error::TimingError;
use crate::models::{
    Event, EventNumber, Fincode, GroupId, IndividualResult, MeetId, Millis, RelayResult, ResultId,
};
use crate::ranking::{rank_entries, rank_relay_entries, rank_relay_results, rank_results, Ranked};
use crate::status::ENTRY_STATUS;

/// A row that belongs to one event of one meet.
pub trait EventRow {
    fn meet_id(&self) -> MeetId;
    fn event_number(&self) -> EventNumber;
    fn status_code(&self) -> Option<i16>;

    fn is_entry_row(&self) -> bool {
        self.status_code() == Some(ENTRY_STATUS)
    }
}

impl EventRow for IndividualResult {
    fn meet_id(&self) -> MeetId {
        self.meet_id
    }

    fn event_number(&self) -> EventNumber {
        self.event_number
    }

    fn status_code(&self) -> Option<i16> {
        self.status_code
    }
}

impl EventRow for RelayResult {
    fn meet_id(&self) -> MeetId {
        self.meet_id
    }

    fn event_number(&self) -> EventNumber {
        self.event_number
    }

    fn status_code(&self) -> Option<i16> {
        self.status_code
    }
}

/// Group rows by event number, keeping input order within each event.
pub fn partition_by_event<T, I>(rows: I) -> BTreeMap<EventNumber, Vec<T>>
where
    T: EventRow,
    I: IntoIterator<Item = T>,
{
    let mut by_event: BTreeMap<EventNumber, Vec<T>> = BTreeMap::new();
    for row in rows {
        by_event.entry(row.event_number()).or_default().push(row);
    }
    by_event
}

/// Separate entry rows (status 0) from result rows (anything else).
pub fn split_entries_vs_results<T, I>(rows: I) -> (Vec<T>, Vec<T>)
where
    T: EventRow,
    I: IntoIterator<Item = T>,
{
    rows.into_iter().partition(|row| row.is_entry_row())
}

/// Headline counts for a meet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeetStats {
    pub events_count: usize,
    pub entries_count: usize,
    pub results_count: usize,
}

/// Count scheduled events, entries and results of a meet. Rows with no
/// status code count as neither.
pub fn count_meet_stats(
    events: &[Event],
    results: &[IndividualResult],
    relays: &[RelayResult],
) -> MeetStats {
    let events_count = events
        .iter()
        .map(|e| (e.meet_id, e.number))
        .collect::<HashSet<_>>()
        .len();

    let codes = results
        .iter()
        .map(|r| r.status_code)
        .chain(relays.iter().map(|r| r.status_code));

    let mut stats = MeetStats {
        events_count,
        ..MeetStats::default()
    };
    for code in codes {
        match code {
            Some(ENTRY_STATUS) => stats.entries_count += 1,
            Some(_) => stats.results_count += 1,
            None => {}
        }
    }
    stats
}

/// Rows of every status per event, as shown next to each event in the
/// event list.
pub fn event_entry_counts(
    results: &[IndividualResult],
    relays: &[RelayResult],
) -> BTreeMap<EventNumber, usize> {
    let mut counts: BTreeMap<EventNumber, usize> = BTreeMap::new();
    let numbers = results
        .iter()
        .map(|r| r.event_number)
        .chain(relays.iter().map(|r| r.event_number));
    for number in numbers {
        *counts.entry(number).or_default() += 1;
    }
    counts
}

/// Which meet (and optionally which group) a view is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewScope {
    pub meet: MeetId,
    pub group: Option<GroupId>,
}

impl ViewScope {
    pub fn meet(meet: MeetId) -> Self {
        Self { meet, group: None }
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    fn includes_event(&self, event: &Event) -> bool {
        event.meet_id == self.meet && self.group.map_or(true, |g| event.group_ids.contains(&g))
    }
}

/// Rows of one view grouped by event.
#[derive(Debug, Clone, Default)]
pub struct ResultsIndex {
    individual: BTreeMap<EventNumber, Vec<IndividualResult>>,
    relay: BTreeMap<EventNumber, Vec<RelayResult>>,
}

impl ResultsIndex {
    pub fn build<R, L>(results: R, relays: L) -> Self
    where
        R: IntoIterator<Item = IndividualResult>,
        L: IntoIterator<Item = RelayResult>,
    {
        Self {
            individual: partition_by_event(results),
            relay: partition_by_event(relays),
        }
    }

    /// Individual and relay rows for an event.
    pub fn row_count(&self, number: EventNumber) -> usize {
        self.individual.get(&number).map_or(0, Vec::len)
            + self.relay.get(&number).map_or(0, Vec::len)
    }

    fn take_individual(&mut self, number: EventNumber) -> Vec<IndividualResult> {
        self.individual.remove(&number).unwrap_or_default()
    }

    fn take_relay(&mut self, number: EventNumber) -> Vec<RelayResult> {
        self.relay.remove(&number).unwrap_or_default()
    }
}

/// Whether an event has anything to show in a view.
pub fn is_event_shown(event: &Event, index: &ResultsIndex) -> bool {
    index.row_count(event.number) > 0
}

/// Ranked rows of one event.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionRows {
    Individual(Vec<Ranked<IndividualResult>>),
    Relay(Vec<Ranked<RelayResult>>),
}

impl SectionRows {
    pub fn len(&self) -> usize {
        match self {
            SectionRows::Individual(rows) => rows.len(),
            SectionRows::Relay(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One event of a results or entries view.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSection {
    pub event: Event,
    pub rows: SectionRows,
}

impl EventSection {
    pub fn is_relay(&self) -> bool {
        matches!(self.rows, SectionRows::Relay(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewKind {
    Results,
    Entries,
}

/// Per-event ranked results (rows whose status is not 0).
pub fn results_view(
    scope: ViewScope,
    events: &[Event],
    results: &[IndividualResult],
    relays: &[RelayResult],
) -> Vec<EventSection> {
    build_view(ViewKind::Results, scope, events, results, relays)
}

/// Per-event entries (status 0) ordered by entry time.
pub fn entries_view(
    scope: ViewScope,
    events: &[Event],
    results: &[IndividualResult],
    relays: &[RelayResult],
) -> Vec<EventSection> {
    build_view(ViewKind::Entries, scope, events, results, relays)
}

/// Find the event a row belongs to.
pub fn lookup_event(
    events: &[Event],
    meet: MeetId,
    number: EventNumber,
) -> Result<&Event, TimingError> {
    events
        .iter()
        .find(|e| e.meet_id == meet && e.number == number)
        .ok_or(TimingError::EventNotFound(number))
}

fn scoped_rows<T>(kind: ViewKind, scope: &ViewScope, events: &[Event], rows: &[T]) -> Vec<T>
where
    T: EventRow + Clone,
{
    rows.iter()
        .filter(|row| {
            if row.meet_id() != scope.meet {
                return false;
            }
            if row.is_entry_row() != (kind == ViewKind::Entries) {
                return false;
            }
            match lookup_event(events, scope.meet, row.event_number()) {
                Ok(_) => true,
                Err(err) => {
                    warn!(error = %err, meet = scope.meet.0, "Excluding row from view");
                    false
                }
            }
        })
        .cloned()
        .collect()
}

fn build_view(
    kind: ViewKind,
    scope: ViewScope,
    events: &[Event],
    results: &[IndividualResult],
    relays: &[RelayResult],
) -> Vec<EventSection> {
    let mut index = ResultsIndex::build(
        scoped_rows(kind, &scope, events, results),
        scoped_rows(kind, &scope, events, relays),
    );

    let mut scheduled: Vec<&Event> = events.iter().filter(|e| scope.includes_event(e)).collect();
    scheduled.sort_by_key(|e| e.number);

    let mut sections = Vec::new();
    for event in scheduled {
        if !is_event_shown(event, &index) {
            continue;
        }

        let individual = index.take_individual(event.number);
        let relay = index.take_relay(event.number);
        let (rows, ignored) = if event.is_relay() {
            let ranked = match kind {
                ViewKind::Results => rank_relay_results(relay),
                ViewKind::Entries => rank_relay_entries(relay),
            };
            (SectionRows::Relay(ranked), individual.len())
        } else {
            let ranked = match kind {
                ViewKind::Results => rank_results(individual),
                ViewKind::Entries => rank_entries(individual),
            };
            (SectionRows::Individual(ranked), relay.len())
        };

        if ignored > 0 {
            warn!(
                event = event.number.0,
                ignored, "Rows do not match the event's relay setting"
            );
        }
        if rows.is_empty() {
            continue;
        }
        sections.push(EventSection {
            event: event.clone(),
            rows,
        });
    }

    debug!(?kind, sections = sections.len(), "Built event view");
    sections
}

/// Athletes currently holding a row (entry or result) in an event.
pub fn current_entrants(
    results: &[IndividualResult],
    meet: MeetId,
    number: EventNumber,
) -> BTreeSet<Fincode> {
    results
        .iter()
        .filter(|r| r.meet_id == meet && r.event_number == number)
        .map(|r| r.fincode)
        .collect()
}

/// An athlete the event is open to, with the personal best used as entry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleAthlete {
    pub fincode: Fincode,
    pub personal_best_ms: Option<Millis>,
    pub personal_best_result_id: Option<ResultId>,
}

/// Entry row to insert: no final time, status 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub meet_id: MeetId,
    pub event_number: EventNumber,
    pub fincode: Fincode,
    pub entry_time_ms: Millis,
    pub entry_time_result_id: Option<ResultId>,
}

impl NewEntry {
    pub fn time_ms(&self) -> Millis {
        0
    }

    pub fn status_code(&self) -> i16 {
        ENTRY_STATUS
    }
}

/// Two-phase change set for the entrants of one event: remove first, then
/// add, so (event, athlete) stays unique throughout.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPlan {
    pub meet_id: MeetId,
    pub event_number: EventNumber,
    pub remove: Vec<Fincode>,
    pub add: Vec<NewEntry>,
    /// Desired athletes left out because they are not eligible.
    pub skipped: Vec<TimingError>,
}

impl EntryPlan {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Reconcile the athletes selected for an event against those already in it.
///
/// Relay events are entered per team and are refused here.
pub fn plan_entry_changes(
    event: &Event,
    desired: &BTreeSet<Fincode>,
    current: &BTreeSet<Fincode>,
    eligible: &[EligibleAthlete],
) -> Result<EntryPlan, TimingError> {
    if event.is_relay() {
        return Err(TimingError::RelayEvent(event.number));
    }

    let remove: Vec<Fincode> = current.difference(desired).copied().collect();
    let mut add = Vec::new();
    let mut skipped = Vec::new();

    for &fincode in desired.difference(current) {
        match eligible.iter().find(|a| a.fincode == fincode) {
            Some(athlete) => add.push(NewEntry {
                meet_id: event.meet_id,
                event_number: event.number,
                fincode,
                entry_time_ms: athlete.personal_best_ms.unwrap_or(0),
                entry_time_result_id: athlete.personal_best_result_id,
            }),
            None => {
                warn!(
                    fincode = fincode.0,
                    event = event.number.0,
                    "Athlete not eligible, skipping entry"
                );
                skipped.push(TimingError::AthleteNotFound(fincode));
            }
        }
    }

    debug!(
        event = event.number.0,
        remove = remove.len(),
        add = add.len(),
        skipped = skipped.len(),
        "Planned entry changes"
    );
    Ok(EntryPlan {
        meet_id: event.meet_id,
        event_number: event.number,
        remove,
        add,
        skipped,
    })
}
