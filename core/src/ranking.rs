//! Ordering of results and entries within one event.
//!
//! All sorts are stable: rows that tie on every key keep their input order.
//! Ranks are 1-based positions in the sorted order; equal times do not share
//! a rank.

use std::cmp::Reverse;

use crate::models::{IndividualResult, RelayResult};
use crate::status::ENTRY_STATUS;

/// A row with its position in an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: u32,
    pub item: T,
}

fn assign_ranks<T>(items: Vec<T>) -> Vec<Ranked<T>> {
    items
        .into_iter()
        .zip(1u32..)
        .map(|(item, rank)| Ranked { rank, item })
        .collect()
}

/// Strip ranks, keeping the order.
pub fn into_items<T>(ranked: Vec<Ranked<T>>) -> Vec<T> {
    ranked.into_iter().map(|r| r.item).collect()
}

/// Rank individual results: status code descending, then time ascending.
///
/// Finished (4) comes before DNS (3), DNF (2), DSQ (1) and a missing code,
/// so a non-finished result never interleaves with finished times.
pub fn rank_results<I>(results: I) -> Vec<Ranked<IndividualResult>>
where
    I: IntoIterator<Item = IndividualResult>,
{
    let mut results: Vec<IndividualResult> = results.into_iter().collect();
    results.sort_by_key(|r| (Reverse(r.status_code.unwrap_or(ENTRY_STATUS)), r.time_ms));
    assign_ranks(results)
}

/// Rank entries by declared entry time ascending. Entries without an entry
/// time count as zero.
pub fn rank_entries<I>(entries: I) -> Vec<Ranked<IndividualResult>>
where
    I: IntoIterator<Item = IndividualResult>,
{
    let mut entries: Vec<IndividualResult> = entries.into_iter().collect();
    entries.sort_by_key(|r| r.entry_time_ms.unwrap_or(0));
    assign_ranks(entries)
}

/// Rank relay results by summed leg time ascending.
///
/// Status is not part of the key: a DSQ/DNF/DNS team with zero legs sums to
/// zero and ranks first.
pub fn rank_relay_results<I>(relays: I) -> Vec<Ranked<RelayResult>>
where
    I: IntoIterator<Item = RelayResult>,
{
    let mut relays: Vec<RelayResult> = relays.into_iter().collect();
    relays.sort_by_key(|r| r.total_time());
    assign_ranks(relays)
}

/// Rank relay entries by summed leg entry time ascending.
pub fn rank_relay_entries<I>(relays: I) -> Vec<Ranked<RelayResult>>
where
    I: IntoIterator<Item = RelayResult>,
{
    let mut relays: Vec<RelayResult> = relays.into_iter().collect();
    relays.sort_by_key(|r| r.entry_total());
    assign_ranks(relays)
}
