use std::collections::BTreeSet;

use swimmeet_timing::reconcile::{
    current_entrants, event_entry_counts, EligibleAthlete, SectionRows,
};
use swimmeet_timing::rows::{parse_events, parse_relay_results, parse_results, parse_splits};
use swimmeet_timing::splits::result_split_sheet;
use swimmeet_timing::status::{record_outcome, ResultStatus};
use swimmeet_timing::{
    count_meet_stats, entries_view, format_duration, generate_checkpoints, plan_entry_changes,
    plan_split_changes, results_view, EventNumber, Fincode, MeetId, MemoryStore, ResultId,
    ResultStore, SplitOwner, SplitPlan, ViewScope,
};

const EVENTS: &str = r#"[
    {"meet_id": 7, "event_numb": 2, "gender": "M", "ms_group_id": 1,
     "race_id": 11, "distance": 100, "stroke_short_en": "FR", "relay_count": 1},
    {"meet_id": 7, "event_numb": 1, "gender": "F", "ms_group_id": 1,
     "race_id": 12, "distance": 50, "stroke_short_en": "BK", "relay_count": 1},
    {"meet_id": 7, "event_numb": 3, "gender": "X", "ms_group_id": 2,
     "race_id": 13, "distance": 50, "stroke_short_en": "FR", "relay_count": 4}
]"#;

const RESULTS: &str = r#"[
    {"res_id": 1, "fincode": 101, "meet_id": 7, "event_numb": 2,
     "res_time_decimal": 61000, "entry_time_decimal": 60500,
     "entry_time_res_id": null, "status": 4},
    {"res_id": 2, "fincode": 102, "meet_id": 7, "event_numb": 2,
     "res_time_decimal": 0, "entry_time_decimal": 59000, "entry_time_res_id": null, "status": 1},
    {"res_id": 3, "fincode": 103, "meet_id": 7, "event_numb": 2,
     "res_time_decimal": 58750, "entry_time_decimal": 59900,
     "entry_time_res_id": null, "status": 4},
    {"res_id": 4, "fincode": 201, "meet_id": 7, "event_numb": 1,
     "res_time_decimal": 0, "entry_time_decimal": 33000, "entry_time_res_id": null, "status": 0},
    {"res_id": 5, "fincode": 202, "meet_id": 7, "event_numb": 1,
     "res_time_decimal": 0, "entry_time_decimal": 31500, "entry_time_res_id": 90, "status": 0},
    {"res_id": 6, "fincode": 203, "meet_id": 7, "event_numb": 9,
     "res_time_decimal": 30000, "entry_time_decimal": null, "entry_time_res_id": null, "status": 4}
]"#;

const RELAYS: &str = r#"[
    {"relay_result_id": 1, "meet_id": 7, "event_numb": 3, "relay_name": "Team A",
     "leg1_fincode": 101, "leg1_entry_time": 30000, "leg1_res_time": 29000,
     "leg2_fincode": 102, "leg2_entry_time": 30000, "leg2_res_time": 29500,
     "leg3_fincode": 201, "leg3_entry_time": 30000, "leg3_res_time": 31000,
     "leg4_fincode": 202, "leg4_entry_time": 30000, "leg4_res_time": 30500,
     "status": 4}
]"#;

const SPLITS: &str = r#"[
    {"splits_id": 40, "distance": 50, "split_time": 28100},
    {"splits_id": 41, "distance": 100, "split_time": 58750}
]"#;

#[test]
fn test_views_from_store_rows() {
    let events = parse_events(EVENTS).unwrap();
    let results = parse_results(RESULTS).unwrap();
    let relays = parse_relay_results(RELAYS).unwrap();
    let scope = ViewScope::meet(MeetId(7));

    let results_sections = results_view(scope, &events, &results, &relays);
    let numbers: Vec<u32> = results_sections.iter().map(|s| s.event.number.0).collect();
    assert_eq!(numbers, vec![2, 3]);

    match &results_sections[0].rows {
        SectionRows::Individual(rows) => {
            let order: Vec<i64> = rows.iter().map(|r| r.item.fincode.0).collect();
            assert_eq!(order, vec![103, 101, 102]);
            assert_eq!(rows[0].rank, 1);
            assert_eq!(format_duration(rows[0].item.time_ms), "00:58.75");
        }
        other => panic!("expected individual rows, got {:?}", other),
    }
    match &results_sections[1].rows {
        SectionRows::Relay(rows) => assert_eq!(rows[0].item.total_time(), 120_000),
        other => panic!("expected relay rows, got {:?}", other),
    }

    let entry_sections = entries_view(scope, &events, &results, &relays);
    assert_eq!(entry_sections.len(), 1);
    match &entry_sections[0].rows {
        SectionRows::Individual(rows) => {
            let order: Vec<i64> = rows.iter().map(|r| r.item.fincode.0).collect();
            assert_eq!(order, vec![202, 201]);
        }
        other => panic!("expected individual rows, got {:?}", other),
    }

    let stats = count_meet_stats(&events, &results, &relays);
    assert_eq!(stats.events_count, 3);
    assert_eq!(stats.entries_count, 2);
    assert_eq!(stats.results_count, 5);

    let counts = event_entry_counts(&results, &relays);
    assert_eq!(counts.get(&EventNumber(2)), Some(&3));
    assert_eq!(counts.get(&EventNumber(3)), Some(&1));
}

#[test]
fn test_entry_plan_round_trip_through_store() {
    let events = parse_events(EVENTS).unwrap();
    let results = parse_results(RESULTS).unwrap();
    let event = events.iter().find(|e| e.number == EventNumber(1)).unwrap();
    let mut store = MemoryStore::with_results(results);

    let current = current_entrants(&store.results, MeetId(7), EventNumber(1));
    let desired: BTreeSet<Fincode> =
        [Fincode(202), Fincode(204), Fincode(999)].into_iter().collect();
    let eligible = vec![EligibleAthlete {
        fincode: Fincode(204),
        personal_best_ms: Some(32_400),
        personal_best_result_id: Some(ResultId(77)),
    }];

    let plan = plan_entry_changes(event, &desired, &current, &eligible).unwrap();
    assert_eq!(plan.remove, vec![Fincode(201)]);
    assert_eq!(plan.add.len(), 1);
    assert_eq!(plan.skipped.len(), 1);
    plan.apply(&mut store).unwrap();

    let current = current_entrants(&store.results, MeetId(7), EventNumber(1));
    assert_eq!(current, [Fincode(202), Fincode(204)].into_iter().collect());
    let added = store.results.iter().find(|r| r.fincode == Fincode(204)).unwrap();
    assert!(added.is_entry());
    assert_eq!(added.entry_time_ms, Some(32_400));

    let replan = plan_entry_changes(event, &desired, &current, &eligible).unwrap();
    assert!(replan.is_empty());
}

#[test]
fn test_split_edit_round_trip_through_store() {
    let owner = SplitOwner::Result(ResultId(3));
    let mut store = MemoryStore::new();
    let stored = parse_splits(SPLITS).unwrap();
    let rows: Vec<_> = stored
        .iter()
        .map(|s| swimmeet_timing::splits::SplitUpsert {
            id: None,
            distance: s.distance,
            cumulative_ms: s.cumulative_ms,
        })
        .collect();
    store.upsert_splits(owner, &rows).unwrap();

    let existing = store.splits_for(owner);
    let outcome = record_outcome(ResultStatus::Finished, "005870").unwrap();
    assert!(outcome.keeps_splits);

    let sheet = result_split_sheet(100, &existing, outcome.time_ms);
    let sheet: Vec<_> = sheet
        .into_iter()
        .map(|slot| {
            if slot.distance == 50 {
                slot.with_input("00:28.40").unwrap()
            } else {
                slot
            }
        })
        .collect();

    let checkpoints = generate_checkpoints(100);
    let final_ms = Some(outcome.time_ms);
    let plan = plan_split_changes(&checkpoints, &existing, &sheet, final_ms).unwrap();
    assert!(plan.delete.is_empty());
    assert_eq!(plan.upsert.len(), 2);
    plan.apply(&mut store, owner).unwrap();

    let existing = store.splits_for(owner);
    let times: Vec<u64> = existing.iter().map(|s| s.cumulative_ms).collect();
    assert_eq!(times, vec![28_400, 58_700]);

    let dsq = record_outcome(ResultStatus::Disqualified, "").unwrap();
    assert!(!dsq.keeps_splits);
    SplitPlan::clear(&existing).apply(&mut store, owner).unwrap();
    assert!(store.splits_for(owner).is_empty());
}
