pub mod config;
pub mod duration;
pub mod error;
pub mod ffi;
pub mod memory_store;
pub mod models;
pub mod ranking;
pub mod reconcile;
pub mod relay;
pub mod rows;
pub mod splits;
pub mod status;
pub mod storage;

uniffi::setup_scaffolding!();

pub use config::{TimingConfig, UnevenDistance};
pub use duration::{format_duration, parse_display_duration, parse_race_clock_code};
pub use error::TimingError;
pub use memory_store::MemoryStore;
pub use models::{
    Course, Event, EventNumber, Fincode, GroupId, IndividualResult, MeetId, Millis, Race, RaceId,
    RelayLeg, RelayResult, RelayResultId, RelaySplit, ResultId, Split, SplitId,
};
pub use ranking::{rank_entries, rank_relay_entries, rank_relay_results, rank_results, Ranked};
pub use reconcile::{
    count_meet_stats, entries_view, plan_entry_changes, results_view, EntryPlan, EventSection,
    MeetStats, ViewScope,
};
pub use splits::{generate_checkpoints, lap_times, plan_split_changes, SplitPlan};
pub use status::ResultStatus;
pub use storage::{ApplyError, ResultStore, SplitOwner};
