//! Validated parsing of raw store rows into typed entities.
//!
//! The store returns loosely typed JSON records. Each record type here
//! mirrors the store's column names; conversion into the model types checks
//! the values and fails with [`TimingError::RowShape`] on anything that does
//! not fit.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::TimingError;
use crate::models::{
    Event, EventNumber, Fincode, GroupId, IndividualResult, MeetId, Millis, Race, RaceId, RelayLeg,
    RelayResult, RelayResultId, ResultId, Split, SplitId,
};

const EVENTS: &str = "events";
const RESULTS: &str = "results";
const RELAY_RESULTS: &str = "relay_results";
const SPLITS: &str = "splits";

/// Event row as returned by the meet events query.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub meet_id: i64,
    pub event_numb: i64,
    pub gender: Option<String>,
    pub ms_group_id: Option<i64>,
    #[serde(default)]
    pub group_ids: Option<Vec<i64>>,
    pub race_id: Option<i64>,
    pub distance: Option<i64>,
    pub stroke_short_en: Option<String>,
    pub relay_count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultRecord {
    pub res_id: i64,
    pub fincode: i64,
    pub meet_id: i64,
    pub event_numb: i64,
    pub res_time_decimal: Option<f64>,
    pub entry_time_decimal: Option<f64>,
    pub entry_time_res_id: Option<i64>,
    pub status: Option<i16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayResultRecord {
    pub relay_result_id: i64,
    pub meet_id: i64,
    pub event_numb: i64,
    #[serde(default)]
    pub relay_name: String,
    pub leg1_fincode: i64,
    pub leg1_entry_time: Option<f64>,
    pub leg1_res_time: Option<f64>,
    pub leg2_fincode: i64,
    pub leg2_entry_time: Option<f64>,
    pub leg2_res_time: Option<f64>,
    pub leg3_fincode: i64,
    pub leg3_entry_time: Option<f64>,
    pub leg3_res_time: Option<f64>,
    pub leg4_fincode: i64,
    pub leg4_entry_time: Option<f64>,
    pub leg4_res_time: Option<f64>,
    pub status: Option<i16>,
}

/// Split or relay split row.
#[derive(Debug, Clone, Deserialize)]
pub struct SplitRecord {
    #[serde(alias = "relay_splits_id")]
    pub splits_id: Option<i64>,
    pub distance: i64,
    pub split_time: f64,
}

fn shape(table: &'static str, message: impl Into<String>) -> TimingError {
    TimingError::RowShape {
        table,
        message: message.into(),
    }
}

fn millis(table: &'static str, field: &str, value: Option<f64>) -> Result<Millis, TimingError> {
    let value = value.unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(shape(table, format!("{field} must be a non-negative time, got {value}")));
    }
    Ok(value.round() as Millis)
}

fn event_number(table: &'static str, value: i64) -> Result<EventNumber, TimingError> {
    u32::try_from(value)
        .map(EventNumber)
        .map_err(|_| shape(table, format!("event_numb out of range: {value}")))
}

fn meters(table: &'static str, field: &str, value: i64) -> Result<u32, TimingError> {
    u32::try_from(value).map_err(|_| shape(table, format!("{field} out of range: {value}")))
}

impl TryFrom<EventRecord> for Event {
    type Error = TimingError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let race = match record.race_id {
            Some(race_id) => Some(Race {
                id: RaceId(race_id),
                distance: meters(EVENTS, "distance", record.distance.unwrap_or(0))?,
                stroke: record.stroke_short_en,
                relay_count: meters(EVENTS, "relay_count", record.relay_count.unwrap_or(1))?,
            }),
            None => None,
        };

        let mut group_ids: Vec<GroupId> = record
            .group_ids
            .unwrap_or_default()
            .into_iter()
            .map(GroupId)
            .collect();
        if let Some(group) = record.ms_group_id.map(GroupId) {
            if !group_ids.contains(&group) {
                group_ids.push(group);
            }
        }

        Ok(Event {
            meet_id: MeetId(record.meet_id),
            number: event_number(EVENTS, record.event_numb)?,
            race,
            gender: record.gender,
            group_ids,
        })
    }
}

impl TryFrom<ResultRecord> for IndividualResult {
    type Error = TimingError;

    fn try_from(record: ResultRecord) -> Result<Self, Self::Error> {
        let entry_time_ms = match record.entry_time_decimal {
            Some(t) => Some(millis(RESULTS, "entry_time_decimal", Some(t))?),
            None => None,
        };
        Ok(IndividualResult {
            id: ResultId(record.res_id),
            fincode: Fincode(record.fincode),
            meet_id: MeetId(record.meet_id),
            event_number: event_number(RESULTS, record.event_numb)?,
            time_ms: millis(RESULTS, "res_time_decimal", record.res_time_decimal)?,
            entry_time_ms,
            entry_time_result_id: record.entry_time_res_id.map(ResultId),
            status_code: record.status,
        })
    }
}

impl TryFrom<RelayResultRecord> for RelayResult {
    type Error = TimingError;

    fn try_from(record: RelayResultRecord) -> Result<Self, Self::Error> {
        let leg = |fincode: i64, entry: Option<f64>, time: Option<f64>, n: usize| {
            Ok::<RelayLeg, TimingError>(RelayLeg {
                fincode: Fincode(fincode),
                entry_time_ms: millis(RELAY_RESULTS, &format!("leg{n}_entry_time"), entry)?,
                time_ms: millis(RELAY_RESULTS, &format!("leg{n}_res_time"), time)?,
            })
        };

        Ok(RelayResult {
            id: RelayResultId(record.relay_result_id),
            meet_id: MeetId(record.meet_id),
            event_number: event_number(RELAY_RESULTS, record.event_numb)?,
            legs: [
                leg(record.leg1_fincode, record.leg1_entry_time, record.leg1_res_time, 1)?,
                leg(record.leg2_fincode, record.leg2_entry_time, record.leg2_res_time, 2)?,
                leg(record.leg3_fincode, record.leg3_entry_time, record.leg3_res_time, 3)?,
                leg(record.leg4_fincode, record.leg4_entry_time, record.leg4_res_time, 4)?,
            ],
            name: record.relay_name,
            status_code: record.status,
        })
    }
}

impl TryFrom<SplitRecord> for Split {
    type Error = TimingError;

    fn try_from(record: SplitRecord) -> Result<Self, Self::Error> {
        let distance = meters(SPLITS, "distance", record.distance)?;
        if distance == 0 {
            return Err(shape(SPLITS, "distance must be positive"));
        }
        Ok(Split {
            id: record.splits_id.map(SplitId),
            distance,
            cumulative_ms: millis(SPLITS, "split_time", Some(record.split_time))?,
        })
    }
}

fn parse_rows<R, T>(table: &'static str, json: &str) -> Result<Vec<T>, TimingError>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = TimingError>,
{
    let records: Vec<R> = serde_json::from_str(json).map_err(|e| shape(table, e.to_string()))?;
    records.into_iter().map(T::try_from).collect()
}

pub fn parse_events(json: &str) -> Result<Vec<Event>, TimingError> {
    parse_rows::<EventRecord, Event>(EVENTS, json)
}

pub fn parse_results(json: &str) -> Result<Vec<IndividualResult>, TimingError> {
    parse_rows::<ResultRecord, IndividualResult>(RESULTS, json)
}

pub fn parse_relay_results(json: &str) -> Result<Vec<RelayResult>, TimingError> {
    parse_rows::<RelayResultRecord, RelayResult>(RELAY_RESULTS, json)
}

/// Parse split or relay split rows.
pub fn parse_splits(json: &str) -> Result<Vec<Split>, TimingError> {
    parse_rows::<SplitRecord, Split>(SPLITS, json)
}
