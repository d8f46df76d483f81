use std::fmt;

use crate::status::{ResultStatus, ENTRY_STATUS};

/// Milliseconds. Canonical unit for every race time.
pub type Millis = u64;

/// Number of legs in a relay team.
pub const RELAY_LEGS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeetId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventNumber(pub u32);

/// Athlete registration code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fincode(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelayResultId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SplitId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RaceId(pub i64);

impl fmt::Display for EventNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Fincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pool length of a meet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Course {
    /// 50m pool
    Long,
    /// 25m pool
    Short,
}

impl Course {
    /// Store code `1` is long course; every other code is short course.
    pub fn from_code(code: i32) -> Self {
        if code == 1 {
            Course::Long
        } else {
            Course::Short
        }
    }

    pub fn pool_length_m(&self) -> u32 {
        match self {
            Course::Long => 50,
            Course::Short => 25,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Course::Long => "50m",
            Course::Short => "25m",
        }
    }
}

/// Race definition attached to an event.
#[derive(Clone, Debug, PartialEq)]
pub struct Race {
    pub id: RaceId,
    /// Distance in meters. For relays this is the distance of one leg.
    pub distance: u32,
    pub stroke: Option<String>,
    pub relay_count: u32,
}

/// One scheduled race within a meet.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub meet_id: MeetId,
    pub number: EventNumber,
    pub race: Option<Race>,
    pub gender: Option<String>,
    pub group_ids: Vec<GroupId>,
}

impl Event {
    pub fn is_relay(&self) -> bool {
        self.race.as_ref().is_some_and(|r| r.relay_count > 1)
    }

    pub fn distance(&self) -> Option<u32> {
        self.race.as_ref().map(|r| r.distance)
    }

    pub fn relay_count(&self) -> Option<u32> {
        self.race.as_ref().map(|r| r.relay_count)
    }
}

/// One athlete in one event of one meet, either an entry or a result.
#[derive(Clone, Debug, PartialEq)]
pub struct IndividualResult {
    pub id: ResultId,
    pub fincode: Fincode,
    pub meet_id: MeetId,
    pub event_number: EventNumber,
    /// Final time, 0 until recorded.
    pub time_ms: Millis,
    pub entry_time_ms: Option<Millis>,
    /// Result the entry time was taken from (personal best).
    pub entry_time_result_id: Option<ResultId>,
    /// Raw store status: 0 entry, 1 DSQ, 2 DNF, 3 DNS, 4 finished.
    pub status_code: Option<i16>,
}

impl IndividualResult {
    pub fn is_entry(&self) -> bool {
        self.status_code == Some(ENTRY_STATUS)
    }

    pub fn status(&self) -> ResultStatus {
        ResultStatus::classify(self.status_code)
    }
}

/// One leg of a relay team.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayLeg {
    pub fincode: Fincode,
    pub entry_time_ms: Millis,
    pub time_ms: Millis,
}

/// A relay team in one event of one meet.
#[derive(Clone, Debug, PartialEq)]
pub struct RelayResult {
    pub id: RelayResultId,
    pub meet_id: MeetId,
    pub event_number: EventNumber,
    pub name: String,
    pub legs: [RelayLeg; RELAY_LEGS],
    pub status_code: Option<i16>,
}

impl RelayResult {
    pub fn is_entry(&self) -> bool {
        self.status_code == Some(ENTRY_STATUS)
    }

    pub fn status(&self) -> ResultStatus {
        ResultStatus::classify(self.status_code)
    }

    pub fn leg_times(&self) -> [Millis; RELAY_LEGS] {
        self.legs.map(|leg| leg.time_ms)
    }

    pub fn leg_entry_times(&self) -> [Millis; RELAY_LEGS] {
        self.legs.map(|leg| leg.entry_time_ms)
    }
}

/// Cumulative time at a checkpoint. Relay splits use the same shape with the
/// distance counted across all legs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Split {
    pub id: Option<SplitId>,
    pub distance: u32,
    pub cumulative_ms: Millis,
}

pub type RelaySplit = Split;

#[cfg(test)]
mod tests {
    use super::*;

    fn relay_event(relay_count: u32) -> Event {
        Event {
            meet_id: MeetId(1),
            number: EventNumber(7),
            race: Some(Race {
                id: RaceId(12),
                distance: 50,
                stroke: Some("FR".to_string()),
                relay_count,
            }),
            gender: None,
            group_ids: vec![],
        }
    }

    #[test]
    fn test_course() {
        assert_eq!(Course::from_code(1), Course::Long);
        assert_eq!(Course::from_code(2), Course::Short);
        assert_eq!(Course::from_code(0), Course::Short);
        assert_eq!(Course::Long.pool_length_m(), 50);
        assert_eq!(Course::Short.label(), "25m");
    }

    #[test]
    fn test_event_is_relay() {
        assert!(relay_event(4).is_relay());
        assert!(!relay_event(1).is_relay());

        let mut event = relay_event(4);
        event.race = None;
        assert!(!event.is_relay());
        assert_eq!(event.distance(), None);
    }

    #[test]
    fn test_entry_detection() {
        let mut result = IndividualResult {
            id: ResultId(1),
            fincode: Fincode(100),
            meet_id: MeetId(1),
            event_number: EventNumber(1),
            time_ms: 0,
            entry_time_ms: Some(65_000),
            entry_time_result_id: None,
            status_code: Some(0),
        };
        assert!(result.is_entry());

        result.status_code = None;
        assert!(!result.is_entry());
        assert_eq!(result.status(), ResultStatus::Finished);
    }
}
