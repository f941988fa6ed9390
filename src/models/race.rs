//! Race types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::pony::{EntityId, Pony, PonyId, PonyWithPosition};

/// Identity of a race
pub type RaceId = EntityId;

/// Lifecycle of a race
///
/// Ordered: a race only ever moves forward, `Pending < Running < Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RaceStatus {
    Pending,
    Running,
    Finished,
}

impl RaceStatus {
    /// Value expected by the `status` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceStatus::Pending => "PENDING",
            RaceStatus::Running => "RUNNING",
            RaceStatus::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RaceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RaceStatus::Pending),
            "RUNNING" => Ok(RaceStatus::Running),
            "FINISHED" => Ok(RaceStatus::Finished),
            other => Err(format!("unknown race status: {}", other)),
        }
    }
}

/// A race snapshot as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: RaceId,
    pub name: String,
    pub ponies: Vec<Pony>,
    pub start_instant: DateTime<Utc>,
    /// Pony the current user bet on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet_pony_id: Option<PonyId>,
    #[serde(default = "default_status")]
    pub status: RaceStatus,
}

fn default_status() -> RaceStatus {
    RaceStatus::Pending
}

impl Race {
    /// Streaming channel carrying the live updates of this race
    pub fn channel(&self) -> String {
        race_channel(&self.id)
    }
}

/// Channel name for the live updates of a race
pub fn race_channel(race_id: &RaceId) -> String {
    format!("/race/{}", race_id)
}

/// A streamed, full replacement of the live state of a race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveRaceUpdate {
    pub ponies: Vec<PonyWithPosition>,
    pub status: RaceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PonyColor;

    #[test]
    fn test_race_wire_shape() {
        let json = r#"{
            "id": 12,
            "name": "Paris",
            "ponies": [{"id": 1, "name": "Gentle Pie", "color": "YELLOW"}],
            "startInstant": "2020-02-18T08:02:00Z",
            "betPonyId": 1,
            "status": "RUNNING"
        }"#;
        let race: Race = serde_json::from_str(json).unwrap();

        assert_eq!(race.id, EntityId::Number(12));
        assert_eq!(race.ponies[0].color, PonyColor::Yellow);
        assert_eq!(race.bet_pony_id, Some(EntityId::Number(1)));
        assert_eq!(race.status, RaceStatus::Running);
        assert_eq!(race.channel(), "/race/12");
    }

    #[test]
    fn test_race_without_bet_or_status() {
        let json = r#"{"id": 3, "name": "Lyon", "ponies": [], "startInstant": "2020-02-18T08:02:00Z"}"#;
        let race: Race = serde_json::from_str(json).unwrap();

        assert_eq!(race.bet_pony_id, None);
        assert_eq!(race.status, RaceStatus::Pending);
    }

    #[test]
    fn test_status_order_is_monotonic() {
        assert!(RaceStatus::Pending < RaceStatus::Running);
        assert!(RaceStatus::Running < RaceStatus::Finished);
        assert_eq!("finished".parse::<RaceStatus>().unwrap(), RaceStatus::Finished);
        assert!("done".parse::<RaceStatus>().is_err());
    }
}
