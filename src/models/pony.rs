//! Pony types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a race or a pony
///
/// The API hands out numeric ids, but string ids are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

/// Identity of a pony
pub type PonyId = EntityId;

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => f.pad(&n.to_string()),
            EntityId::Text(s) => f.pad(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Number(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Text(id.to_string())
    }
}

impl std::str::FromStr for EntityId {
    type Err = std::convert::Infallible;

    /// Numeric input becomes `Number`, anything else stays `Text`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(EntityId::Number)
            .unwrap_or_else(|_| EntityId::Text(s.to_string())))
    }
}

/// Coat color of a pony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PonyColor {
    Blue,
    Green,
    Orange,
    Purple,
    Yellow,
}

impl fmt::Display for PonyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PonyColor::Blue => "blue",
            PonyColor::Green => "green",
            PonyColor::Orange => "orange",
            PonyColor::Purple => "purple",
            PonyColor::Yellow => "yellow",
        };
        f.write_str(name)
    }
}

/// A pony of a race roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pony {
    pub id: PonyId,
    pub name: String,
    pub color: PonyColor,
}

impl Pony {
    pub fn new(id: impl Into<PonyId>, name: impl Into<String>, color: PonyColor) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
        }
    }

    /// Place this pony on the track
    pub fn at(self, position: f64) -> PonyWithPosition {
        PonyWithPosition {
            pony: self,
            position,
            boosted: false,
        }
    }
}

/// A pony with its position on the track
///
/// Every streamed update carries fresh values; they replace the previous
/// ones for the same pony id rather than being merged into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PonyWithPosition {
    #[serde(flatten)]
    pub pony: Pony,
    /// Progress on a 0-100 scale, may briefly exceed 100
    pub position: f64,
    #[serde(default)]
    pub boosted: bool,
}

impl PonyWithPosition {
    pub fn id(&self) -> &PonyId {
        &self.pony.id
    }

    /// Builder method: mark as boosted
    pub fn boosted(mut self) -> Self {
        self.boosted = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_accepts_numbers_and_strings() {
        let numeric: EntityId = serde_json::from_str("12").unwrap();
        assert_eq!(numeric, EntityId::Number(12));

        let text: EntityId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(text, EntityId::Text("abc".to_string()));

        assert_eq!("7".parse::<EntityId>().unwrap(), EntityId::Number(7));
        assert_eq!("x7".parse::<EntityId>().unwrap().to_string(), "x7");
    }

    #[test]
    fn test_pony_with_position_wire_shape() {
        let json = r#"{"id":1,"name":"Gentle Pie","color":"YELLOW","position":50}"#;
        let pony: PonyWithPosition = serde_json::from_str(json).unwrap();

        assert_eq!(pony.id(), &EntityId::Number(1));
        assert_eq!(pony.pony.color, PonyColor::Yellow);
        assert_eq!(pony.position, 50.0);
        assert!(!pony.boosted);
    }
}
