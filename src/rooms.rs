use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// The rooms offered by the B&B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoomId {
    Sun,
    Moon,
    Earth,
}

impl RoomId {
    pub const ALL: [RoomId; 3] = [RoomId::Sun, RoomId::Moon, RoomId::Earth];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomId::Sun => "sun",
            RoomId::Moon => "moon",
            RoomId::Earth => "earth",
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoomId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sun" => Ok(RoomId::Sun),
            "moon" => Ok(RoomId::Moon),
            "earth" => Ok(RoomId::Earth),
            _ => Err(format!("Invalid room id: {}", s)),
        }
    }
}
