//! Transport modes and their timing models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Handling time added per started transit day on the road.
const ROAD_HOURS_PER_DAY_STOP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransportMode {
    Ocean,
    Air,
    Road,
    Rail,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [Self::Ocean, Self::Air, Self::Road, Self::Rail];

    /// Average line-haul speed in km/h.
    pub fn speed_kmh(self) -> f64 {
        match self {
            Self::Ocean => 40.0,
            Self::Air => 850.0,
            Self::Road => 70.0,
            Self::Rail => 60.0,
        }
    }

    /// Fixed terminal/handling overhead in hours. Road has none; its
    /// overhead scales with the trip (see [`overhead_hours`](Self::overhead_hours)).
    pub fn fixed_overhead_hours(self) -> Option<f64> {
        match self {
            Self::Ocean => Some(48.0),
            Self::Air => Some(12.0),
            Self::Rail => Some(24.0),
            Self::Road => None,
        }
    }

    pub fn contingency_multiplier(self) -> f64 {
        match self {
            Self::Ocean | Self::Rail => 1.15,
            Self::Air | Self::Road => 1.10,
        }
    }

    /// Overhead for a trip of `travel_hours`.
    pub fn overhead_hours(self, travel_hours: f64) -> f64 {
        match self {
            Self::Road => (travel_hours / 24.0).ceil() * ROAD_HOURS_PER_DAY_STOP,
            _ => self.fixed_overhead_hours().unwrap_or(0.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ocean => "OCEAN",
            Self::Air => "AIR",
            Self::Road => "ROAD",
            Self::Rail => "RAIL",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`TransportMode::from_str`] for unknown modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl FromStr for TransportMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OCEAN" => Ok(Self::Ocean),
            "AIR" => Ok(Self::Air),
            "ROAD" => Ok(Self::Road),
            "RAIL" => Ok(Self::Rail),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}
