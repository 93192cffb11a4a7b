//! Core types for the location subsystem.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A latitude/longitude pair in degrees.
///
/// Serializes as a `[lat, lon]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", from = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a coordinate from raw dataset values.
    ///
    /// Returns `None` unless both parse to finite numbers within
    /// [-90, 90] and [-180, 180].
    pub fn parse(lat: &RawCoordinate, lon: &RawCoordinate) -> Option<Self> {
        let lat = lat.as_f64()?;
        let lon = lon.as_f64()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self { lat, lon })
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lon]
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.4}°{}, {:.4}°{}", self.lat.abs(), ns, self.lon.abs(), ew)
    }
}

/// A coordinate value as it appears in reference data.
///
/// The countries/states/cities dataset stores coordinates as strings, the
/// override table as numbers, and some rows carry `null`. Any other JSON
/// value is read as `Missing`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawCoordinate {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawCoordinate {
    /// Finite numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Missing => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<serde_json::Value> for RawCoordinate {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Missing, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            _ => Self::Missing,
        }
    }
}

impl<'de> Deserialize<'de> for RawCoordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<f64> for RawCoordinate {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RawCoordinate {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Registration rank. Higher wins when two registrations claim the same
/// name or key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Priority(pub u8);

impl Priority {
    /// Rows from the countries/states/cities hierarchy.
    pub const DATASET: Priority = Priority(1);
    /// Hand-maintained overrides.
    pub const MANUAL: Priority = Priority(2);
}

/// A canonical name with its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateEntry {
    pub name: String,
    pub coords: Coordinate,
    pub priority: Priority,
    #[serde(skip)]
    pub(crate) strict: String,
    #[serde(skip)]
    pub(crate) simple: String,
}

impl CoordinateEntry {
    pub(crate) fn new(name: &str, coords: Coordinate, priority: Priority) -> Self {
        Self {
            name: name.to_string(),
            coords,
            priority,
            strict: super::normalize::strict_key(name),
            simple: super::normalize::simple_key(name),
        }
    }
}

/// Location resolution errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Coordinates not found for location: {0}")]
    NotFound(String),
}
