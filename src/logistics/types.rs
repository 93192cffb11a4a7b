//! Request, result and error types for duration estimation.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::location::{Coordinate, LocationError};

/// Input to every estimator operation.
///
/// Field names follow the JSON payload (`transportationMode`, `distanceKm`,
/// ...). `distance_km` is accepted as an alias for `distanceKm`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(default)]
    pub transportation_mode: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// Non-numeric values are treated as absent.
    #[serde(default, alias = "distance_km", deserialize_with = "lenient_distance")]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
}

fn lenient_distance<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|d| d.is_finite()))
}

impl EstimateRequest {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            transportation_mode: Some(mode.into()),
            ..Self::default()
        }
    }

    pub fn with_route(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self.destination = Some(destination.into());
        self
    }

    pub fn with_distance(mut self, km: f64) -> Self {
        self.distance_km = Some(km);
        self
    }

    pub fn with_start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Parse an arbitrary JSON payload.
    pub fn from_value(value: serde_json::Value) -> Result<Self, EstimateError> {
        if !value.is_object() {
            return Err(EstimateError::InvalidInput("Input payload must be an object.".into()));
        }
        serde_json::from_value(value).map_err(|e| EstimateError::InvalidInput(format!("Invalid estimate request: {}", e)))
    }

    /// Caller-provided distance, if it is usable.
    pub fn provided_distance(&self) -> Option<f64> {
        self.distance_km.filter(|d| *d > 0.0)
    }

    pub(crate) fn route(&self) -> Option<(&str, &str)> {
        let origin = self.origin.as_deref().filter(|s| !s.trim().is_empty())?;
        let destination = self.destination.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((origin, destination))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceSource {
    Provided,
    Calculated,
}

/// Route distance plus the path it was measured along.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDistance {
    pub total_km: f64,
    pub source: DistanceSource,
    pub path: Option<Vec<Coordinate>>,
}

/// Full breakdown of a duration estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationDetails {
    pub total_distance_km: f64,
    pub travel_hours: f64,
    pub overhead_hours: f64,
    pub contingency_multiplier: f64,
    pub buffered_hours: f64,
    pub duration_days: u64,
    pub distance_source: DistanceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Coordinate>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDuration {
    pub estimated_duration_days: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEstimate {
    /// `YYYY-MM-DD`
    pub estimated_delivery_date: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Unsupported transportation mode: {0}")]
    UnsupportedMode(String),

    #[error("Origin and destination are required when distance_km is not provided.")]
    MissingInput,

    #[error(transparent)]
    NotFound(#[from] LocationError),

    #[error("Invalid startDate supplied: {0}")]
    InvalidDate(String),

    #[error("Estimated delivery falls outside the supported calendar: {start} + {days} days")]
    DateOutOfRange { start: NaiveDate, days: u64 },
}
