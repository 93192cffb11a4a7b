//! Reference data: the countries → states → cities hierarchy and the manual
//! override table.
//!
//! Both ship embedded in the binary and can be replaced with JSON files of
//! the same shape.

use super::types::RawCoordinate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static BUILTIN_DATASET: &str = include_str!("../../data/reference.json");
static BUILTIN_OVERRIDES: &str = include_str!("../../data/manual_overrides.json");

/// Reference data could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reference data in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct City {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default)]
    pub latitude: RawCoordinate,
    #[serde(default)]
    pub longitude: RawCoordinate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct State {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default)]
    pub latitude: RawCoordinate,
    #[serde(default)]
    pub longitude: RawCoordinate,
    #[serde(default, deserialize_with = "lenient_rows")]
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Country {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub iso2: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub iso3: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub capital: Option<String>,
    #[serde(default)]
    pub latitude: RawCoordinate,
    #[serde(default)]
    pub longitude: RawCoordinate,
    #[serde(default, deserialize_with = "lenient_rows")]
    pub states: Vec<State>,
}

impl Country {
    /// Codes and capital, in that order, skipping blanks.
    pub fn aliases(&self) -> Vec<String> {
        [&self.iso2, &self.iso3, &self.capital]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// The field's value, or its default when the JSON has the wrong type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Every element that deserializes as `T`; anything but an array is empty.
fn lenient_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// The countries → states → cities hierarchy.
///
/// Malformed rows are tolerated: wrongly typed fields fall back to empty
/// values and rows that are not objects are skipped.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    pub countries: Vec<Country>,
}

impl ReferenceDataset {
    /// The dataset embedded at compile time.
    pub fn builtin() -> Result<Self, DatasetError> {
        Self::from_json(BUILTIN_DATASET, "built-in dataset")
    }

    pub fn load_from(path: &Path) -> Result<Self, DatasetError> {
        let data = read_file(path)?;
        Self::from_json(&data, &path.display().to_string())
    }

    /// Parse a JSON array of countries. Only a document that is not an
    /// array at all is an error.
    pub fn from_json(data: &str, origin: &str) -> Result<Self, DatasetError> {
        let rows: Vec<Value> = serde_json::from_str(data).map_err(|source| DatasetError::Parse {
            origin: origin.to_string(),
            source,
        })?;

        let total = rows.len();
        let countries: Vec<Country> = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();
        if countries.len() < total {
            debug!(origin, skipped = total - countries.len(), "skipping non-object country rows");
        }

        Ok(Self { countries })
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// One manual override row.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualOverride {
    pub name: String,
    pub latitude: RawCoordinate,
    pub longitude: RawCoordinate,
}

/// Hand-maintained `name → [lat, lon]` table, in file order.
#[derive(Debug, Clone, Default)]
pub struct ManualOverrides {
    pub rows: Vec<ManualOverride>,
}

impl ManualOverrides {
    /// The override table embedded at compile time.
    pub fn builtin() -> Result<Self, DatasetError> {
        Self::from_json(BUILTIN_OVERRIDES, "built-in overrides")
    }

    pub fn load_from(path: &Path) -> Result<Self, DatasetError> {
        let data = read_file(path)?;
        Self::from_json(&data, &path.display().to_string())
    }

    /// Parse a JSON object of `name → [lat, lon]`.
    ///
    /// Rows whose value is not an array of at least two items are skipped.
    pub fn from_json(data: &str, origin: &str) -> Result<Self, DatasetError> {
        let table: serde_json::Map<String, Value> =
            serde_json::from_str(data).map_err(|source| DatasetError::Parse {
                origin: origin.to_string(),
                source,
            })?;

        let rows = table
            .into_iter()
            .filter_map(|(name, value)| {
                let pair = value.as_array().filter(|items| items.len() >= 2)?;
                Some(ManualOverride {
                    name,
                    latitude: RawCoordinate::from(pair[0].clone()),
                    longitude: RawCoordinate::from(pair[1].clone()),
                })
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64, f64)>) -> Self {
        let rows = pairs
            .into_iter()
            .map(|(name, lat, lon)| ManualOverride {
                name: name.to_string(),
                latitude: lat.into(),
                longitude: lon.into(),
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn read_file(path: &Path) -> Result<String, DatasetError> {
    fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}
