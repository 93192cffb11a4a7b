//! Data source configuration.
//!
//! Paths given explicitly win. Otherwise `~/.freight-eta/dataset.json` and
//! `~/.freight-eta/overrides.json` are used when present, and the embedded
//! data fills in whatever is still missing.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::location::{CoordinateIndex, DatasetError, ManualOverrides, ReferenceDataset};

const CONFIG_DIR: &str = ".freight-eta";
const DATASET_FILE: &str = "dataset.json";
const OVERRIDES_FILE: &str = "overrides.json";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataConfig {
    pub dataset: Option<PathBuf>,
    pub overrides: Option<PathBuf>,
}

impl DataConfig {
    /// Explicit paths, falling back to files in the default directory.
    pub fn resolve(dataset: Option<PathBuf>, overrides: Option<PathBuf>) -> Self {
        Self::resolve_in(&Self::default_dir(), dataset, overrides)
    }

    /// As [`resolve`](Self::resolve) with a custom fallback directory.
    pub fn resolve_in(dir: &Path, dataset: Option<PathBuf>, overrides: Option<PathBuf>) -> Self {
        let existing = |file: &str| {
            let path = dir.join(file);
            path.is_file().then_some(path)
        };
        Self {
            dataset: dataset.or_else(|| existing(DATASET_FILE)),
            overrides: overrides.or_else(|| existing(OVERRIDES_FILE)),
        }
    }

    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
    }

    /// Read both sources. The index itself is built lazily on first lookup.
    pub fn load_index(&self) -> Result<CoordinateIndex, DatasetError> {
        let dataset = match &self.dataset {
            Some(path) => {
                info!(path = %path.display(), "loading reference dataset");
                ReferenceDataset::load_from(path)?
            }
            None => ReferenceDataset::builtin()?,
        };
        let overrides = match &self.overrides {
            Some(path) => {
                info!(path = %path.display(), "loading manual overrides");
                ManualOverrides::load_from(path)?
            }
            None => ManualOverrides::builtin()?,
        };
        Ok(CoordinateIndex::new(dataset, overrides))
    }
}
