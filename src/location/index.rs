//! The coordinate index: every known name and alias, keyed three ways.
//!
//! Built once from the reference hierarchy (priority 1) followed by the
//! manual overrides (priority 2), then frozen. Lookups never mutate.

use super::aliases::implicit_aliases;
use super::dataset::{DatasetError, ManualOverrides, ReferenceDataset};
use super::normalize::{loose_key, simple_key, strict_key};
use super::types::{Coordinate, CoordinateEntry, Priority, RawCoordinate};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;

/// How a key is being claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    /// The entry's own canonical name.
    Canonical,
    /// A derived or caller-supplied alias.
    Alias,
}

/// Whether an incoming claim displaces the entry currently holding a key.
///
/// Higher priority always wins. On equal priority a canonical name takes
/// the key from whoever held it (latest registration wins), while an alias
/// never displaces an existing claim.
fn outranks(incoming: Priority, held: Priority, claim: Claim) -> bool {
    match claim {
        Claim::Canonical => incoming >= held,
        Claim::Alias => incoming > held,
    }
}

/// Whether aliases of a registration appear in the name listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    NameOnly,
    NameAndAliases,
}

/// Mutable index under construction.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    entries: Vec<CoordinateEntry>,
    by_name: HashMap<String, usize>,
    keys: HashMap<String, usize>,
    listed: HashSet<String>,
    dropped: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` at the given coordinates.
    ///
    /// Silently ignored (returns `false`) when the name is empty or the
    /// coordinates do not parse to an in-range pair.
    pub fn register(
        &mut self,
        name: &str,
        lat: impl Into<RawCoordinate>,
        lon: impl Into<RawCoordinate>,
        priority: Priority,
        aliases: &[String],
    ) -> bool {
        self.register_with(name, &lat.into(), &lon.into(), priority, aliases, Listing::NameOnly)
    }

    /// Register a manual override. Its aliases are listed alongside the name.
    pub fn register_override(
        &mut self,
        name: &str,
        lat: impl Into<RawCoordinate>,
        lon: impl Into<RawCoordinate>,
    ) -> bool {
        self.register_with(
            name,
            &lat.into(),
            &lon.into(),
            Priority::MANUAL,
            &[],
            Listing::NameAndAliases,
        )
    }

    /// Register every country, state, and city of `dataset` at dataset priority.
    pub fn add_dataset(&mut self, dataset: &ReferenceDataset) {
        for country in &dataset.countries {
            self.register_with(
                &country.name,
                &country.latitude,
                &country.longitude,
                Priority::DATASET,
                &country.aliases(),
                Listing::NameOnly,
            );

            for state in &country.states {
                let state_aliases = [format!("{}, {}", state.name, country.name)];
                self.register_with(
                    &state.name,
                    &state.latitude,
                    &state.longitude,
                    Priority::DATASET,
                    &state_aliases,
                    Listing::NameOnly,
                );

                for city in &state.cities {
                    let city_aliases = [
                        format!("{}, {}", city.name, state.name),
                        format!("{}, {}", city.name, country.name),
                        format!("{}, {}, {}", city.name, state.name, country.name),
                    ];
                    self.register_with(
                        &city.name,
                        &city.latitude,
                        &city.longitude,
                        Priority::DATASET,
                        &city_aliases,
                        Listing::NameOnly,
                    );
                }
            }
        }
    }

    /// Register every override row at manual priority.
    pub fn add_overrides(&mut self, overrides: &ManualOverrides) {
        for row in &overrides.rows {
            self.register_with(
                &row.name,
                &row.latitude,
                &row.longitude,
                Priority::MANUAL,
                &[],
                Listing::NameAndAliases,
            );
        }
    }

    fn register_with(
        &mut self,
        name: &str,
        lat: &RawCoordinate,
        lon: &RawCoordinate,
        priority: Priority,
        aliases: &[String],
        listing: Listing,
    ) -> bool {
        if name.is_empty() {
            return false;
        }
        let Some(coords) = Coordinate::parse(lat, lon) else {
            debug!(location = name, ?lat, ?lon, "dropping registration with unusable coordinates");
            self.dropped += 1;
            return false;
        };

        let slot = self.upsert_entry(name, coords, priority);
        self.link(name, slot, Claim::Canonical);
        self.listed.insert(name.to_string());

        let mut all_aliases: Vec<String> = aliases.to_vec();
        for alias in implicit_aliases(name) {
            if !all_aliases.contains(&alias) {
                all_aliases.push(alias);
            }
        }

        for alias in &all_aliases {
            if alias.is_empty() || alias == name {
                continue;
            }
            let trimmed = alias.trim();
            if trimmed.chars().count() < 2 {
                continue;
            }
            self.link(trimmed, slot, Claim::Alias);
            if listing == Listing::NameAndAliases {
                self.listed.insert(trimmed.to_string());
            }
        }
        true
    }

    /// Create the entry for `name`, or update it if `priority` is at least
    /// its current priority.
    fn upsert_entry(&mut self, name: &str, coords: Coordinate, priority: Priority) -> usize {
        if let Some(&slot) = self.by_name.get(name) {
            let entry = &mut self.entries[slot];
            if priority >= entry.priority {
                entry.coords = coords;
                entry.priority = priority;
            }
            return slot;
        }

        let slot = self.entries.len();
        self.entries.push(CoordinateEntry::new(name, coords, priority));
        self.by_name.insert(name.to_string(), slot);
        slot
    }

    fn link(&mut self, text: &str, slot: usize, claim: Claim) {
        for key in [strict_key(text), loose_key(text), simple_key(text)] {
            if key.is_empty() {
                continue;
            }
            let incoming = self.entries[slot].priority;
            let displaces = match self.keys.get(&key) {
                Some(&held) => outranks(incoming, self.entries[held].priority, claim),
                None => true,
            };
            if displaces {
                self.keys.insert(key, slot);
            }
        }
    }

    /// Freeze into lookup tables.
    pub fn finish(self) -> IndexTables {
        let mut names: Vec<String> = self.listed.into_iter().collect();
        names.sort_by_cached_key(|n| (strict_key(n), n.clone()));

        debug!(
            entries = self.entries.len(),
            keys = self.keys.len(),
            listed = names.len(),
            dropped = self.dropped,
            "coordinate index built"
        );

        IndexTables {
            entries: self.entries,
            keys: self.keys,
            names,
        }
    }
}

/// Frozen, read-only lookup tables.
#[derive(Debug)]
pub struct IndexTables {
    entries: Vec<CoordinateEntry>,
    keys: HashMap<String, usize>,
    names: Vec<String>,
}

impl IndexTables {
    fn get(&self, key: &str) -> Option<&CoordinateEntry> {
        if key.is_empty() {
            return None;
        }
        self.keys.get(key).map(|&slot| &self.entries[slot])
    }
}

/// The coordinate index, built lazily on first use.
///
/// Share it by reference (or `Arc`) between resolvers and estimators;
/// after the first lookup it is immutable.
#[derive(Debug)]
pub struct CoordinateIndex {
    dataset: ReferenceDataset,
    overrides: ManualOverrides,
    tables: OnceLock<IndexTables>,
}

impl CoordinateIndex {
    /// An index over the given sources. Nothing is built until first use.
    pub fn new(dataset: ReferenceDataset, overrides: ManualOverrides) -> Self {
        Self {
            dataset,
            overrides,
            tables: OnceLock::new(),
        }
    }

    /// An index over the embedded dataset and override table.
    pub fn builtin() -> Result<Self, DatasetError> {
        Ok(Self::new(ReferenceDataset::builtin()?, ManualOverrides::builtin()?))
    }

    /// An index that is already built from a hand-populated builder.
    pub fn from_builder(builder: IndexBuilder) -> Self {
        Self {
            dataset: ReferenceDataset::default(),
            overrides: ManualOverrides::default(),
            tables: OnceLock::from(builder.finish()),
        }
    }

    /// Build the tables if they have not been built yet.
    pub fn build(&self) -> &IndexTables {
        self.tables.get_or_init(|| {
            let mut builder = IndexBuilder::new();
            builder.add_dataset(&self.dataset);
            builder.add_overrides(&self.overrides);
            builder.finish()
        })
    }

    pub fn is_built(&self) -> bool {
        self.tables.get().is_some()
    }

    /// Strict, then loose, then simple key lookup.
    pub fn lookup_exact(&self, location: &str) -> Option<&CoordinateEntry> {
        let tables = self.build();
        tables
            .get(&strict_key(location))
            .or_else(|| tables.get(&loose_key(location)))
            .or_else(|| tables.get(&simple_key(location)))
    }

    /// Canonical entries in first-registration order.
    pub fn entries(&self) -> &[CoordinateEntry] {
        &self.build().entries
    }

    /// Sorted display names for autocomplete.
    pub fn list_names(&self) -> &[String] {
        &self.build().names
    }

    /// Listed names containing `filter` (case-insensitive), at most `limit` of them.
    pub fn search_names(&self, filter: Option<&str>, limit: Option<usize>) -> Vec<&str> {
        let needle = filter.map(|f| f.trim().to_lowercase()).filter(|f| !f.is_empty());
        self.list_names()
            .iter()
            .filter(|name| match &needle {
                Some(needle) => name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .take(limit.unwrap_or(usize::MAX))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.build().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
