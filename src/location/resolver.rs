//! Location resolver: turns free-form place names into coordinates.
//!
//! Flow:  candidate variants → exact index lookup (any candidate) →
//!        fuzzy fallback (per candidate) → not found

use super::index::CoordinateIndex;
use super::normalize::{simple_key, strict_key};
use super::types::{Coordinate, CoordinateEntry, LocationError};
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static COMMON_PREFIXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)^port of\s+", r"(?i)^city of\s+"]
        .into_iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
});

static COMMON_SUFFIXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)\sport$", r"(?i)\scity$", r"(?i)\sairport$", r"(?i)\sterminal$"]
        .into_iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
});

/// Query variants for `raw`, most complete first, without duplicates.
pub fn generate_candidates(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut variants: Vec<String> = Vec::new();
    let mut add = |variant: &str| {
        let variant = variant.trim();
        if !variant.is_empty() && !variants.iter().any(|v| v == variant) {
            variants.push(variant.to_string());
        }
    };

    add(trimmed);

    // "Colombo (Port)" -> "Colombo Port"
    let expanded = PARENTHETICAL.replace_all(trimmed, " $1 ");
    add(&WHITESPACE.replace_all(&expanded, " "));

    for prefix in COMMON_PREFIXES.iter() {
        if prefix.is_match(trimmed) {
            add(&prefix.replace(trimmed, ""));
        }
    }

    for suffix in COMMON_SUFFIXES.iter() {
        if suffix.is_match(trimmed) {
            add(&suffix.replace(trimmed, ""));
        }
    }

    for segment in trimmed.split(',') {
        add(segment);
    }

    variants
}

/// Resolves place names against a [`CoordinateIndex`].
///
/// Holds no state of its own; cheap to create per request.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a CoordinateIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a CoordinateIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a CoordinateIndex {
        self.index
    }

    /// Coordinates for `raw`, trying every candidate exactly before any fuzzy match.
    pub fn resolve(&self, raw: &str) -> Option<Coordinate> {
        self.resolve_entry(raw).map(|entry| entry.coords)
    }

    /// Like [`resolve`](Self::resolve), but returns the matched entry.
    pub fn resolve_entry(&self, raw: &str) -> Option<&'a CoordinateEntry> {
        let candidates = generate_candidates(raw);

        for candidate in &candidates {
            if let Some(entry) = self.index.lookup_exact(candidate) {
                trace!(query = raw, candidate = %candidate, matched = %entry.name, "exact match");
                return Some(entry);
            }
        }

        for candidate in &candidates {
            if let Some(entry) = self.fallback_match(candidate) {
                trace!(query = raw, candidate = %candidate, matched = %entry.name, "fuzzy match");
                return Some(entry);
            }
        }

        trace!(query = raw, candidates = candidates.len(), "no match");
        None
    }

    /// Like [`resolve`](Self::resolve), but unresolved input is an error.
    pub fn ensure_resolve(&self, raw: &str) -> Result<Coordinate, LocationError> {
        self.resolve(raw)
            .ok_or_else(|| LocationError::NotFound(raw.to_string()))
    }

    /// Index lookup only: no candidate variants, no fuzzy fallback.
    pub fn exact(&self, raw: &str) -> Option<Coordinate> {
        self.exact_entry(raw).map(|entry| entry.coords)
    }

    pub fn exact_entry(&self, raw: &str) -> Option<&'a CoordinateEntry> {
        if raw.is_empty() {
            return None;
        }
        self.index.lookup_exact(raw)
    }

    /// Scan entries in insertion order: equal keys first, then containment.
    fn fallback_match(&self, candidate: &str) -> Option<&'a CoordinateEntry> {
        let strict = strict_key(candidate);
        let simple = simple_key(candidate);
        let entries = self.index.entries();

        let equal = |entry_key: &str, query_key: &str| !query_key.is_empty() && entry_key == query_key;
        let overlaps = |entry_key: &str, query_key: &str| {
            !entry_key.is_empty()
                && !query_key.is_empty()
                && (entry_key.contains(query_key) || query_key.contains(entry_key))
        };

        entries
            .iter()
            .find(|e| equal(&e.strict, &strict) || equal(&e.simple, &simple))
            .or_else(|| {
                entries
                    .iter()
                    .find(|e| overlaps(&e.strict, &strict) || overlaps(&e.simple, &simple))
            })
    }
}
