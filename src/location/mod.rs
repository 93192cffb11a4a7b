//! Location subsystem.
//!
//! Builds a coordinate index from the reference hierarchy and manual
//! overrides, then resolves free-form place names against it with
//! candidate variants and a fuzzy fallback.

pub mod aliases;
pub mod dataset;
pub mod index;
pub mod normalize;
pub mod resolver;
pub mod types;

pub use dataset::{DatasetError, ManualOverrides, ReferenceDataset};
pub use index::{CoordinateIndex, IndexBuilder};
pub use resolver::{generate_candidates, Resolver};
pub use types::{Coordinate, CoordinateEntry, LocationError, Priority, RawCoordinate};
