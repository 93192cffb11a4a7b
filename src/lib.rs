//! Freight ETA: offline location resolution and transit-time estimation.
//!
//! A [`CoordinateIndex`] is built once from reference data, a [`Resolver`]
//! maps free-form place names onto it, and an [`Estimator`] turns an
//! origin/destination/mode request into a distance, a duration and a
//! delivery date.

pub mod config;
pub mod location;
pub mod logistics;
pub mod server;

pub use config::DataConfig;
pub use location::{Coordinate, CoordinateIndex, LocationError, Resolver};
pub use logistics::{
    DeliveryEstimate, DurationDetails, EstimateError, EstimateRequest, Estimator, RouteDuration, TransportMode,
};
