//! Distance and duration estimation for shipments.

pub mod estimator;
pub mod geo;
pub mod mode;
pub mod types;

pub use estimator::{compute_overhead, parse_start_date, Estimator};
pub use geo::{
    haversine_km, infer_ocean_waypoints, infer_ocean_waypoints_via, path_distance_km, Chokepoints, EARTH_RADIUS_KM,
};
pub use mode::TransportMode;
pub use types::{
    DeliveryEstimate, DistanceSource, DurationDetails, EstimateError, EstimateRequest, RouteDistance,
    RouteDuration,
};
