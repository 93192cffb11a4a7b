//! Duration and delivery-date estimation.
//!
//! Distance comes either from the request or from resolving origin and
//! destination against the coordinate index. Ocean legs are routed through
//! inferred chokepoints. Each mode then contributes a speed, an overhead
//! and a contingency multiplier.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::location::{CoordinateIndex, Resolver};

use super::geo::{haversine_km, infer_ocean_waypoints_via, path_distance_km, Chokepoints};
use super::mode::TransportMode;
use super::types::{
    DeliveryEstimate, DistanceSource, DurationDetails, EstimateError, EstimateRequest, RouteDistance,
    RouteDuration,
};

/// Day counts at or past this cannot be represented exactly as `u64`.
const MAX_DURATION_DAYS: f64 = u64::MAX as f64;

/// Overhead hours for `mode` on a trip of `travel_hours`.
pub fn compute_overhead(mode: TransportMode, travel_hours: f64) -> f64 {
    mode.overhead_hours(travel_hours)
}

/// Parse a start date. Accepts `YYYY-MM-DD`, RFC 3339 (reduced to its UTC
/// calendar date) and naive `YYYY-MM-DDTHH:MM:SS[.fff]` taken as UTC.
pub fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

#[derive(Debug, Clone, Copy)]
pub struct Estimator<'a> {
    resolver: Resolver<'a>,
}

impl<'a> Estimator<'a> {
    pub fn new(index: &'a CoordinateIndex) -> Self {
        Self {
            resolver: Resolver::new(index),
        }
    }

    pub fn resolver(&self) -> Resolver<'a> {
        self.resolver
    }

    /// Chokepoint coordinates from the index, where it knows them by name.
    pub fn chokepoints(&self) -> Chokepoints {
        let builtin = Chokepoints::BUILTIN;
        let named = |name: &str, fallback| self.resolver.exact(name).unwrap_or(fallback);
        Chokepoints {
            panama: named("Panama Canal", builtin.panama),
            suez: named("Suez Canal", builtin.suez),
            cape: named("Cape of Good Hope", builtin.cape),
        }
    }

    /// Distance for `request`, measured along the inferred path when none
    /// is provided.
    pub fn determine_total_distance(
        &self,
        request: &EstimateRequest,
        mode: TransportMode,
    ) -> Result<RouteDistance, EstimateError> {
        if let Some(km) = request.provided_distance() {
            return Ok(RouteDistance {
                total_km: km,
                source: DistanceSource::Provided,
                path: None,
            });
        }

        let (origin, destination) = request.route().ok_or(EstimateError::MissingInput)?;
        let from = self.resolver.ensure_resolve(origin)?;
        let to = self.resolver.ensure_resolve(destination)?;

        let waypoints = match mode {
            TransportMode::Ocean => infer_ocean_waypoints_via(from, to, &self.chokepoints()),
            _ => Vec::new(),
        };

        let (total_km, path) = if waypoints.is_empty() {
            (haversine_km(from, to), vec![from, to])
        } else {
            let mut path = Vec::with_capacity(waypoints.len() + 2);
            path.push(from);
            path.extend(waypoints);
            path.push(to);
            (path_distance_km(&path), path)
        };

        debug!(origin, destination, %mode, total_km, legs = path.len() - 1, "route distance");

        Ok(RouteDistance {
            total_km,
            source: DistanceSource::Calculated,
            path: Some(path),
        })
    }

    pub fn calculate_duration_details(&self, request: &EstimateRequest) -> Result<DurationDetails, EstimateError> {
        let raw_mode = request.transportation_mode.as_deref().unwrap_or("");
        let mode: TransportMode = raw_mode
            .parse()
            .map_err(|_| EstimateError::UnsupportedMode(raw_mode.to_string()))?;

        if request.provided_distance().is_none() && request.route().is_none() {
            return Err(EstimateError::MissingInput);
        }

        let distance = self.determine_total_distance(request, mode)?;

        let travel_hours = distance.total_km / mode.speed_kmh();
        let overhead_hours = compute_overhead(mode, travel_hours);
        let contingency = mode.contingency_multiplier();
        let buffered_hours = (travel_hours + overhead_hours) * contingency;
        let days = (buffered_hours / 24.0).ceil();
        if !days.is_finite() || days >= MAX_DURATION_DAYS {
            return Err(EstimateError::InvalidInput(format!(
                "Distance of {} km is too large to estimate a duration",
                distance.total_km
            )));
        }
        let duration_days = days as u64;

        Ok(DurationDetails {
            total_distance_km: distance.total_km,
            travel_hours,
            overhead_hours,
            contingency_multiplier: contingency,
            buffered_hours,
            duration_days,
            distance_source: distance.source,
            path: distance.path,
        })
    }

    pub fn estimate_route_duration(&self, request: &EstimateRequest) -> Result<RouteDuration, EstimateError> {
        let details = self.calculate_duration_details(request)?;
        Ok(RouteDuration {
            estimated_duration_days: details.duration_days,
        })
    }

    /// Delivery date counted from `startDate`, or from today (UTC) when absent.
    pub fn estimate_shipment_delivery(&self, request: &EstimateRequest) -> Result<DeliveryEstimate, EstimateError> {
        self.estimate_delivery_from(request, Utc::now().date_naive())
    }

    /// As [`estimate_shipment_delivery`](Self::estimate_shipment_delivery)
    /// with an explicit fallback start date.
    pub fn estimate_delivery_from(
        &self,
        request: &EstimateRequest,
        today: NaiveDate,
    ) -> Result<DeliveryEstimate, EstimateError> {
        let details = self.calculate_duration_details(request)?;

        let start = match request.start_date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                parse_start_date(raw).ok_or_else(|| EstimateError::InvalidDate(raw.to_string()))?
            }
            _ => today,
        };

        let delivery = start
            .checked_add_days(Days::new(details.duration_days))
            .ok_or(EstimateError::DateOutOfRange {
                start,
                days: details.duration_days,
            })?;

        Ok(DeliveryEstimate {
            estimated_delivery_date: delivery.format("%Y-%m-%d").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{Coordinate, IndexBuilder, LocationError};
    use crate::logistics::geo::{CAPE_OF_GOOD_HOPE, PANAMA_CANAL, SUEZ_CANAL};
    use approx::assert_relative_eq;

    fn ports() -> CoordinateIndex {
        let mut b = IndexBuilder::new();
        b.register_override("Rotterdam", 51.9225, 4.47917);
        b.register_override("Mumbai", 19.07283, 72.88261);
        b.register_override("Shanghai", 31.22222, 121.45806);
        b.register_override("New York", 40.71427, -74.00597);
        b.register_override("Sydney", -33.86785, 151.20732);
        b.register_override("Hamburg", 53.57532, 10.01534);
        CoordinateIndex::from_builder(b)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_road_700km() {
        let index = ports();
        let est = Estimator::new(&index);
        let d = est
            .calculate_duration_details(&EstimateRequest::new("ROAD").with_distance(700.0))
            .unwrap();
        assert_relative_eq!(d.travel_hours, 10.0);
        assert_relative_eq!(d.overhead_hours, 4.0);
        assert_relative_eq!(d.buffered_hours, 15.4, epsilon = 1e-9);
        assert_eq!(d.duration_days, 1);
        assert_eq!(d.distance_source, DistanceSource::Provided);
        assert!(d.path.is_none());
    }

    #[test]
    fn test_mode_is_case_insensitive() {
        let index = ports();
        let est = Estimator::new(&index);
        let days = est
            .estimate_route_duration(&EstimateRequest::new("air").with_distance(8500.0))
            .unwrap();
        // (10 + 12) * 1.1 = 24.2 h
        assert_eq!(days.estimated_duration_days, 2);
    }

    #[test]
    fn test_delivery_from_start_date() {
        let index = ports();
        let est = Estimator::new(&index);
        // 6000 km by road: 85.71 h travel, 16 h overhead, 111.9 h buffered
        let req = EstimateRequest::new("ROAD").with_distance(6000.0).with_start_date("2024-01-01");
        assert_eq!(est.estimate_route_duration(&req).unwrap().estimated_duration_days, 5);
        assert_eq!(
            est.estimate_shipment_delivery(&req).unwrap().estimated_delivery_date,
            "2024-01-06"
        );
    }

    #[test]
    fn test_delivery_date_forms() {
        let index = ports();
        let est = Estimator::new(&index);
        let base = EstimateRequest::new("ROAD").with_distance(700.0);

        let rfc = base.clone().with_start_date("2024-02-28T23:30:00-02:00");
        // 2024-02-29T01:30Z, plus one day
        assert_eq!(est.estimate_shipment_delivery(&rfc).unwrap().estimated_delivery_date, "2024-03-01");

        let naive = base.clone().with_start_date("2024-12-31T08:00:00");
        assert_eq!(est.estimate_shipment_delivery(&naive).unwrap().estimated_delivery_date, "2025-01-01");

        let blank = base.clone().with_start_date("  ");
        assert_eq!(
            est.estimate_delivery_from(&blank, date(2030, 6, 1)).unwrap().estimated_delivery_date,
            "2030-06-02"
        );
        assert_eq!(
            est.estimate_delivery_from(&base, date(2030, 6, 1)).unwrap().estimated_delivery_date,
            "2030-06-02"
        );
    }

    #[test]
    fn test_invalid_date() {
        let index = ports();
        let est = Estimator::new(&index);
        let req = EstimateRequest::new("ROAD").with_distance(700.0).with_start_date("next tuesday");
        assert_eq!(
            est.estimate_shipment_delivery(&req),
            Err(EstimateError::InvalidDate("next tuesday".into()))
        );
    }

    #[test]
    fn test_duration_errors_precede_date_errors() {
        let index = ports();
        let est = Estimator::new(&index);
        let req = EstimateRequest::new("TELEPORT").with_distance(10.0).with_start_date("garbage");
        assert_eq!(
            est.estimate_shipment_delivery(&req),
            Err(EstimateError::UnsupportedMode("TELEPORT".into()))
        );
    }

    #[test]
    fn test_unsupported_and_missing() {
        let index = ports();
        let est = Estimator::new(&index);
        assert_eq!(
            est.estimate_route_duration(&EstimateRequest::new("TELEPORT").with_distance(100.0)),
            Err(EstimateError::UnsupportedMode("TELEPORT".into()))
        );
        assert_eq!(
            est.estimate_route_duration(&EstimateRequest::default()),
            Err(EstimateError::UnsupportedMode(String::new()))
        );
        assert_eq!(
            est.estimate_route_duration(&EstimateRequest::new("OCEAN")),
            Err(EstimateError::MissingInput)
        );
        assert_eq!(
            est.estimate_route_duration(&EstimateRequest::new("OCEAN").with_route("Rotterdam", "")),
            Err(EstimateError::MissingInput)
        );
        // A non-positive distance falls back to the route
        assert_eq!(
            est.estimate_route_duration(&EstimateRequest::new("OCEAN").with_distance(0.0)),
            Err(EstimateError::MissingInput)
        );
    }

    #[test]
    fn test_unknown_location() {
        let index = ports();
        let est = Estimator::new(&index);
        let req = EstimateRequest::new("RAIL").with_route("Rotterdam", "Nonexistent Place Name 12345");
        assert_eq!(
            est.estimate_route_duration(&req),
            Err(EstimateError::NotFound(LocationError::NotFound(
                "Nonexistent Place Name 12345".into()
            )))
        );
    }

    #[test]
    fn test_ocean_via_suez() {
        let index = ports();
        let est = Estimator::new(&index);
        let req = EstimateRequest::new("OCEAN").with_route("Rotterdam", "Mumbai");
        let d = est.calculate_duration_details(&req).unwrap();
        let path = d.path.unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[1], SUEZ_CANAL);
        assert_eq!(d.distance_source, DistanceSource::Calculated);
        assert_relative_eq!(d.total_distance_km, path_distance_km(&path));
        assert!(d.total_distance_km > haversine_km(path[0], path[2]));
        assert_relative_eq!(d.overhead_hours, 48.0);
        assert_relative_eq!(d.contingency_multiplier, 1.15);
    }

    #[test]
    fn test_ocean_waypoint_routes() {
        let index = ports();
        let est = Estimator::new(&index);
        let waypoints = |o: &str, d: &str| -> Vec<Coordinate> {
            let path = est
                .determine_total_distance(&EstimateRequest::new("OCEAN").with_route(o, d), TransportMode::Ocean)
                .unwrap()
                .path
                .unwrap();
            path[1..path.len() - 1].to_vec()
        };
        assert_eq!(waypoints("Shanghai", "New York"), vec![PANAMA_CANAL]);
        assert_eq!(waypoints("Sydney", "Rotterdam"), vec![CAPE_OF_GOOD_HOPE]);
        assert_eq!(waypoints("Sydney", "New York"), vec![PANAMA_CANAL, CAPE_OF_GOOD_HOPE]);
        assert!(waypoints("Rotterdam", "Hamburg").is_empty());
    }

    #[test]
    fn test_non_ocean_uses_direct_path() {
        let index = ports();
        let est = Estimator::new(&index);
        let req = EstimateRequest::new("AIR").with_route("Rotterdam", "Mumbai");
        let d = est.calculate_duration_details(&req).unwrap();
        let path = d.path.unwrap();
        assert_eq!(path.len(), 2);
        assert_relative_eq!(d.total_distance_km, haversine_km(path[0], path[1]));
    }

    #[test]
    fn test_chokepoints_follow_index() {
        let mut b = IndexBuilder::new();
        b.register_override("Shanghai", 31.22222, 121.45806);
        b.register_override("New York", 40.71427, -74.00597);
        b.register_override("Panama Canal", 9.0, -79.5);
        let index = CoordinateIndex::from_builder(b);
        let est = Estimator::new(&index);

        let points = est.chokepoints();
        assert_eq!(points.panama, Coordinate::new(9.0, -79.5));
        assert_eq!(points.suez, SUEZ_CANAL);
        assert_eq!(points.cape, CAPE_OF_GOOD_HOPE);

        let req = EstimateRequest::new("OCEAN").with_route("Shanghai", "New York");
        let path = est.calculate_duration_details(&req).unwrap().path.unwrap();
        assert_eq!(path[1], Coordinate::new(9.0, -79.5));

        // Without index entries the built-in positions apply
        assert_eq!(Estimator::new(&ports()).chokepoints(), Chokepoints::BUILTIN);
    }

    #[test]
    fn test_huge_distance_keeps_day_count() {
        let index = ports();
        let est = Estimator::new(&index);
        let req = EstimateRequest::new("ROAD").with_distance(1e15);
        assert_eq!(
            est.estimate_route_duration(&req).unwrap().estimated_duration_days,
            763_888_888_890
        );

        let dated = req.with_start_date("2024-01-01");
        assert_eq!(
            est.estimate_shipment_delivery(&dated),
            Err(EstimateError::DateOutOfRange {
                start: date(2024, 1, 1),
                days: 763_888_888_890,
            })
        );
    }

    #[test]
    fn test_unrepresentable_duration() {
        let index = ports();
        let est = Estimator::new(&index);
        let req = EstimateRequest::new("ROAD").with_distance(1e308);
        assert!(matches!(
            est.calculate_duration_details(&req),
            Err(EstimateError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(parse_start_date("2024-01-01"), Some(date(2024, 1, 1)));
        assert_eq!(parse_start_date("2024-01-01T23:00:00Z"), Some(date(2024, 1, 1)));
        assert_eq!(parse_start_date("2024-01-01T23:00:00-05:00"), Some(date(2024, 1, 2)));
        assert_eq!(parse_start_date("2024-01-01T10:15:30.250"), Some(date(2024, 1, 1)));
        assert_eq!(parse_start_date("2024-13-01"), None);
        assert_eq!(parse_start_date("01/02/2024"), None);
    }
}
