//! Great-circle distance and ocean waypoint inference.

use crate::location::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const PANAMA_CANAL: Coordinate = Coordinate::new(9.08, -79.68);
pub const SUEZ_CANAL: Coordinate = Coordinate::new(30.5852, 32.2654);
pub const CAPE_OF_GOOD_HOPE: Coordinate = Coordinate::new(-34.3568, 18.474);

/// Haversine distance in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = b.lon.to_radians() - a.lon.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push near-antipodal pairs just past 1
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Sum of consecutive segment distances along `path`.
pub fn path_distance_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}

/// Where the three ocean chokepoints sit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chokepoints {
    pub panama: Coordinate,
    pub suez: Coordinate,
    pub cape: Coordinate,
}

impl Chokepoints {
    pub const BUILTIN: Chokepoints = Chokepoints {
        panama: PANAMA_CANAL,
        suez: SUEZ_CANAL,
        cape: CAPE_OF_GOOD_HOPE,
    };
}

impl Default for Chokepoints {
    fn default() -> Self {
        Self::BUILTIN
    }
}

/// Built-in chokepoints an ocean voyage from `origin` to `destination`
/// likely passes. See [`infer_ocean_waypoints_via`].
pub fn infer_ocean_waypoints(origin: Coordinate, destination: Coordinate) -> Vec<Coordinate> {
    infer_ocean_waypoints_via(origin, destination, &Chokepoints::BUILTIN)
}

/// Chokepoints from `points` an ocean voyage likely passes.
///
/// Rules are checked independently, in the order Panama, Suez, Cape:
/// - Panama: origin east of 100°E, destination west of 40°W
/// - Suez: origin within [15°W, 30°E], destination within [40°E, 120°E]
/// - Cape: either end in the southern hemisphere and more than 60° of
///   longitude apart
pub fn infer_ocean_waypoints_via(
    origin: Coordinate,
    destination: Coordinate,
    points: &Chokepoints,
) -> Vec<Coordinate> {
    let mut waypoints = Vec::new();

    if origin.lon > 100.0 && destination.lon < -40.0 {
        waypoints.push(points.panama);
    }

    if (-15.0..=30.0).contains(&origin.lon) && (40.0..=120.0).contains(&destination.lon) {
        waypoints.push(points.suez);
    }

    let southern = origin.lat < 0.0 || destination.lat < 0.0;
    if southern && (origin.lon - destination.lon).abs() > 60.0 && !waypoints.contains(&points.cape) {
        waypoints.push(points.cape);
    }

    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const ROTTERDAM: Coordinate = Coordinate::new(51.9225, 4.47917);
    const MUMBAI: Coordinate = Coordinate::new(19.07283, 72.88261);
    const SHANGHAI: Coordinate = Coordinate::new(31.22222, 121.45806);
    const NEW_YORK: Coordinate = Coordinate::new(40.71427, -74.00597);
    const SYDNEY: Coordinate = Coordinate::new(-33.86785, 151.20732);

    #[test]
    fn test_known_distance() {
        // London to Paris is roughly 344 km
        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);
        assert_relative_eq!(haversine_km(london, paris), 343.5, epsilon = 1.0);
    }

    #[test]
    fn test_antipodes() {
        let d = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert_relative_eq!(d, std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 1e-6);
    }

    #[test]
    fn test_suez_only() {
        assert_eq!(infer_ocean_waypoints(ROTTERDAM, MUMBAI), vec![SUEZ_CANAL]);
        // Reverse direction does not qualify
        assert!(infer_ocean_waypoints(MUMBAI, ROTTERDAM).is_empty());
    }

    #[test]
    fn test_panama_only() {
        assert_eq!(infer_ocean_waypoints(SHANGHAI, NEW_YORK), vec![PANAMA_CANAL]);
    }

    #[test]
    fn test_cape_only() {
        assert_eq!(infer_ocean_waypoints(SYDNEY, ROTTERDAM), vec![CAPE_OF_GOOD_HOPE]);
    }

    #[test]
    fn test_panama_and_cape_in_order() {
        assert_eq!(infer_ocean_waypoints(SYDNEY, NEW_YORK), vec![PANAMA_CANAL, CAPE_OF_GOOD_HOPE]);
    }

    #[test]
    fn test_custom_chokepoints() {
        let points = Chokepoints {
            panama: Coordinate::new(9.0, -79.5),
            ..Chokepoints::BUILTIN
        };
        assert_eq!(
            infer_ocean_waypoints_via(SYDNEY, NEW_YORK, &points),
            vec![Coordinate::new(9.0, -79.5), CAPE_OF_GOOD_HOPE]
        );
    }

    #[test]
    fn test_no_waypoints_for_short_hop() {
        assert!(infer_ocean_waypoints(ROTTERDAM, Coordinate::new(53.57532, 10.01534)).is_empty());
    }

    #[test]
    fn test_path_distance() {
        assert_relative_eq!(path_distance_km(&[ROTTERDAM]), 0.0);
        assert_relative_eq!(path_distance_km(&[]), 0.0);
        let via_suez = path_distance_km(&[ROTTERDAM, SUEZ_CANAL, MUMBAI]);
        assert!(via_suez > haversine_km(ROTTERDAM, MUMBAI));
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0..=90.0f64, -180.0..=180.0f64).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        #[test]
        fn haversine_self_distance_is_zero(p in coordinate()) {
            prop_assert_eq!(haversine_km(p, p), 0.0);
        }

        #[test]
        fn haversine_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_km(a, b);
            let ba = haversine_km(b, a);
            prop_assert!((ab - ba).abs() < 1e-9, "{} != {}", ab, ba);
        }

        #[test]
        fn haversine_is_bounded(a in coordinate(), b in coordinate()) {
            let d = haversine_km(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
