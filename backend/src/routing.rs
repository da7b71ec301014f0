use crate::models::{Coordinate, Leg, Route};
use crate::polyline;

const EARTH_RADIUS_KM: f64 = 6_371.0;
pub const DEFAULT_MAX_WAYPOINTS: usize = 15;

/// Decode every step polyline of every leg, in path order.
///
/// A step whose polyline fails to decode contributes no points; the rest of
/// the route is still used.
pub fn extract_route_coordinates(route: &Route) -> Vec<Coordinate> {
    route.legs.iter().flat_map(extract_leg_coordinates).collect()
}

/// Decoded path of a single leg, with the same skipping rule.
pub fn extract_leg_coordinates(leg: &Leg) -> Vec<Coordinate> {
    let mut coordinates = Vec::new();
    for (step_idx, step) in leg.steps.iter().enumerate() {
        match polyline::decode(&step.polyline.points) {
            Ok(points) => coordinates.extend(points),
            Err(err) => {
                tracing::warn!("skipping undecodable polyline in step {step_idx}: {err}")
            }
        }
    }
    coordinates
}

/// Pick every `stride`-th coordinate, where `stride = max(1, ceil(len / max_points))`.
///
/// The result starts with the first coordinate, holds at most `max_points`
/// entries and spreads them over the whole route. Spacing is positional, not
/// geographic.
pub fn select_waypoints(coordinates: &[Coordinate], max_points: usize) -> Vec<Coordinate> {
    let max_points = max_points.max(1);
    let stride = coordinates.len().div_ceil(max_points).max(1);
    coordinates.iter().step_by(stride).copied().collect()
}

pub fn approximate_distance_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EncodedPolyline, Step};

    fn line(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| Coordinate::new(-23.0 + i as f64 * 0.01, -46.0))
            .collect()
    }

    fn step(points: &[Coordinate]) -> Step {
        Step {
            polyline: EncodedPolyline {
                points: polyline::encode(points),
            },
        }
    }

    #[test]
    fn extracts_steps_across_legs_in_order() {
        let coords = line(6);
        let route = Route {
            legs: vec![
                Leg {
                    steps: vec![step(&coords[0..2]), step(&coords[2..4])],
                    ..Default::default()
                },
                Leg {
                    steps: vec![step(&coords[4..6])],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let extracted = extract_route_coordinates(&route);
        assert_eq!(extracted.len(), 6);
        for (got, want) in extracted.iter().zip(&coords) {
            assert!((got.lat - want.lat).abs() < 1e-5);
            assert!((got.lon - want.lon).abs() < 1e-5);
        }
    }

    #[test]
    fn broken_step_is_skipped() {
        let coords = line(2);
        let route = Route {
            legs: vec![Leg {
                steps: vec![
                    Step {
                        polyline: EncodedPolyline {
                            points: "_p~iF".to_string(),
                        },
                    },
                    step(&coords),
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(extract_route_coordinates(&route).len(), 2);
    }

    #[test]
    fn short_route_keeps_every_point() {
        let coords = line(10);
        assert_eq!(select_waypoints(&coords, 15), coords);
    }

    #[test]
    fn long_route_is_strided() {
        let coords = line(150);
        let picked = select_waypoints(&coords, 15);
        assert_eq!(picked.len(), 15);
        assert_eq!(picked[0], coords[0]);
        assert_eq!(picked[1], coords[10]);
        assert_eq!(picked[14], coords[140]);
    }

    #[test]
    fn uneven_length_reaches_end_of_route() {
        let coords = line(29);
        let picked = select_waypoints(&coords, 15);
        assert_eq!(picked.len(), 15);
        assert_eq!(picked[1], coords[2]);
        assert_eq!(picked[14], coords[28]);
    }

    #[test]
    fn slightly_long_route_stays_bounded() {
        let coords = line(16);
        let picked = select_waypoints(&coords, 15);
        assert_eq!(picked.len(), 8);
        assert_eq!(picked[7], coords[14]);
    }

    #[test]
    fn empty_route_yields_no_waypoints() {
        assert!(select_waypoints(&[], 15).is_empty());
    }

    #[test]
    fn zero_max_points_behaves_like_one() {
        let coords = line(5);
        assert_eq!(select_waypoints(&coords, 0), vec![coords[0]]);
    }

    #[test]
    fn test_haversine_same_point() {
        let point = Coordinate { lat: 45.0, lon: 5.0 };
        assert_eq!(haversine_km(point, point), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // São Paulo to Rio de Janeiro, roughly 360 km great-circle.
        let sp = Coordinate::new(-23.5505, -46.6333);
        let rj = Coordinate::new(-22.9068, -43.1729);
        let dist = haversine_km(sp, rj);
        assert!((dist - 360.0).abs() < 10.0, "{dist}");
    }

    #[test]
    fn test_approximate_distance_empty() {
        assert_eq!(approximate_distance_km(&[]), 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-90.0..=90.0, -180.0..=180.0).prop_map(|(lat, lon)| Coordinate { lat, lon })
        }

        proptest! {
            #[test]
            fn prop_waypoints_bounded_by_max(
                coords in prop::collection::vec(valid_coord(), 0..400),
                max_points in 1usize..40
            ) {
                let picked = select_waypoints(&coords, max_points);
                prop_assert!(picked.len() <= max_points);
            }

            #[test]
            fn prop_waypoints_cover_the_whole_route(
                coords in prop::collection::vec(valid_coord(), 1..400),
                max_points in 1usize..40
            ) {
                let picked = select_waypoints(&coords, max_points);
                let stride = coords.len().div_ceil(max_points);
                // the last pick lies within one stride of the final coordinate
                prop_assert!((picked.len() - 1) * stride + stride >= coords.len());
            }

            #[test]
            fn prop_waypoints_start_with_first_coordinate(
                coords in prop::collection::vec(valid_coord(), 1..400),
                max_points in 1usize..40
            ) {
                let picked = select_waypoints(&coords, max_points);
                prop_assert_eq!(picked[0], coords[0]);
            }

            #[test]
            fn prop_waypoints_are_a_subsequence(
                coords in prop::collection::vec(valid_coord(), 0..200),
                max_points in 1usize..40
            ) {
                let picked = select_waypoints(&coords, max_points);
                let mut rest = coords.iter();
                for p in &picked {
                    prop_assert!(rest.any(|c| c == p));
                }
            }

            #[test]
            fn prop_haversine_symmetric(a in valid_coord(), b in valid_coord()) {
                prop_assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-10);
            }

            #[test]
            fn prop_approximate_distance_non_negative(
                coords in prop::collection::vec(valid_coord(), 0..10)
            ) {
                prop_assert!(approximate_distance_km(&coords) >= 0.0);
            }
        }
    }
}
