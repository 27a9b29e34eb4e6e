//! Property tests for the distance model and the assignment algorithms.

use proptest::prelude::*;

use collection_planner::allocator::{allocate, AllocatorOptions, WorkItem};
use collection_planner::haversine::{haversine_km, RoadDistance};
use collection_planner::model::{Coordinates, Point, PointId, Pool, Vehicle, VehicleClass};
use collection_planner::partition::partition;
use collection_planner::sequence::sequence;
use collection_planner::stats::ClassCatalog;
use collection_planner::traits::DistanceModel;
use collection_planner::urgency::ScoreBoard;

fn bursa_coords() -> impl Strategy<Value = Coordinates> {
    (40.10f64..40.35, 28.80f64..29.20).prop_map(|(lat, lon)| Coordinates::new(lat, lon))
}

fn any_coords() -> impl Strategy<Value = Coordinates> {
    (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinates::new(lat, lon))
}

fn points(max: usize) -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(bursa_coords(), 0..max).prop_map(|coords| {
        coords
            .into_iter()
            .enumerate()
            .map(|(index, c)| Point::new(index as i64 + 1, format!("p{index}"), c.lat, c.lon))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn distance_is_symmetric_and_non_negative(a in any_coords(), b in any_coords()) {
        let model = RoadDistance::default();
        let ab = model.distance_km(a, b);
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - model.distance_km(b, a)).abs() < 1e-9);
        prop_assert_eq!(model.distance_km(a, a), 0.0);
    }

    #[test]
    fn distance_obeys_triangle_inequality(a in bursa_coords(), b in bursa_coords(), c in bursa_coords()) {
        let direct = haversine_km(a, c);
        let detour = haversine_km(a, b) + haversine_km(b, c);
        prop_assert!(direct <= detour + 1e-9);
    }

    #[test]
    fn partition_covers_input_with_balanced_sizes(points in points(40), k in 1usize..8) {
        let groups = partition(&points, k);
        let total: usize = groups.iter().map(Vec::len).sum();
        prop_assert_eq!(total, points.len());
        prop_assert!(groups.len() <= k.max(points.len()));

        if let (Some(max), Some(min)) = (groups.iter().map(Vec::len).max(), groups.iter().map(Vec::len).min()) {
            prop_assert!(max - min <= 1);
            prop_assert!(min >= 1);
        }
    }

    #[test]
    fn sequence_is_a_permutation(points in points(25), seed in any::<u64>()) {
        let scores: ScoreBoard = points
            .iter()
            .map(|p| (p.id, ((p.id.0 as u64).wrapping_mul(seed) % 101) as f64))
            .collect();
        let ordered = sequence(points.iter().collect(), &scores, &RoadDistance::default());

        let mut ids: Vec<PointId> = ordered.iter().map(|p| p.id).collect();
        ids.sort();
        let expected: Vec<PointId> = points.iter().map(|p| p.id).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn allocator_respects_capacity(
        coords in prop::collection::vec(bursa_coords(), 0..30),
        loads in prop::collection::vec(100u32..5_000, 30),
        crane_mask in prop::collection::vec(any::<bool>(), 30),
        trucks in 1i64..4,
    ) {
        let work: Vec<WorkItem> = coords
            .iter()
            .enumerate()
            .map(|(index, c)| {
                let pool = if crane_mask[index] { Pool::Crane } else { Pool::Standard };
                WorkItem::new(PointId(index as i64 + 1), *c, loads[index], pool)
            })
            .collect();
        let mut vehicles: Vec<Vehicle> = (1..=trucks)
            .map(|id| Vehicle::new(id, VehicleClass::Standard, ""))
            .collect();
        vehicles.push(Vehicle::new(100, VehicleClass::Crane, ""));

        let options = AllocatorOptions {
            depot: Coordinates::new(40.1826, 29.0665),
            active_load_ratio: 0.95,
        };
        let allocation = allocate(&work, &vehicles, &ClassCatalog::default(), &options, &RoadDistance::default());

        let mut seen = Vec::new();
        for route in &allocation.routes {
            prop_assert!(route.load_kg <= route.capacity_kg);
            let load: u32 = route.stops.iter().map(|s| s.load_kg).sum();
            prop_assert_eq!(load, route.load_kg);
            for stop in &route.stops {
                let item = &work[(stop.point_id.0 - 1) as usize];
                prop_assert_eq!(item.pool, route.class.pool());
                seen.push(stop.point_id);
            }
        }
        seen.extend(allocation.unassigned.iter().map(|u| u.point_id));
        seen.sort();
        let expected: Vec<PointId> = work.iter().map(|item| item.point_id).collect();
        prop_assert_eq!(seen, expected);
    }
}
