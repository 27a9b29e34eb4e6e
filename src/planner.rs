//! Planning entry point.
//!
//! A planning call validates the request, scores every point once, then runs
//! the configured [`Strategy`]:
//!
//! - `Partition`: one angular sector per vehicle. Sectors are ranked by total
//!   urgency and handed to vehicles in id order, then each sector is
//!   sequenced and measured on its own.
//! - `Capacity`: round-robin nearest-first packing under per-class capacity,
//!   with every route starting and ending at the depot.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::allocator::{allocate, Allocation, VehicleRoute, WorkItem};
use crate::config::{PlannerConfig, Strategy};
use crate::error::PlanError;
use crate::haversine::RoadDistance;
use crate::model::{
    Assignment, PlanMetadata, PlanRequest, PlanResponse, Point, Pool, PointId, Stop, UnassignedPoint, Vehicle,
};
use crate::partition::partition;
use crate::polyline::Polyline;
use crate::sequence::{sequence, UNSCORED_URGENCY};
use crate::stats::{round1, round2, RouteStats};
use crate::traits::{ReferenceSource, StateTracker, UrgencySource};
use crate::urgency::ScoreBoard;

pub const EMPTY_GROUP_LABEL: &str = "Empty";

/// Collaborators and settings for one planning call.
pub struct PlanContext<'a> {
    pub now: DateTime<Utc>,
    pub config: &'a PlannerConfig,
    pub state: &'a dyn StateTracker,
    pub reference: &'a dyn ReferenceSource,
    pub urgency: &'a dyn UrgencySource,
}

pub fn plan(request: &PlanRequest, ctx: &PlanContext<'_>) -> Result<PlanResponse, PlanError> {
    validate(request)?;

    let config = ctx.config;
    let non_collection_day = config.holidays.is_non_collection_at(ctx.now);

    info!(
        points = request.points.len(),
        vehicles = request.vehicles.len(),
        strategy = %config.strategy,
        non_collection_day,
        "planning started"
    );

    let mut vehicles: Vec<&Vehicle> = request.vehicles.iter().collect();
    vehicles.sort_by_key(|vehicle| vehicle.id);

    if request.points.is_empty() {
        let assignments = vehicles
            .iter()
            .map(|vehicle| Assignment::empty(vehicle, EMPTY_GROUP_LABEL))
            .collect();
        return Ok(finish(request, ctx, assignments, Vec::new(), non_collection_day, false));
    }

    let board = ScoreBoard::build(
        &request.points,
        ctx.urgency,
        ctx.state,
        ctx.reference,
        ctx.now,
        non_collection_day,
    );
    let distance = config.distance_model();

    let (assignments, unassigned) = match config.strategy {
        Strategy::Partition => (plan_partitioned(&request.points, &vehicles, &board, config, &distance), Vec::new()),
        Strategy::Capacity => plan_capacity(&request.points, &vehicles, &board, ctx, &distance),
    };

    Ok(finish(
        request,
        ctx,
        assignments,
        unassigned,
        non_collection_day,
        board.used_oracle(),
    ))
}

fn validate(request: &PlanRequest) -> Result<(), PlanError> {
    if request.vehicles.is_empty() {
        return Err(PlanError::NoVehicles);
    }

    let mut seen = HashSet::with_capacity(request.points.len());
    for point in &request.points {
        if !point.coordinates.is_valid() {
            return Err(PlanError::InvalidCoordinates {
                point_id: point.id,
                lat: point.coordinates.lat,
                lon: point.coordinates.lon,
            });
        }
        if !seen.insert(point.id) {
            return Err(PlanError::DuplicatePoint(point.id));
        }
    }
    Ok(())
}

fn plan_partitioned(
    points: &[Point],
    vehicles: &[&Vehicle],
    board: &ScoreBoard,
    config: &PlannerConfig,
    distance: &RoadDistance,
) -> Vec<Assignment> {
    let groups = partition(points, vehicles.len());

    let totals: Vec<f64> = groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|point| board.score(point.id).unwrap_or(UNSCORED_URGENCY))
                .sum()
        })
        .collect();

    let mut ranked: Vec<usize> = (0..groups.len()).collect();
    ranked.sort_by(|&a, &b| totals[b].partial_cmp(&totals[a]).unwrap_or(Ordering::Equal));

    let mut slots: Vec<Option<Vec<&Point>>> = groups.into_iter().map(Some).collect();
    let handed: Vec<(&Vehicle, Option<(usize, Vec<&Point>)>)> = vehicles
        .iter()
        .copied()
        .zip(
            ranked
                .into_iter()
                .map(|index| slots[index].take().map(|group| (index, group)))
                .chain(std::iter::repeat_with(|| None)),
        )
        .collect();

    handed
        .into_par_iter()
        .map(|(vehicle, group)| match group {
            Some((index, group)) => build_sector_route(vehicle, index, group, board, config, distance),
            None => Assignment::empty(vehicle, EMPTY_GROUP_LABEL),
        })
        .collect()
}

fn build_sector_route(
    vehicle: &Vehicle,
    index: usize,
    group: Vec<&Point>,
    board: &ScoreBoard,
    config: &PlannerConfig,
    distance: &RoadDistance,
) -> Assignment {
    let ordered = sequence(group, board, distance);
    let path = Polyline::from_stops(&ordered);
    let route_stats = RouteStats::from_distance(path.length_km(distance), &config.classes.factors(vehicle.class));

    debug!(
        vehicle = %vehicle.id,
        region = index + 1,
        stops = ordered.len(),
        distance_km = route_stats.distance_km,
        "sector route built"
    );

    let ordered_stops = ordered
        .iter()
        .enumerate()
        .map(|(position, point)| stop(position, point, board))
        .collect();

    Assignment {
        vehicle_id: vehicle.id,
        display_name: vehicle.display_name.clone(),
        vehicle_class: vehicle.class,
        ordered_stops,
        route_stats,
        group_label: format!("Region-{}", index + 1),
        load_kg: None,
        path,
    }
}

fn plan_capacity(
    points: &[Point],
    vehicles: &[&Vehicle],
    board: &ScoreBoard,
    ctx: &PlanContext<'_>,
    distance: &RoadDistance,
) -> (Vec<Assignment>, Vec<UnassignedPoint>) {
    let config = ctx.config;
    let items: Vec<WorkItem> = points
        .iter()
        .map(|point| {
            let record = ctx.reference.reference_for(point.id);
            let pool = if record.requires_crane { Pool::Crane } else { Pool::Standard };
            WorkItem::new(point.id, point.coordinates, record.load_kg, pool)
        })
        .collect();

    let fleet: Vec<Vehicle> = vehicles.iter().map(|vehicle| (*vehicle).clone()).collect();
    let Allocation { routes, unassigned, .. } =
        allocate(&items, &fleet, &config.classes, &config.allocator_options(), distance);

    let assignments = vehicles
        .iter()
        .zip(routes)
        .map(|(vehicle, route)| capacity_assignment(vehicle, route, points, board, config))
        .collect();

    (assignments, unassigned)
}

fn capacity_assignment(
    vehicle: &Vehicle,
    route: VehicleRoute,
    points: &[Point],
    board: &ScoreBoard,
    config: &PlannerConfig,
) -> Assignment {
    let path = Polyline::round_trip(config.depot, route.stops.iter().map(|stop| stop.coordinates));
    let route_stats = RouteStats::from_distance(route.distance_km, &config.classes.factors(vehicle.class));

    let ordered_stops = route
        .stops
        .iter()
        .filter_map(|allocated| find_point(points, allocated.point_id))
        .enumerate()
        .map(|(position, point)| stop(position, point, board))
        .collect();

    debug!(
        vehicle = %vehicle.id,
        stops = route.stops.len(),
        load_kg = route.load_kg,
        utilization = round2(route.utilization()),
        "capacity route built"
    );

    Assignment {
        vehicle_id: vehicle.id,
        display_name: vehicle.display_name.clone(),
        vehicle_class: vehicle.class,
        ordered_stops,
        route_stats,
        group_label: vehicle.class.pool().label().to_string(),
        load_kg: Some(route.load_kg),
        path,
    }
}

fn find_point(points: &[Point], id: PointId) -> Option<&Point> {
    points.iter().find(|point| point.id == id)
}

fn stop(position: usize, point: &Point, board: &ScoreBoard) -> Stop {
    Stop {
        sequence_index: position + 1,
        point_id: point.id,
        display_name: point.display_name.clone(),
        coordinates: point.coordinates,
        estimated_fill_percent: round1(board.fill_percent(point.id).unwrap_or(0.0)),
    }
}

fn finish(
    request: &PlanRequest,
    ctx: &PlanContext<'_>,
    assignments: Vec<Assignment>,
    unassigned: Vec<UnassignedPoint>,
    non_collection_day: bool,
    used_oracle: bool,
) -> PlanResponse {
    let total_distance_km = round2(assignments.iter().map(|a| a.route_stats.distance_km).sum());
    let total_co2_kg = round2(assignments.iter().map(|a| a.route_stats.co2_kg).sum());

    info!(
        assignments = assignments.len(),
        assigned_points = assignments.iter().map(|a| a.ordered_stops.len()).sum::<usize>(),
        unassigned = unassigned.len(),
        total_distance_km,
        total_co2_kg,
        used_oracle,
        "planning finished"
    );

    PlanResponse {
        assignments,
        unassigned,
        metadata: PlanMetadata {
            generated_at: ctx.now,
            is_non_collection_day: non_collection_day,
            total_distance_km,
            total_co2_kg,
            used_oracle,
            strategy: ctx.config.strategy,
            point_count: request.points.len(),
            vehicle_count: request.vehicles.len(),
        },
    }
}
