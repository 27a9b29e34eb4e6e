//! Capacity-constrained round-robin allocation.
//!
//! Every vehicle starts at the depot. Each round, every vehicle that still
//! has room takes the nearest unassigned item from its pool that fits, so
//! work is interleaved across the fleet instead of the first vehicle
//! draining the pool. Rounds continue until one assigns nothing.

use tracing::{debug, info};

use crate::model::{Coordinates, Pool, PointId, UnassignedPoint, UnassignedReason, Vehicle, VehicleClass, VehicleId};
use crate::stats::ClassCatalog;
use crate::traits::{DistanceModel, Located};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocatorOptions {
    pub depot: Coordinates,
    /// A vehicle stops taking work once its load reaches this share of capacity.
    pub active_load_ratio: f64,
}

/// A discrete piece of work: one point, its pickup weight and pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkItem {
    pub point_id: PointId,
    pub coordinates: Coordinates,
    pub load_kg: u32,
    pub pool: Pool,
}

impl WorkItem {
    pub fn new(point_id: PointId, coordinates: Coordinates, load_kg: u32, pool: Pool) -> Self {
        Self {
            point_id,
            coordinates,
            load_kg,
            pool,
        }
    }
}

impl Located for WorkItem {
    fn point_id(&self) -> PointId {
        self.point_id
    }

    fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocatedStop {
    pub point_id: PointId,
    pub coordinates: Coordinates,
    pub load_kg: u32,
    /// Distance from the previous stop (or the depot).
    pub leg_km: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRoute {
    pub vehicle_id: VehicleId,
    pub class: VehicleClass,
    pub capacity_kg: u32,
    pub stops: Vec<AllocatedStop>,
    pub load_kg: u32,
    /// Total distance including the final leg back to the depot.
    pub distance_km: f64,
}

impl VehicleRoute {
    pub fn utilization(&self) -> f64 {
        if self.capacity_kg == 0 {
            return 0.0;
        }
        self.load_kg as f64 / self.capacity_kg as f64
    }

    pub fn stop_ids(&self) -> Vec<PointId> {
        self.stops.iter().map(|stop| stop.point_id).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// One route per vehicle, in fleet order.
    pub routes: Vec<VehicleRoute>,
    pub unassigned: Vec<UnassignedPoint>,
    /// Rounds run, including the final one that assigned nothing.
    pub rounds: usize,
}

impl Allocation {
    pub fn route_for(&self, vehicle: VehicleId) -> Option<&VehicleRoute> {
        self.routes.iter().find(|route| route.vehicle_id == vehicle)
    }
}

struct Cursor {
    location: Coordinates,
    route: VehicleRoute,
}

impl Cursor {
    fn is_active(&self, ratio: f64) -> bool {
        (self.route.load_kg as f64) < self.route.capacity_kg as f64 * ratio
    }
}

pub fn allocate<D>(
    items: &[WorkItem],
    vehicles: &[Vehicle],
    catalog: &ClassCatalog,
    options: &AllocatorOptions,
    distance: &D,
) -> Allocation
where
    D: DistanceModel + ?Sized,
{
    let mut assigned = vec![false; items.len()];
    let mut cursors: Vec<Cursor> = vehicles
        .iter()
        .map(|vehicle| Cursor {
            location: options.depot,
            route: VehicleRoute {
                vehicle_id: vehicle.id,
                class: vehicle.class,
                capacity_kg: catalog.capacity_kg(vehicle.class),
                stops: Vec::new(),
                load_kg: 0,
                distance_km: 0.0,
            },
        })
        .collect();

    info!(
        items = items.len(),
        crane_items = items.iter().filter(|item| item.pool == Pool::Crane).count(),
        vehicles = vehicles.len(),
        "capacity allocation started"
    );

    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut made = 0;

        for cursor in cursors.iter_mut() {
            if !cursor.is_active(options.active_load_ratio) {
                continue;
            }

            let pool = cursor.route.class.pool();
            let mut best: Option<(usize, f64)> = None;

            for (index, item) in items.iter().enumerate() {
                if assigned[index] || item.pool != pool {
                    continue;
                }
                if cursor.route.load_kg.saturating_add(item.load_kg) > cursor.route.capacity_kg {
                    continue;
                }
                let km = distance.distance_km(cursor.location, item.coordinates);
                if best.is_none_or(|(_, best_km)| km < best_km) {
                    best = Some((index, km));
                }
            }

            let Some((index, km)) = best else {
                continue;
            };

            let item = &items[index];
            assigned[index] = true;
            cursor.route.stops.push(AllocatedStop {
                point_id: item.point_id,
                coordinates: item.coordinates,
                load_kg: item.load_kg,
                leg_km: km,
            });
            cursor.route.load_kg += item.load_kg;
            cursor.route.distance_km += km;
            cursor.location = item.coordinates;
            made += 1;
        }

        debug!(
            round = rounds,
            assignments = made,
            remaining = assigned.iter().filter(|done| !**done).count(),
            "allocation round finished"
        );

        if made == 0 {
            break;
        }
    }

    let routes: Vec<VehicleRoute> = cursors
        .into_iter()
        .map(|cursor| {
            let mut route = cursor.route;
            if !route.stops.is_empty() {
                route.distance_km += distance.distance_km(cursor.location, options.depot);
            }
            route
        })
        .collect();

    let unassigned: Vec<UnassignedPoint> = items
        .iter()
        .zip(&assigned)
        .filter(|(_, done)| !**done)
        .map(|(item, _)| {
            let eligible = vehicles.iter().any(|vehicle| vehicle.class.pool() == item.pool);
            UnassignedPoint {
                point_id: item.point_id,
                reason: if eligible {
                    UnassignedReason::CapacityExhausted
                } else {
                    UnassignedReason::NoEligibleVehicle
                },
            }
        })
        .collect();

    info!(
        rounds,
        assigned = items.len() - unassigned.len(),
        unassigned = unassigned.len(),
        "capacity allocation finished"
    );

    Allocation {
        routes,
        unassigned,
        rounds,
    }
}
