//! Request and response records exchanged with the transport layer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Strategy;
use crate::polyline::Polyline;
use crate::stats::RouteStats;
use crate::traits::Located;

/// Identifier of a collection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub i64);

/// Identifier of a vehicle (or its driver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub i64);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Latitude/longitude in degrees. Serialized as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and within lat ∈ [-90, 90], lon ∈ [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coords: Coordinates) -> Self {
        [coords.lat, coords.lon]
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// A collection point as received in a planning request.
///
/// Fill rate, waste volume and load come from the reference source; the
/// last-collection timestamp comes from the state tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub id: PointId,
    pub display_name: String,
    pub coordinates: Coordinates,
    #[serde(default, rename = "distanceFromDepot")]
    pub distance_from_depot_km: f64,
    #[serde(default)]
    pub population_served: u64,
}

impl Point {
    pub fn new(id: i64, display_name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: PointId(id),
            display_name: display_name.into(),
            coordinates: Coordinates::new(lat, lon),
            distance_from_depot_km: 0.0,
            population_served: 0,
        }
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.population_served = population;
        self
    }

    pub fn with_distance_from_depot(mut self, km: f64) -> Self {
        self.distance_from_depot_km = km;
        self
    }
}

impl Located for Point {
    fn point_id(&self) -> PointId {
        self.id
    }

    fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

/// Vehicle class tag. Capacity and cost factors are keyed by class.
///
/// Parsed leniently from free text; anything unrecognised is `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleClass {
    /// Crane-equipped truck, the only class able to empty underground containers.
    Crane,
    LargeTruck,
    SmallTruck,
    #[default]
    Standard,
}

impl VehicleClass {
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_lowercase();
        if normalized.contains("crane") {
            VehicleClass::Crane
        } else if normalized.contains("large") {
            VehicleClass::LargeTruck
        } else if normalized.contains("small") || normalized.contains("light") {
            VehicleClass::SmallTruck
        } else {
            VehicleClass::Standard
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            VehicleClass::Crane => "Crane",
            VehicleClass::LargeTruck => "Large Garbage Truck",
            VehicleClass::SmallTruck => "Small Garbage Truck",
            VehicleClass::Standard => "Standard",
        }
    }

    /// Work pool this class draws from in the capacity-constrained flow.
    pub fn pool(self) -> Pool {
        match self {
            VehicleClass::Crane => Pool::Crane,
            _ => Pool::Standard,
        }
    }
}

impl From<String> for VehicleClass {
    fn from(tag: String) -> Self {
        VehicleClass::from_tag(&tag)
    }
}

impl From<VehicleClass> for String {
    fn from(class: VehicleClass) -> Self {
        class.tag().to_string()
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Eligibility group of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    Crane,
    Standard,
}

impl Pool {
    pub fn label(self) -> &'static str {
        match self {
            Pool::Crane => "Crane pool",
            Pool::Standard => "Standard pool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    #[serde(default, rename = "classTag", alias = "class", alias = "type")]
    pub class: VehicleClass,
    #[serde(default)]
    pub display_name: String,
}

impl Vehicle {
    pub fn new(id: i64, class: VehicleClass, display_name: impl Into<String>) -> Self {
        Self {
            id: VehicleId(id),
            class,
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub vehicles: Vec<Vehicle>,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    /// 1-based position in the route.
    pub sequence_index: usize,
    pub point_id: PointId,
    pub display_name: String,
    pub coordinates: Coordinates,
    pub estimated_fill_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub vehicle_id: VehicleId,
    pub display_name: String,
    pub vehicle_class: VehicleClass,
    pub ordered_stops: Vec<Stop>,
    pub route_stats: RouteStats,
    pub group_label: String,
    /// Carried load; only the capacity-constrained flow tracks it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_kg: Option<u32>,
    pub path: Polyline,
}

impl Assignment {
    pub fn empty(vehicle: &Vehicle, group_label: impl Into<String>) -> Self {
        Self {
            vehicle_id: vehicle.id,
            display_name: vehicle.display_name.clone(),
            vehicle_class: vehicle.class,
            ordered_stops: Vec::new(),
            route_stats: RouteStats::default(),
            group_label: group_label.into(),
            load_kg: None,
            path: Polyline::new(Vec::new()),
        }
    }

    pub fn stop_ids(&self) -> Vec<PointId> {
        self.ordered_stops.iter().map(|stop| stop.point_id).collect()
    }
}

/// Why a point ended up without a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnassignedReason {
    /// No vehicle in the fleet serves the point's pool.
    NoEligibleVehicle,
    /// Eligible vehicles exist but none had room left.
    CapacityExhausted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedPoint {
    pub point_id: PointId,
    pub reason: UnassignedReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub generated_at: DateTime<Utc>,
    pub is_non_collection_day: bool,
    pub total_distance_km: f64,
    pub total_co2_kg: f64,
    pub used_oracle: bool,
    pub strategy: Strategy,
    pub point_count: usize,
    pub vehicle_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub unassigned: Vec<UnassignedPoint>,
    pub metadata: PlanMetadata,
}

impl PlanResponse {
    pub fn assignment_for(&self, vehicle: VehicleId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.vehicle_id == vehicle)
    }

    pub fn assigned_point_count(&self) -> usize {
        self.assignments.iter().map(|a| a.ordered_stops.len()).sum()
    }
}
