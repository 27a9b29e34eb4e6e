//! Route statistics: distance, emissions, fuel and cost per vehicle class.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::VehicleClass;
use crate::polyline::Polyline;
use crate::traits::{DistanceModel, Located};

/// Per-class capacity and linear cost factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassFactors {
    pub capacity_kg: u32,
    pub co2_kg_per_km: f64,
    pub fuel_l_per_100km: f64,
    pub cost_per_km: f64,
}

impl ClassFactors {
    pub const CRANE: Self = Self {
        capacity_kg: 12_000,
        co2_kg_per_km: 6.29,
        fuel_l_per_100km: 234.77,
        cost_per_km: 105.65,
    };
    pub const LARGE_TRUCK: Self = Self {
        capacity_kg: 8_000,
        co2_kg_per_km: 1.59,
        fuel_l_per_100km: 59.5,
        cost_per_km: 26.78,
    };
    pub const SMALL_TRUCK: Self = Self {
        capacity_kg: 4_000,
        co2_kg_per_km: 0.67,
        fuel_l_per_100km: 25.0,
        cost_per_km: 11.25,
    };
    pub const STANDARD: Self = Self {
        capacity_kg: 8_000,
        co2_kg_per_km: 1.59,
        fuel_l_per_100km: 59.5,
        cost_per_km: 26.78,
    };
}

/// Factor table keyed by vehicle class.
///
/// Lookups never fail: a class missing from the table uses the `Standard`
/// entry, and a table without `Standard` uses the built-in standard factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCatalog {
    classes: BTreeMap<VehicleClass, ClassFactors>,
}

impl Default for ClassCatalog {
    fn default() -> Self {
        let classes = [
            (VehicleClass::Crane, ClassFactors::CRANE),
            (VehicleClass::LargeTruck, ClassFactors::LARGE_TRUCK),
            (VehicleClass::SmallTruck, ClassFactors::SMALL_TRUCK),
            (VehicleClass::Standard, ClassFactors::STANDARD),
        ]
        .into_iter()
        .collect();
        Self { classes }
    }
}

impl ClassCatalog {
    pub fn empty() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, class: VehicleClass, factors: ClassFactors) -> Self {
        self.classes.insert(class, factors);
        self
    }

    pub fn factors(&self, class: VehicleClass) -> ClassFactors {
        self.classes
            .get(&class)
            .or_else(|| self.classes.get(&VehicleClass::Standard))
            .copied()
            .unwrap_or(ClassFactors::STANDARD)
    }

    pub fn capacity_kg(&self, class: VehicleClass) -> u32 {
        self.factors(class).capacity_kg
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub distance_km: f64,
    pub co2_kg: f64,
    pub fuel_l: f64,
    #[serde(rename = "costTL")]
    pub cost_tl: f64,
}

impl RouteStats {
    /// Stats for a known route distance. Values are rounded to 2 decimals.
    pub fn from_distance(distance_km: f64, factors: &ClassFactors) -> Self {
        let distance_km = distance_km.max(0.0);
        Self {
            distance_km: round2(distance_km),
            co2_kg: round2(distance_km * factors.co2_kg_per_km),
            fuel_l: round2(distance_km * factors.fuel_l_per_100km / 100.0),
            cost_tl: round2(distance_km * factors.cost_per_km),
        }
    }

    /// Stats for visiting `points` in order, with no depot legs.
    pub fn for_route<T, D>(points: &[T], class: VehicleClass, catalog: &ClassCatalog, distance: &D) -> Self
    where
        T: Located,
        D: DistanceModel + ?Sized,
    {
        let length = Polyline::from_stops(points).length_km(distance);
        Self::from_distance(length, &catalog.factors(class))
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
