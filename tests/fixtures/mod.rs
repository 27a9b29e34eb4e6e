//! Test fixtures for collection-planner.
//!
//! Provides realistic test data including:
//! - Real Bursa locations (Nilüfer and Osmangazi)
//! - Builders for points, fleets, and a planning harness

#![allow(dead_code)]

pub mod nilufer_locations;

pub use nilufer_locations::*;

use chrono::{DateTime, TimeZone, Utc};

use collection_planner::model::{PlanRequest, PlanResponse, Point, Vehicle, VehicleClass};
use collection_planner::reference::ReferenceTable;
use collection_planner::state::InMemoryStateTracker;
use collection_planner::traits::UrgencySource;
use collection_planner::urgency::DeterministicUrgency;
use collection_planner::{plan, PlanContext, PlanError, PlannerConfig};

/// Monday 2025-11-03, a regular collection day.
pub fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 9, 0, 0).single().expect("valid timestamp")
}

/// Saturday 2025-11-01.
pub fn saturday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 1, 9, 0, 0).single().expect("valid timestamp")
}

/// Points with ids 1..=n in location order.
pub fn points_at(locations: &[Location]) -> Vec<Point> {
    locations
        .iter()
        .enumerate()
        .map(|(index, loc)| Point::new(index as i64 + 1, loc.name, loc.lat, loc.lng))
        .collect()
}

/// `count` vehicles of one class with ids 1..=count.
pub fn fleet(count: i64, class: VehicleClass) -> Vec<Vehicle> {
    (1..=count)
        .map(|id| Vehicle::new(id, class, format!("{}-{id}", class.tag())))
        .collect()
}

/// Owns everything a planning call borrows.
pub struct Harness {
    pub now: DateTime<Utc>,
    pub config: PlannerConfig,
    pub state: InMemoryStateTracker,
    pub reference: ReferenceTable,
    pub urgency: Box<dyn UrgencySource>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            now: monday(),
            config: PlannerConfig::default(),
            state: InMemoryStateTracker::new(),
            reference: ReferenceTable::new(),
            urgency: Box::new(DeterministicUrgency),
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn reference(mut self, reference: ReferenceTable) -> Self {
        self.reference = reference;
        self
    }

    pub fn urgency(mut self, urgency: impl UrgencySource + 'static) -> Self {
        self.urgency = Box::new(urgency);
        self
    }

    pub fn plan(&self, vehicles: Vec<Vehicle>, points: Vec<Point>) -> Result<PlanResponse, PlanError> {
        let request = PlanRequest { vehicles, points };
        let ctx = PlanContext {
            now: self.now,
            config: &self.config,
            state: &self.state,
            reference: &self.reference,
            urgency: self.urgency.as_ref(),
        };
        plan(&request, &ctx)
    }
}
