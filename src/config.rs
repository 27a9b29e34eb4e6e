//! Planner configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::allocator::AllocatorOptions;
use crate::calendar::HolidayCalendar;
use crate::error::ConfigError;
use crate::haversine::{DEFAULT_ROAD_FACTOR, RoadDistance};
use crate::model::Coordinates;
use crate::oracle::OracleConfig;
use crate::stats::ClassCatalog;

/// Where all capacity-constrained routes start and end.
pub const DEFAULT_DEPOT: Coordinates = Coordinates::new(40.1826, 29.0665);

/// Vehicles at or above this share of their capacity take no more work.
pub const DEFAULT_ACTIVE_LOAD_RATIO: f64 = 0.95;

/// Which assignment strategy a planning run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One angular sector per vehicle, sequenced by urgency and proximity.
    #[default]
    Partition,
    /// Round-robin nearest-first packing under per-class capacity.
    Capacity,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Partition => f.write_str("partition"),
            Strategy::Capacity => f.write_str("capacity"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "partition" => Ok(Strategy::Partition),
            "capacity" => Ok(Strategy::Capacity),
            other => Err(format!("unknown strategy {other:?}, expected partition or capacity")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub road_factor: f64,
    pub depot: Coordinates,
    pub strategy: Strategy,
    pub active_load_ratio: f64,
    pub classes: ClassCatalog,
    pub holidays: HolidayCalendar,
    /// Oracle endpoint settings. The API key is never read from files;
    /// see [`OracleConfig::from_env`].
    pub oracle: Option<OracleConfig>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            road_factor: DEFAULT_ROAD_FACTOR,
            depot: DEFAULT_DEPOT,
            strategy: Strategy::default(),
            active_load_ratio: DEFAULT_ACTIVE_LOAD_RATIO,
            classes: ClassCatalog::default(),
            holidays: HolidayCalendar::default(),
            oracle: None,
        }
    }
}

impl PlannerConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.road_factor.is_finite() || self.road_factor < 1.0 {
            return Err(ConfigError::InvalidRoadFactor(self.road_factor));
        }
        if !(self.active_load_ratio > 0.0 && self.active_load_ratio <= 1.0) {
            return Err(ConfigError::InvalidLoadRatio(self.active_load_ratio));
        }
        Ok(())
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_holidays(mut self, holidays: HolidayCalendar) -> Self {
        self.holidays = holidays;
        self
    }

    pub fn distance_model(&self) -> RoadDistance {
        RoadDistance::new(self.road_factor)
    }

    pub fn allocator_options(&self) -> AllocatorOptions {
        AllocatorOptions {
            depot: self.depot,
            active_load_ratio: self.active_load_ratio,
        }
    }
}
