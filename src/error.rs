//! Error types, one enum per concern.

use std::io;

use crate::model::PointId;

/// Request validation failures. Raised before any planning work starts;
/// nothing past validation aborts a run.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("at least one vehicle is required")]
    NoVehicles,
    #[error("point {point_id} has invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates { point_id: PointId, lat: f64, lon: f64 },
    #[error("point {0} appears more than once in the request")]
    DuplicatePoint(PointId),
}

/// Scoring oracle failures. Never escape the urgency source: each one
/// triggers the deterministic fallback.
#[derive(thiserror::Error, Debug)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("oracle returned no text")]
    EmptyReply,
    #[error("no integer score in oracle reply: {0:?}")]
    Unparseable(String),
    #[error("oracle score {0} is outside 0..=100")]
    OutOfRange(u64),
}

/// State snapshot load/flush failures.
#[derive(thiserror::Error, Debug)]
pub enum StateError {
    #[error("state snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("state snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Planner configuration failures.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("road factor must be finite and at least 1.0, got {0}")]
    InvalidRoadFactor(f64),
    #[error("active load ratio must be in (0, 1], got {0}")]
    InvalidLoadRatio(f64),
}
