//! collection-planner core
//!
//! Urgency-aware assignment and sequencing of waste collection points for a
//! vehicle fleet. Storage, ingestion and the scoring service stay outside
//! the crate behind the traits in [`traits`].

pub mod traits;
pub mod model;
pub mod error;
pub mod config;
pub mod haversine;
pub mod calendar;
pub mod reference;
pub mod state;
pub mod urgency;
pub mod oracle;
pub mod partition;
pub mod sequence;
pub mod allocator;
pub mod stats;
pub mod polyline;
pub mod planner;

pub use config::{PlannerConfig, Strategy};
pub use error::PlanError;
pub use planner::{plan, PlanContext};
