//! Core seams of the collection planner.
//!
//! The planner owns none of the data behind these traits. Collection
//! timestamps, static reference data and the scoring oracle all live in the
//! surrounding service, which implements them for its own storage.

use chrono::{DateTime, Utc};

use crate::error::OracleError;
use crate::model::{Coordinates, PointId, VehicleId};
use crate::reference::ReferenceRecord;
use crate::urgency::{UrgencyInputs, UrgencyScore};

/// Anything with a position and a point identity: request points, work
/// items, or references to either.
pub trait Located {
    fn point_id(&self) -> PointId;

    /// Location coordinates (lat, lon).
    fn coordinates(&self) -> Coordinates;
}

impl<T: Located + ?Sized> Located for &T {
    fn point_id(&self) -> PointId {
        (**self).point_id()
    }

    fn coordinates(&self) -> Coordinates {
        (**self).coordinates()
    }
}

/// Travel distance between two coordinates, in kilometres.
pub trait DistanceModel {
    fn distance_km(&self, from: Coordinates, to: Coordinates) -> f64;

    /// Full distance matrix, indexed by the provided location order.
    fn matrix_for(&self, locations: &[Coordinates]) -> Vec<Vec<f64>> {
        let n = locations.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate() {
                if i != j {
                    matrix[i][j] = self.distance_km(*from, *to);
                }
            }
        }

        matrix
    }
}

/// Last-collection timestamps, the only state that outlives a planning call.
///
/// Implementations use interior mutability: planning only reads, the
/// service records collections as they are reported.
pub trait StateTracker {
    fn last_collected(&self, point: PointId) -> Option<DateTime<Utc>>;

    fn record_collected(&self, point: PointId, at: DateTime<Utc>, by: Option<VehicleId>);
}

/// Static per-point reference data keyed by point id.
///
/// Unknown points get [`ReferenceRecord::default`].
pub trait ReferenceSource {
    fn reference_for(&self, point: PointId) -> ReferenceRecord;
}

/// Best-effort text scorer (a hosted language model, usually).
pub trait ScoringOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Produces an urgency score for one point.
///
/// Implementations must always return a score; failures degrade to the
/// deterministic formula.
pub trait UrgencySource {
    fn score(&self, inputs: &UrgencyInputs) -> UrgencyScore;
}
