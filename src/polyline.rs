//! Polyline representation for route geometries.
//!
//! Routes are kept as decoded coordinate sequences. Encoding to a compact
//! polyline string, if a map client wants one, happens at the API
//! boundary, not in the planner.

use serde::{Deserialize, Serialize};

use crate::model::Coordinates;
use crate::traits::{DistanceModel, Located};

/// A route geometry as decoded coordinates, serialized as `[[lat, lon], ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Coordinates>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinates>) -> Self {
        Self { points }
    }

    /// Geometry through the given stops, in order.
    pub fn from_stops<T: Located>(stops: &[T]) -> Self {
        Self::new(stops.iter().map(Located::coordinates).collect())
    }

    /// Depot, then each stop, then back to the depot. A route without
    /// stops never leaves the depot and has an empty geometry.
    pub fn round_trip(depot: Coordinates, stops: impl IntoIterator<Item = Coordinates>) -> Self {
        let mut points = vec![depot];
        points.extend(stops);
        if points.len() == 1 {
            return Self::default();
        }
        points.push(depot);
        Self::new(points)
    }

    pub fn points(&self) -> &[Coordinates] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinates> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of consecutive leg distances; zero for fewer than two points.
    pub fn length_km<D: DistanceModel + ?Sized>(&self, distance: &D) -> f64 {
        self.points
            .windows(2)
            .map(|leg| distance.distance_km(leg[0], leg[1]))
            .sum()
    }
}
