//! Within-group visiting order.
//!
//! Greedy nearest-next blended with urgency: start at the most urgent point,
//! then repeatedly move to the point with the best mix of urgency (60%) and
//! proximity (40%). Not optimal, O(n²), fine for per-vehicle group sizes.

use std::cmp::Ordering;

use crate::traits::{DistanceModel, Located};
use crate::urgency::{ScoreBoard, MAX_SCORE};

pub const URGENCY_WEIGHT: f64 = 0.60;
pub const PROXIMITY_WEIGHT: f64 = 0.40;

/// Urgency assumed for unscored points when picking the next stop.
pub const UNSCORED_URGENCY: f64 = 50.0;

/// Order `items` for visiting. Returns a permutation of the input.
///
/// Candidates are considered most-urgent first (input order among equal
/// scores) and the first candidate reaching the best blended score wins.
pub fn sequence<T, D>(items: Vec<T>, scores: &ScoreBoard, distance: &D) -> Vec<T>
where
    T: Located,
    D: DistanceModel + ?Sized,
{
    if items.len() <= 1 {
        return items;
    }

    let locations: Vec<_> = items.iter().map(Located::coordinates).collect();
    let matrix = distance.matrix_for(&locations);
    let urgency: Vec<Option<f64>> = items.iter().map(|item| scores.score(item.point_id())).collect();

    let mut remaining: Vec<usize> = (0..items.len()).collect();
    remaining.sort_by(|&a, &b| {
        let a_score = urgency[a].unwrap_or(0.0);
        let b_score = urgency[b].unwrap_or(0.0);
        b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
    });

    let mut current = remaining.remove(0);
    let mut order = Vec::with_capacity(items.len());
    order.push(current);

    while !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f64::NEG_INFINITY;

        for (pos, &candidate) in remaining.iter().enumerate() {
            let priority = urgency[candidate].unwrap_or(UNSCORED_URGENCY) / MAX_SCORE;
            let proximity = 1.0 / (1.0 + matrix[current][candidate]);
            let combined = URGENCY_WEIGHT * priority + PROXIMITY_WEIGHT * proximity;

            if combined > best_score {
                best_score = combined;
                best_pos = pos;
            }
        }

        current = remaining.remove(best_pos);
        order.push(current);
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order.into_iter().filter_map(|index| slots[index].take()).collect()
}
