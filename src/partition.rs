//! Angular partitioning of points into balanced geographic groups.
//!
//! Points are ordered by polar angle around their centroid and cut into
//! contiguous chunks, so each group covers one sector of the area and
//! routes from different groups do not criss-cross.

use crate::model::Coordinates;
use crate::traits::Located;

/// Mean latitude/longitude, or `None` for an empty slice.
pub fn centroid<T: Located>(items: &[T]) -> Option<Coordinates> {
    if items.is_empty() {
        return None;
    }
    let n = items.len() as f64;
    let (lat_sum, lon_sum) = items.iter().fold((0.0, 0.0), |(lat, lon), item| {
        let coords = item.coordinates();
        (lat + coords.lat, lon + coords.lon)
    });
    Some(Coordinates::new(lat_sum / n, lon_sum / n))
}

/// Split `items` into `k` angular sectors of near-equal size.
///
/// The first `n % k` groups hold one extra item. `k == 0` or no items gives
/// no groups; `k >= n` gives one singleton group per item in input order.
/// Equal angles keep their input order.
pub fn partition<T: Located>(items: &[T], k: usize) -> Vec<Vec<&T>> {
    if k == 0 || items.is_empty() {
        return Vec::new();
    }

    if k >= items.len() {
        return items.iter().map(|item| vec![item]).collect();
    }

    let Some(center) = centroid(items) else {
        return Vec::new();
    };

    let mut by_angle: Vec<(f64, &T)> = items
        .iter()
        .map(|item| {
            let coords = item.coordinates();
            ((coords.lat - center.lat).atan2(coords.lon - center.lon), item)
        })
        .collect();
    by_angle.sort_by(|a, b| a.0.total_cmp(&b.0));

    let size = by_angle.len() / k;
    let remainder = by_angle.len() % k;

    let mut groups = Vec::with_capacity(k);
    let mut sorted = by_angle.into_iter().map(|(_, item)| item);
    for i in 0..k {
        let chunk = size + usize::from(i < remainder);
        groups.push(sorted.by_ref().take(chunk).collect());
    }

    groups
}
