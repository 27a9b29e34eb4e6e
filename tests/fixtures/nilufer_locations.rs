//! Collection points around Nilüfer and central Bursa.
//!
//! Coordinates are neighbourhood centres taken from OpenStreetMap, rounded
//! to four decimals. Close enough for road-factor distances, not for
//! turn-by-turn routing.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// Municipal depot all capacity-constrained routes start from.
pub const DEPOT: Location = Location::new("Nilüfer Depot", 40.1826, 29.0665);

// ============================================================================
// City centre trio: two close points and one a few kilometres away
// ============================================================================

pub const CENTRE_TRIO: &[Location] = &[
    Location::new("Setbaşı", 40.1950, 29.0600),
    Location::new("Heykel", 40.1975, 29.0618),
    Location::new("Çekirge", 40.2131, 29.0374),
];

// ============================================================================
// Nilüfer neighbourhoods
// ============================================================================

pub const NILUFER_NEIGHBOURHOODS: &[Location] = &[
    Location::new("Görükle", 40.2268, 28.8300),
    Location::new("Özlüce", 40.2280, 28.9450),
    Location::new("Balat", 40.2370, 28.9500),
    Location::new("Beşevler", 40.2166, 28.9670),
    Location::new("Altınşehir", 40.2000, 28.9700),
    Location::new("Fethiye", 40.2163, 28.9850),
    Location::new("29 Ekim", 40.2250, 28.9900),
    Location::new("Ataevler", 40.2200, 29.0030),
    Location::new("Üçevler", 40.2130, 29.0060),
    Location::new("Minareliçavuş", 40.2290, 29.0020),
    Location::new("Konak", 40.2070, 29.0100),
    Location::new("İhsaniye", 40.2210, 29.0180),
    Location::new("Karaman", 40.2050, 29.0250),
];

// ============================================================================
// Osmangazi side
// ============================================================================

pub const OSMANGAZI_LOCATIONS: &[Location] = &[
    Location::new("Soğanlı", 40.2180, 29.0450),
    Location::new("Hamitler", 40.2410, 29.0470),
    Location::new("Demirtaş", 40.2670, 29.0880),
    Location::new("Emek", 40.2480, 29.0200),
    Location::new("Yunuseli", 40.2260, 29.0950),
];

/// Returns all locations as a single list.
pub fn all_locations() -> Vec<Location> {
    let mut all = Vec::with_capacity(24);
    all.extend_from_slice(CENTRE_TRIO);
    all.extend_from_slice(NILUFER_NEIGHBOURHOODS);
    all.extend_from_slice(OSMANGAZI_LOCATIONS);
    all
}

/// Returns a subset of locations for smaller tests.
pub fn sample_locations(count: usize) -> Vec<Location> {
    all_locations().into_iter().take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_locations_count() {
        assert_eq!(all_locations().len(), 21);
    }

    #[test]
    fn test_coordinates_in_bursa_area() {
        for loc in all_locations() {
            assert!(loc.lat > 40.15 && loc.lat < 40.30, "{} lat out of range: {}", loc.name, loc.lat);
            assert!(loc.lng > 28.80 && loc.lng < 29.10, "{} lng out of range: {}", loc.name, loc.lng);
        }
    }
}
