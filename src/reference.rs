//! Static per-point reference data.
//!
//! Rows arrive untyped from the ingestion side (CSV exports, mostly). Every
//! numeric field is parsed leniently: anything missing or malformed is
//! replaced by a documented default and the run continues.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::PointId;
use crate::traits::ReferenceSource;

/// Hours for an emptied container to fill up again.
pub const DEFAULT_FILL_HOURS: f64 = 24.0;
pub const DEFAULT_DAILY_WASTE_TONS: f64 = 10.0;
/// Fill percentage assumed for points that were never collected.
pub const DEFAULT_SEEDED_OCCUPANCY: f64 = 50.0;
pub const DEFAULT_LOAD_KG: u32 = 500;
/// Average pickup weight of one container.
pub const KG_PER_CONTAINER: u32 = 180;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub fill_hours: f64,
    pub daily_waste_tons: f64,
    pub seeded_occupancy: f64,
    /// Weight picked up at this point in one visit.
    pub load_kg: u32,
    /// Underground containers need a crane-equipped vehicle.
    pub requires_crane: bool,
}

impl Default for ReferenceRecord {
    fn default() -> Self {
        Self {
            fill_hours: DEFAULT_FILL_HOURS,
            daily_waste_tons: DEFAULT_DAILY_WASTE_TONS,
            seeded_occupancy: DEFAULT_SEEDED_OCCUPANCY,
            load_kg: DEFAULT_LOAD_KG,
            requires_crane: false,
        }
    }
}

impl ReferenceRecord {
    pub fn with_fill_hours(mut self, hours: f64) -> Self {
        self.fill_hours = hours;
        self
    }

    pub fn with_daily_waste(mut self, tons: f64) -> Self {
        self.daily_waste_tons = tons;
        self
    }

    pub fn with_seeded_occupancy(mut self, percent: f64) -> Self {
        self.seeded_occupancy = percent;
        self
    }

    pub fn with_load(mut self, kg: u32) -> Self {
        self.load_kg = kg;
        self
    }

    pub fn requiring_crane(mut self) -> Self {
        self.requires_crane = true;
        self
    }

    /// Build a typed record from an untyped row, substituting defaults.
    pub fn from_raw(row: &RawReferenceRow) -> Self {
        let fill_hours = match parse_field(row.fill_hours.as_deref(), "fill_hours", row) {
            Some(hours) if hours > 0.0 => hours,
            Some(hours) => {
                warn!(location = ?row.location_id, hours, "non-positive fill hours, using default");
                DEFAULT_FILL_HOURS
            }
            None => DEFAULT_FILL_HOURS,
        };

        let daily_waste_tons = parse_field(row.daily_waste_tons.as_deref(), "daily_waste_tons", row)
            .map(|tons| tons.max(0.0))
            .unwrap_or(DEFAULT_DAILY_WASTE_TONS);

        let seeded_occupancy = parse_field(row.current_occupancy.as_deref(), "current_occupancy", row)
            .map(|percent| percent.clamp(0.0, 100.0))
            .unwrap_or(DEFAULT_SEEDED_OCCUPANCY);

        let load_kg = parse_field(row.load_kg.as_deref(), "load_kg", row)
            .filter(|kg| *kg >= 0.0)
            .map(|kg| kg.round().min(u32::MAX as f64) as u32)
            .or_else(|| {
                parse_field(row.container_count.as_deref(), "container_count", row)
                    .filter(|count| *count >= 0.0)
                    .map(|count| (count.round() as u32).saturating_mul(KG_PER_CONTAINER))
            })
            .unwrap_or(DEFAULT_LOAD_KG);

        let requires_crane = match parse_field(row.underground_count.as_deref(), "underground_count", row) {
            Some(count) => count > 0.0,
            None => row
                .required_vehicle_type
                .as_deref()
                .is_some_and(|kind| kind.to_ascii_lowercase().contains("crane")),
        };

        Self {
            fill_hours,
            daily_waste_tons,
            seeded_occupancy,
            load_kg,
            requires_crane,
        }
    }
}

/// One untyped reference row as exported by the ingestion side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawReferenceRow {
    pub location_id: Option<String>,
    pub fill_hours: Option<String>,
    pub daily_waste_tons: Option<String>,
    pub current_occupancy: Option<String>,
    pub load_kg: Option<String>,
    pub container_count: Option<String>,
    pub underground_count: Option<String>,
    pub required_vehicle_type: Option<String>,
}

impl RawReferenceRow {
    /// Ids are exported as floats ("12.0") by some tools.
    pub fn point_id(&self) -> Option<PointId> {
        let value: f64 = self.location_id.as_deref()?.trim().parse().ok()?;
        value.is_finite().then(|| PointId(value.trunc() as i64))
    }
}

fn parse_field(value: Option<&str>, field: &'static str, row: &RawReferenceRow) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Some(parsed),
        _ => {
            warn!(location = ?row.location_id, field, value = raw, "malformed reference field, using default");
            None
        }
    }
}

/// In-memory reference data keyed by point id.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    records: HashMap<PointId, ReferenceRecord>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, point: PointId, record: ReferenceRecord) {
        self.records.insert(point, record);
    }

    pub fn with(mut self, point: i64, record: ReferenceRecord) -> Self {
        self.insert(PointId(point), record);
        self
    }

    /// Rows without a usable id are skipped. Later rows win on duplicate ids.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a RawReferenceRow>,
    {
        let mut table = Self::new();
        for row in rows {
            match row.point_id() {
                Some(id) => table.insert(id, ReferenceRecord::from_raw(row)),
                None => warn!(location = ?row.location_id, "reference row without a valid id, skipped"),
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ReferenceSource for ReferenceTable {
    fn reference_for(&self, point: PointId) -> ReferenceRecord {
        self.records.get(&point).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> RawReferenceRow {
        RawReferenceRow {
            location_id: Some(id.to_string()),
            ..RawReferenceRow::default()
        }
    }

    #[test]
    fn test_empty_row_gets_defaults() {
        let record = ReferenceRecord::from_raw(&row("1"));
        assert_eq!(record, ReferenceRecord::default());
    }

    #[test]
    fn test_parses_numeric_fields() {
        let raw = RawReferenceRow {
            fill_hours: Some("36".into()),
            daily_waste_tons: Some(" 12.5 ".into()),
            current_occupancy: Some("80".into()),
            load_kg: Some("640".into()),
            ..row("4")
        };
        let record = ReferenceRecord::from_raw(&raw);
        assert_eq!(record.fill_hours, 36.0);
        assert_eq!(record.daily_waste_tons, 12.5);
        assert_eq!(record.seeded_occupancy, 80.0);
        assert_eq!(record.load_kg, 640);
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let raw = RawReferenceRow {
            fill_hours: Some("soon".into()),
            daily_waste_tons: Some("N/A".into()),
            current_occupancy: Some("NaN".into()),
            ..row("2")
        };
        let record = ReferenceRecord::from_raw(&raw);
        assert_eq!(record.fill_hours, DEFAULT_FILL_HOURS);
        assert_eq!(record.daily_waste_tons, DEFAULT_DAILY_WASTE_TONS);
        assert_eq!(record.seeded_occupancy, DEFAULT_SEEDED_OCCUPANCY);
    }

    #[test]
    fn test_non_positive_fill_hours_fall_back() {
        let raw = RawReferenceRow {
            fill_hours: Some("0".into()),
            ..row("3")
        };
        assert_eq!(ReferenceRecord::from_raw(&raw).fill_hours, DEFAULT_FILL_HOURS);
    }

    #[test]
    fn test_load_from_container_count() {
        let raw = RawReferenceRow {
            container_count: Some("3".into()),
            ..row("5")
        };
        assert_eq!(ReferenceRecord::from_raw(&raw).load_kg, 3 * KG_PER_CONTAINER);
    }

    #[test]
    fn test_crane_requirement() {
        let underground = RawReferenceRow {
            underground_count: Some("2".into()),
            ..row("6")
        };
        assert!(ReferenceRecord::from_raw(&underground).requires_crane);

        let by_type = RawReferenceRow {
            required_vehicle_type: Some("Crane Truck".into()),
            ..row("7")
        };
        assert!(ReferenceRecord::from_raw(&by_type).requires_crane);

        let surface = RawReferenceRow {
            underground_count: Some("0".into()),
            required_vehicle_type: Some("Crane".into()),
            ..row("8")
        };
        assert!(!ReferenceRecord::from_raw(&surface).requires_crane);
    }

    #[test]
    fn test_float_ids() {
        assert_eq!(row("12.0").point_id(), Some(PointId(12)));
        assert_eq!(row("x").point_id(), None);
    }

    #[test]
    fn test_table_skips_rows_without_id_and_defaults_unknown() {
        let rows = vec![
            RawReferenceRow {
                fill_hours: Some("48".into()),
                ..row("1")
            },
            RawReferenceRow::default(),
        ];
        let table = ReferenceTable::from_rows(&rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table.reference_for(PointId(1)).fill_hours, 48.0);
        assert_eq!(table.reference_for(PointId(99)), ReferenceRecord::default());
    }
}
