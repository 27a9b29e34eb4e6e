//! Collection timestamps shared across planning calls.
//!
//! [`InMemoryStateTracker`] keeps the timestamps behind a lock and can be
//! snapshotted to / restored from JSON. When to load and when to flush is
//! up to the owning service.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StateError;
use crate::model::{PointId, VehicleId};
use crate::traits::StateTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub last_collected_at: DateTime<Utc>,
    #[serde(default)]
    pub collected_by: Option<VehicleId>,
}

/// Serialized form of the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub location_states: BTreeMap<PointId, CollectionRecord>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct InMemoryStateTracker {
    records: RwLock<HashMap<PointId, CollectionRecord>>,
}

impl InMemoryStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        Self {
            records: RwLock::new(snapshot.location_states.into_iter().collect()),
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> StateSnapshot {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        StateSnapshot {
            location_states: records.iter().map(|(id, record)| (*id, *record)).collect(),
            last_updated: Some(now),
        }
    }

    pub fn record(&self, point: PointId) -> Option<CollectionRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(&point).copied()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load<R: Read>(reader: R) -> Result<Self, StateError> {
        let snapshot: StateSnapshot = serde_json::from_reader(reader)?;
        debug!(points = snapshot.location_states.len(), "state snapshot loaded");
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn flush<W: Write>(&self, writer: W, now: DateTime<Utc>) -> Result<(), StateError> {
        serde_json::to_writer_pretty(writer, &self.snapshot(now))?;
        Ok(())
    }

    /// Missing files yield an empty tracker.
    pub fn load_file(path: &Path) -> Result<Self, StateError> {
        if !path.exists() {
            debug!(path = %path.display(), "no state snapshot, starting empty");
            return Ok(Self::new());
        }
        Self::load(BufReader::new(File::open(path)?))
    }

    /// Writes to a temporary sibling first, then renames over `path`.
    pub fn flush_file(&self, path: &Path, now: DateTime<Utc>) -> Result<(), StateError> {
        let tmp_path = path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        self.flush(&mut writer, now)?;
        writer.flush()?;
        drop(writer);
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

impl StateTracker for InMemoryStateTracker {
    fn last_collected(&self, point: PointId) -> Option<DateTime<Utc>> {
        self.record(point).map(|record| record.last_collected_at)
    }

    fn record_collected(&self, point: PointId, at: DateTime<Utc>, by: Option<VehicleId>) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(
            point,
            CollectionRecord {
                last_collected_at: at,
                collected_by: by,
            },
        );
    }
}
