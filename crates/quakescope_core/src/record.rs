use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// One normalized seismic event.
///
/// Created once at ingestion and never mutated afterwards; the local time and
/// its label are derived from the coordinates at that point and not recomputed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: f64,
    /// Kilometers below the surface.
    pub depth: f64,
    pub occurred_at_utc: DateTime<Utc>,
    /// Wall-clock time at the epicenter.
    pub occurred_at_local: NaiveDateTime,
    pub local_timezone_label: String,
    pub place: String,
    /// `dmin` in the source data.
    pub duration_proxy: f64,
}

impl EventRecord {
    pub fn local_date(&self) -> NaiveDate {
        self.occurred_at_local.date()
    }

    pub fn local_year(&self) -> i32 {
        self.occurred_at_local.year()
    }
}

/// The full ingested dataset.
///
/// This is the single source of truth every view derives from. Cloning is
/// cheap (shared slice) and there is no way to obtain mutable access.
#[derive(Clone, Debug, Default)]
pub struct EventStore {
    records: Arc<[EventRecord]>,
}

impl EventStore {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&EventRecord> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.records.iter()
    }

    /// Whether both handles share the same underlying records.
    pub fn same_source(&self, other: &EventStore) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}

impl From<Vec<EventRecord>> for EventStore {
    fn from(records: Vec<EventRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a EventStore {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
