//! Timezone lookup for event coordinates.
//!
//! The dashboard only needs a fixed offset and a short label per event, so the
//! lookup is an opaque function of `(latitude, longitude)`. [`ZoneTable`] is a
//! small static implementation; anything else (a closure, a proper tz
//! database) can be plugged in through [`TimezoneLookup`].

use serde::{Deserialize, Serialize};

/// Offset from UTC plus its display label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneOffset {
    pub offset_minutes: i32,
    pub label: String,
}

impl ZoneOffset {
    pub fn new(offset_minutes: i32, label: impl Into<String>) -> Self {
        Self {
            offset_minutes,
            label: label.into(),
        }
    }
}

pub trait TimezoneLookup {
    /// Returns `None` when no explicit zone entry covers the coordinates.
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<ZoneOffset>;
}

impl<F> TimezoneLookup for F
where
    F: Fn(f64, f64) -> Option<ZoneOffset>,
{
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<ZoneOffset> {
        self(latitude, longitude)
    }
}

/// Offset used when the lookup has no entry: one hour per 15 degrees of
/// longitude.
///
/// Halves round toward positive infinity, so `-7.5` maps to `UTC` and `7.5`
/// to `UTC+1`. Longitudes outside `[-180, 180]` are wrapped back into it, so
/// the offset always stays within ±12 hours.
pub fn fallback_zone(longitude: f64) -> ZoneOffset {
    let longitude = if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    };
    // NaN casts to 0
    let hours = ((longitude / 15.0 + 0.5).floor() as i32).clamp(-12, 12);
    let label = match hours {
        0 => "UTC".to_string(),
        h if h > 0 => format!("UTC+{h}"),
        h => format!("UTC{h}"),
    };
    ZoneOffset::new(hours * 60, label)
}

pub fn resolve_zone(zones: &dyn TimezoneLookup, latitude: f64, longitude: f64) -> ZoneOffset {
    zones
        .lookup(latitude, longitude)
        .unwrap_or_else(|| fallback_zone(longitude))
}

/// One rectangular entry of a [`ZoneTable`]. Edges are inclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneRegion {
    pub label: String,
    pub offset_minutes: i32,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl ZoneRegion {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.lat_min
            && latitude <= self.lat_max
            && longitude >= self.lon_min
            && longitude <= self.lon_max
    }
}

/// First-match list of zone regions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneTable {
    regions: Vec<ZoneRegion>,
}

impl ZoneTable {
    pub fn new(regions: Vec<ZoneRegion>) -> Self {
        Self { regions }
    }

    /// Standard-time boxes for a few seismically active regions.
    pub fn builtin() -> Self {
        let region = |label: &str, offset_minutes: i32, lat: (f64, f64), lon: (f64, f64)| ZoneRegion {
            label: label.to_string(),
            offset_minutes,
            lat_min: lat.0,
            lat_max: lat.1,
            lon_min: lon.0,
            lon_max: lon.1,
        };
        Self::new(vec![
            region("HST", -600, (18.0, 23.0), (-161.0, -154.0)),
            region("AKST", -540, (51.0, 72.0), (-180.0, -129.0)),
            region("PST", -480, (32.0, 49.0), (-125.0, -114.0)),
            region("MST", -420, (31.0, 49.0), (-114.0, -102.0)),
            region("JST", 540, (24.0, 46.0), (122.0, 146.0)),
            region("NZST", 720, (-48.0, -34.0), (166.0, 179.0)),
            region("CLT", -240, (-56.0, -17.0), (-76.0, -66.0)),
        ])
    }

    /// Appends `other`'s regions after this table's own.
    pub fn extend(&mut self, other: ZoneTable) {
        self.regions.extend(other.regions);
    }

    pub fn regions(&self) -> &[ZoneRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl TimezoneLookup for ZoneTable {
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<ZoneOffset> {
        self.regions
            .iter()
            .find(|r| r.contains(latitude, longitude))
            .map(|r| ZoneOffset::new(r.offset_minutes, r.label.clone()))
    }
}
