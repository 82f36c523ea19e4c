//! Brush selections.
//!
//! Constructors sanitize their input the same way for every kind: non-finite,
//! reversed and zero-extent values yield `None`, which callers treat as "no
//! filter". A value of these types therefore always describes a usable,
//! non-empty region.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::view::ViewKind;

/// Axis-aligned lat/lon rectangle. All edges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoBounds {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl GeoBounds {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Option<Self> {
        let finite = [lat_min, lat_max, lon_min, lon_max].iter().all(|v| v.is_finite());
        if !finite || !(lat_min < lat_max) || !(lon_min < lon_max) {
            return None;
        }
        Some(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    /// Bounds spanned by two opposite `(lat, lon)` corners in any order.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Option<Self> {
        Self::new(a.0.min(b.0), a.0.max(b.0), a.1.min(b.1), a.1.max(b.1))
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.lat_min
            && latitude <= self.lat_max
            && longitude >= self.lon_min
            && longitude <= self.lon_max
    }
}

/// Local-time interval, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Half-open numeric interval `[min, max)`, matching histogram bins.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ValueRange {
    min: f64,
    max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if !(min.is_finite() && max.is_finite()) || !(min < max) {
            return None;
        }
        Some(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v < self.max
    }
}

/// The record dimension a selection restricts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Location,
    Magnitude,
    Depth,
    LocalTime,
}

impl Dimension {
    /// The only view allowed to hold predicates over this dimension.
    pub fn owner(self) -> ViewKind {
        match self {
            Dimension::Location => ViewKind::Map,
            Dimension::Magnitude | Dimension::Depth => ViewKind::Histogram,
            Dimension::LocalTime => ViewKind::TimeSeries,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dimension::Location => "location",
            Dimension::Magnitude => "magnitude",
            Dimension::Depth => "depth",
            Dimension::LocalTime => "local time",
        })
    }
}

/// Value produced by a finished brush.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Bounds(GeoBounds),
    Time(TimeRange),
    Magnitude(ValueRange),
    Depth(ValueRange),
}

impl Selection {
    pub fn dimension(&self) -> Dimension {
        match self {
            Selection::Bounds(_) => Dimension::Location,
            Selection::Time(_) => Dimension::LocalTime,
            Selection::Magnitude(_) => Dimension::Magnitude,
            Selection::Depth(_) => Dimension::Depth,
        }
    }
}
