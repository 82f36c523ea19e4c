//! A headless dashboard: the three linked views plus their coordinator,
//! driven by scripted interaction steps.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use quakescope_charts::prelude::*;
use quakescope_core::EventStore;
use serde::Deserialize;
use thiserror::Error;

/// Nominal plot width; brushes in scripts are given in data units, so this
/// only affects hover lookups.
const LINE_WIDTH_PX: f64 = 800.0;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The coordinator refused the change.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Bar index past the end of the current histogram.
    #[error("histogram has no bin {index} (it has {len})")]
    NoSuchBin { index: usize, len: usize },

    /// Not `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
    #[error("invalid local time {0:?}")]
    InvalidTime(String),

    /// Playback requested while the map shows no events.
    #[error("map has no events to play back")]
    NothingToPlay,

    /// Step requested before `playback_start`.
    #[error("playback is not running")]
    NotPlaying,
}

/// Parse a local wall-clock time; a bare date means midnight.
pub fn parse_local_time(s: &str) -> Result<NaiveDateTime, SessionError> {
    let s = s.trim();
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(t);
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(t);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| SessionError::InvalidTime(s.to_string()))
}

fn one() -> u32 {
    1
}

/// One scripted user interaction.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    BrushMap {
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    },
    BrushTime {
        from: String,
        to: String,
    },
    BrushMagnitude {
        min: f64,
        max: f64,
    },
    BrushDepth {
        min: f64,
        max: f64,
    },
    SelectBin {
        index: usize,
    },
    SetMetric {
        metric: HistogramMetric,
    },
    Reset {
        view: ViewKind,
    },
    ResetAll,
    PlaybackStart,
    PlaybackForward {
        #[serde(default = "one")]
        days: u32,
    },
    PlaybackBackward {
        #[serde(default = "one")]
        days: u32,
    },
    PlaybackStop,
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::BrushMap { .. } => "brush_map",
            Step::BrushTime { .. } => "brush_time",
            Step::BrushMagnitude { .. } => "brush_magnitude",
            Step::BrushDepth { .. } => "brush_depth",
            Step::SelectBin { .. } => "select_bin",
            Step::SetMetric { .. } => "set_metric",
            Step::Reset { .. } => "reset",
            Step::ResetAll => "reset_all",
            Step::PlaybackStart => "playback_start",
            Step::PlaybackForward { .. } => "playback_forward",
            Step::PlaybackBackward { .. } => "playback_backward",
            Step::PlaybackStop => "playback_stop",
        }
    }
}

/// Replay script file: a list of `[[step]]` tables.
#[derive(Debug, Default, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

pub struct Session {
    coordinator: Coordinator,
    map: MapViewHandle,
    histogram: HistogramViewHandle,
    line: LineChartViewHandle,
}

impl Session {
    pub fn new(store: EventStore, metric: HistogramMetric) -> Result<Self, FilterError> {
        let map = MapViewHandle::new(MapView::new());
        let histogram = HistogramViewHandle::new(HistogramView::new(metric));
        let line = LineChartViewHandle::new(LineChartView::new(LINE_WIDTH_PX));

        let mut coordinator = Coordinator::new(store);
        coordinator.register(map.clone())?;
        coordinator.register(histogram.clone())?;
        coordinator.register(line.clone())?;
        Ok(Self {
            coordinator,
            map,
            histogram,
            line,
        })
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn map(&self) -> &MapViewHandle {
        &self.map
    }

    pub fn histogram(&self) -> &HistogramViewHandle {
        &self.histogram
    }

    pub fn line(&self) -> &LineChartViewHandle {
        &self.line
    }

    pub fn apply(&mut self, step: &Step) -> Result<(), SessionError> {
        tracing::debug!(action = step.action(), "applying step");
        match step {
            Step::BrushMap {
                lat_min,
                lat_max,
                lon_min,
                lon_max,
            } => {
                if let Some(msg) = self.drag_map((*lat_max, *lon_min), (*lat_min, *lon_max)) {
                    self.coordinator.dispatch(msg)?;
                }
            }
            Step::BrushTime { from, to } => {
                let range = TimeRange::new(parse_local_time(from)?, parse_local_time(to)?);
                self.coordinator
                    .on_brush_end(ViewKind::TimeSeries, range.map(Selection::Time))?;
            }
            Step::BrushMagnitude { min, max } => {
                let range = ValueRange::new(*min, *max);
                self.coordinator
                    .on_brush_end(ViewKind::Histogram, range.map(Selection::Magnitude))?;
            }
            Step::BrushDepth { min, max } => {
                let range = ValueRange::new(*min, *max);
                self.coordinator
                    .on_brush_end(ViewKind::Histogram, range.map(Selection::Depth))?;
            }
            Step::SelectBin { index } => {
                let msg = {
                    let histogram = self.histogram.lock();
                    histogram.select_bin(*index).ok_or(SessionError::NoSuchBin {
                        index: *index,
                        len: histogram.bins().len(),
                    })?
                };
                self.coordinator.dispatch(msg)?;
            }
            Step::SetMetric { metric } => self.histogram.lock().set_metric(*metric),
            Step::Reset { view } => {
                self.coordinator.reset_filter(*view)?;
            }
            Step::ResetAll => {
                self.coordinator.reset_all()?;
            }
            Step::PlaybackStart => {
                self.map
                    .lock()
                    .start_playback()
                    .ok_or(SessionError::NothingToPlay)?;
            }
            Step::PlaybackForward { days } => {
                let mut map = self.map.lock();
                for _ in 0..*days {
                    map.step_forward().ok_or(SessionError::NotPlaying)?;
                }
            }
            Step::PlaybackBackward { days } => {
                let mut map = self.map.lock();
                for _ in 0..*days {
                    map.step_backward().ok_or(SessionError::NotPlaying)?;
                }
            }
            Step::PlaybackStop => self.map.lock().stop_playback(),
        }
        Ok(())
    }

    /// Draw a rectangle on the map the way a user would, restoring the
    /// previous interaction mode afterwards.
    fn drag_map(&self, from: (f64, f64), to: (f64, f64)) -> Option<BrushEnd> {
        let mut map = self.map.lock();
        let previous = map.mode();
        map.set_mode(MapMode::Brush);
        map.pointer_down(from.0, from.1);
        let msg = map.pointer_up(to.0, to.1);
        map.set_mode(previous);
        msg
    }
}
