use std::io::{self, Write};

use chrono::NaiveDateTime;
use quakescope_charts::prelude::*;
use quakescope_charts::{format_short_date, format_tick};
use serde::Serialize;

use crate::session::Session;

#[derive(Debug, Serialize)]
pub struct PlaybackWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub can_step_forward: bool,
    pub can_step_backward: bool,
}

#[derive(Debug, Serialize)]
pub struct MapState {
    pub mode: &'static str,
    pub displayed: usize,
    pub bounds: Option<GeoBounds>,
    pub playback: Option<PlaybackWindow>,
}

#[derive(Debug, Serialize)]
pub struct HistogramState {
    pub metric: HistogramMetric,
    pub bins: Vec<Bin>,
}

/// Dashboard state after one interaction.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    pub total: usize,
    pub visible: usize,
    pub active: Vec<&'static str>,
    pub map: MapState,
    pub histogram: HistogramState,
    pub daily: Vec<DailyPoint>,
}

impl Snapshot {
    pub fn capture(session: &Session, step: Option<String>) -> Self {
        let coordinator = session.coordinator();
        let map = {
            let map = session.map().lock();
            MapState {
                mode: match map.mode() {
                    MapMode::Pan => "pan",
                    MapMode::Brush => "brush",
                },
                displayed: map.displayed_count(),
                bounds: map.applied_bounds(),
                playback: map.playback().map(|p| PlaybackWindow {
                    start: p.start(),
                    end: p.end(),
                    can_step_forward: p.can_step_forward(),
                    can_step_backward: p.can_step_backward(),
                }),
            }
        };
        let histogram = {
            let h = session.histogram().lock();
            HistogramState {
                metric: h.metric(),
                bins: h.bins().to_vec(),
            }
        };
        let daily = session.line().lock().series().points().to_vec();

        Self {
            step,
            total: coordinator.original().len(),
            visible: coordinator.visible().len(),
            active: coordinator.predicates().active_names().into_vec(),
            map,
            histogram,
            daily,
        }
    }

    pub fn write_json<W: Write>(&self, out: &mut W, pretty: bool) -> io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut *out, self)?;
        } else {
            serde_json::to_writer(&mut *out, self)?;
        }
        writeln!(out)
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Some(step) = &self.step {
            writeln!(out, "== {step}")?;
        }
        let active = if self.active.is_empty() {
            "no filters".to_string()
        } else {
            self.active.join(", ")
        };
        writeln!(out, "visible {} / {} ({active})", self.visible, self.total)?;

        write!(out, "map [{}]: {} displayed", self.map.mode, self.map.displayed)?;
        if let Some(p) = &self.map.playback {
            write!(
                out,
                ", playback {} - {}",
                format_short_date(p.start),
                format_short_date(p.end)
            )?;
        }
        writeln!(out)?;

        writeln!(out, "histogram ({}):", self.histogram.metric.title())?;
        for bin in &self.histogram.bins {
            writeln!(
                out,
                "  {:<14}{:>6}{:>7.1}%",
                bin.label, bin.count, bin.percentage
            )?;
        }

        writeln!(out, "daily:")?;
        if let (Some(first), Some(last)) = (self.daily.first(), self.daily.last()) {
            for point in &self.daily {
                let label = format_tick(point.local_date, first.local_date, last.local_date);
                writeln!(out, "  {label:<14}{:>6}", point.event_count)?;
            }
        } else {
            writeln!(out, "  (none)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Step;
    use chrono::{NaiveDate, TimeZone, Utc};
    use quakescope_core::{EventRecord, EventStore};

    fn session() -> Session {
        let records = [(1, 3.5), (1, 4.5), (2, 7.0)]
            .into_iter()
            .map(|(day, magnitude)| {
                let local = NaiveDate::from_ymd_opt(2024, 3, day)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap();
                EventRecord {
                    latitude: 10.0,
                    longitude: 10.0,
                    magnitude,
                    depth: 15.0,
                    occurred_at_utc: Utc.from_utc_datetime(&local),
                    occurred_at_local: local,
                    local_timezone_label: "UTC".into(),
                    place: String::new(),
                    duration_proxy: 0.0,
                }
            })
            .collect();
        Session::new(EventStore::new(records), HistogramMetric::Magnitude).unwrap()
    }

    #[test]
    fn text_report_lists_bins_and_days() {
        let mut s = session();
        s.apply(&Step::BrushMagnitude { min: 3.0, max: 5.0 }).unwrap();
        let snap = Snapshot::capture(&s, Some("brush_magnitude".into()));

        let mut out = Vec::new();
        snap.write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("== brush_magnitude"));
        assert!(text.contains("visible 2 / 3 (histogram.magnitude)"));
        assert!(text.contains("map [pan]: 2 displayed"));
        assert!(text.contains("Mar 01, 2024"));
        assert!(!text.contains("Mar 02, 2024"));
    }

    #[test]
    fn json_report_is_machine_readable() {
        let s = session();
        let snap = Snapshot::capture(&s, None);
        let mut out = Vec::new();
        snap.write_json(&mut out, false).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["visible"], 3);
        assert_eq!(value["histogram"]["metric"], "magnitude");
        assert_eq!(value["daily"][1]["event_count"], 1);
        assert!(value.get("step").is_none());
    }
}
