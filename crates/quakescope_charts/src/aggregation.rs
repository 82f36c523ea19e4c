//! Chart-ready series derived from a set of records.
//!
//! Everything here is a pure function of its input: the coordinator calls
//! these on every recombination and relies on identical input giving
//! identical output.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use quakescope_core::EventRecord;
use serde::{Deserialize, Serialize};

/// The dimension the histogram bins by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistogramMetric {
    #[default]
    Magnitude,
    Depth,
}

impl HistogramMetric {
    /// `(min, max, width)` of the fixed bin domain.
    pub fn domain(self) -> (f64, f64, f64) {
        match self {
            HistogramMetric::Magnitude => (3.0, 10.0, 1.0),
            HistogramMetric::Depth => (0.0, 700.0, 100.0),
        }
    }

    pub fn value(self, record: &EventRecord) -> f64 {
        match self {
            HistogramMetric::Magnitude => record.magnitude,
            HistogramMetric::Depth => record.depth,
        }
    }

    pub fn bin_label(self, start: f64, end: f64) -> String {
        match self {
            HistogramMetric::Magnitude => format!("{start:.1}–{end:.1}"),
            HistogramMetric::Depth => format!("{start}–{end} km"),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            HistogramMetric::Magnitude => "Magnitude",
            HistogramMetric::Depth => "Depth",
        }
    }
}

impl fmt::Display for HistogramMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HistogramMetric::Magnitude => "magnitude",
            HistogramMetric::Depth => "depth",
        })
    }
}

impl FromStr for HistogramMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "magnitude" | "mag" => Ok(HistogramMetric::Magnitude),
            "depth" => Ok(HistogramMetric::Depth),
            other => Err(format!("unknown histogram metric `{other}` (expected magnitude or depth)")),
        }
    }
}

/// One histogram bar over `[range_start, range_end)`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bin {
    pub range_start: f64,
    pub range_end: f64,
    pub label: String,
    pub count: usize,
    /// Share of the classified records, 0 when nothing was classified.
    pub percentage: f64,
}

impl Bin {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.range_start && value < self.range_end
    }
}

/// Fixed-width binning over the metric's domain.
///
/// Each record goes to the first bin whose half-open range contains it;
/// records outside the domain are ignored and do not count toward the
/// percentage denominator.
pub fn bin_by<'a, I>(metric: HistogramMetric, records: I) -> Vec<Bin>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let (min, max, width) = metric.domain();
    let n = ((max - min) / width).round() as usize;
    let mut bins: Vec<Bin> = (0..n)
        .map(|i| {
            let start = min + i as f64 * width;
            let end = start + width;
            Bin {
                range_start: start,
                range_end: end,
                label: metric.bin_label(start, end),
                count: 0,
                percentage: 0.0,
            }
        })
        .collect();

    for record in records {
        let v = metric.value(record);
        if let Some(bin) = bins.iter_mut().find(|b| b.contains(v)) {
            bin.count += 1;
        }
    }

    let total: usize = bins.iter().map(|b| b.count).sum();
    if total > 0 {
        for bin in &mut bins {
            bin.percentage = bin.count as f64 / total as f64 * 100.0;
        }
    }
    bins
}

pub fn bin_by_magnitude<'a, I>(records: I) -> Vec<Bin>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    bin_by(HistogramMetric::Magnitude, records)
}

pub fn bin_by_depth<'a, I>(records: I) -> Vec<Bin>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    bin_by(HistogramMetric::Depth, records)
}

/// Number of events on one local calendar date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DailyPoint {
    pub local_date: NaiveDate,
    pub event_count: usize,
}

/// Events per local date, ascending, one point per date present.
///
/// Dates with no events are absent rather than zero-filled.
pub fn daily_counts<'a, I>(records: I) -> Vec<DailyPoint>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *by_date.entry(record.local_date()).or_default() += 1;
    }
    by_date
        .into_iter()
        .map(|(local_date, event_count)| DailyPoint {
            local_date,
            event_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn quake(mag: f64, depth: f64) -> EventRecord {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        EventRecord {
            latitude: 0.0,
            longitude: 0.0,
            magnitude: mag,
            depth,
            occurred_at_utc: t,
            occurred_at_local: t.naive_utc(),
            local_timezone_label: "UTC".into(),
            place: "x".into(),
            duration_proxy: 0.0,
        }
    }

    #[test]
    fn magnitude_bins_cover_fixed_domain() {
        let bins = bin_by_magnitude(&[]);
        let labels: Vec<_> = bins.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            ["3.0–4.0", "4.0–5.0", "5.0–6.0", "6.0–7.0", "7.0–8.0", "8.0–9.0", "9.0–10.0"]
        );
        for pair in bins.windows(2) {
            assert_eq!(pair[0].range_end, pair[1].range_start);
        }
    }

    #[test]
    fn depth_bins_use_km_labels() {
        let bins = bin_by_depth(&[]);
        assert_eq!(bins.len(), 7);
        assert_eq!(bins[0].label, "0–100 km");
        assert_eq!(bins[6].label, "600–700 km");
    }

    #[test]
    fn boundary_values_go_to_upper_bin_start() {
        let records = [quake(4.0, 0.0), quake(3.999, 0.0), quake(10.0, 0.0), quake(2.9, 0.0)];
        let bins = bin_by_magnitude(&records);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(bins[0].percentage, 50.0);
    }

    #[test]
    fn empty_input_yields_zero_percentages() {
        for metric in [HistogramMetric::Magnitude, HistogramMetric::Depth] {
            let bins = bin_by(metric, &[]);
            assert!(bins.iter().all(|b| b.count == 0 && b.percentage == 0.0));
        }
    }

    #[test]
    fn out_of_domain_records_do_not_deflate_percentages() {
        let records = [quake(3.5, 800.0), quake(1.0, 50.0)];
        let depth = bin_by_depth(&records);
        assert_eq!(depth[0].count, 1);
        assert_eq!(depth[0].percentage, 100.0);
    }

    #[test]
    fn metric_parses_and_displays() {
        assert_eq!("Depth".parse::<HistogramMetric>(), Ok(HistogramMetric::Depth));
        assert_eq!("mag".parse::<HistogramMetric>(), Ok(HistogramMetric::Magnitude));
        assert!("energy".parse::<HistogramMetric>().is_err());
        assert_eq!(HistogramMetric::Depth.to_string(), "depth");
    }
}
