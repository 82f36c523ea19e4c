//! Raw rows to [`EventRecord`]s.
//!
//! Rows with an empty or non-numeric required field are dropped silently from
//! the result; the number dropped is returned and logged.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::error::{IngestError, Result};
use crate::record::EventRecord;
use crate::timezone::{resolve_zone, TimezoneLookup};

/// Columns every source file must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = ["latitude", "longitude", "depth", "mag", "time", "place", "dmin"];

/// One source row with every field still in text form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRow {
    pub latitude: String,
    pub longitude: String,
    pub depth: String,
    pub mag: String,
    pub time: String,
    pub place: String,
    pub dmin: String,
}

#[derive(Clone, Debug, Default)]
pub struct Ingested {
    pub records: Vec<EventRecord>,
    pub dropped: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rejection {
    Empty(&'static str),
    NotNumeric(&'static str),
    OutOfRange(&'static str),
    BadTime,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Empty(column) => write!(f, "empty `{column}`"),
            Rejection::NotNumeric(column) => write!(f, "non-numeric `{column}`"),
            Rejection::OutOfRange(column) => write!(f, "`{column}` out of range"),
            Rejection::BadTime => f.write_str("unparseable `time`"),
        }
    }
}

pub fn ingest<I>(rows: I, zones: &dyn TimezoneLookup) -> Ingested
where
    I: IntoIterator<Item = RawRow>,
{
    let mut out = Ingested::default();
    for (row_index, row) in rows.into_iter().enumerate() {
        match normalize(&row, zones) {
            Ok(record) => out.records.push(record),
            Err(reason) => {
                tracing::debug!(row = row_index, %reason, "dropping malformed row");
                out.dropped += 1;
            }
        }
    }
    if out.dropped > 0 {
        tracing::info!(
            kept = out.records.len(),
            dropped = out.dropped,
            "dropped rows with missing or invalid fields"
        );
    }
    out
}

fn normalize(row: &RawRow, zones: &dyn TimezoneLookup) -> std::result::Result<EventRecord, Rejection> {
    let latitude = number("latitude", &row.latitude)?;
    let longitude = number("longitude", &row.longitude)?;
    let depth = number("depth", &row.depth)?;
    let magnitude = number("mag", &row.mag)?;
    let duration_proxy = number("dmin", &row.dmin)?;
    if latitude.abs() > 90.0 {
        return Err(Rejection::OutOfRange("latitude"));
    }
    if longitude.abs() > 180.0 {
        return Err(Rejection::OutOfRange("longitude"));
    }

    if row.time.trim().is_empty() {
        return Err(Rejection::Empty("time"));
    }
    if row.place.trim().is_empty() {
        return Err(Rejection::Empty("place"));
    }
    let occurred_at_utc = parse_time(&row.time).ok_or(Rejection::BadTime)?;

    let zone = resolve_zone(zones, latitude, longitude);
    let occurred_at_local =
        occurred_at_utc.naive_utc() + Duration::minutes(i64::from(zone.offset_minutes));

    Ok(EventRecord {
        latitude,
        longitude,
        magnitude,
        depth,
        occurred_at_utc,
        occurred_at_local,
        local_timezone_label: zone.label,
        place: row.place.clone(),
        duration_proxy,
    })
}

fn number(column: &'static str, raw: &str) -> std::result::Result<f64, Rejection> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(Rejection::Empty(column));
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Rejection::NotNumeric(column)),
    }
}

/// RFC 3339 first (the USGS feed format), then naive timestamps read as UTC.
fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Reads raw rows from CSV with a header line.
///
/// Columns are located by header name; extra columns are ignored and short
/// rows read their missing cells as empty (and are later dropped).
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let mut idx = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(IngestError::MissingColumn(name))?;
    }

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record?;
        let cell = |i: usize| record.get(idx[i]).unwrap_or_default().to_string();
        rows.push(RawRow {
            latitude: cell(0),
            longitude: cell(1),
            depth: cell(2),
            mag: cell(3),
            time: cell(4),
            place: cell(5),
            dmin: cell(6),
        });
    }
    Ok(rows)
}

/// Loads and ingests a CSV file. Any I/O or framing failure is fatal.
pub fn load_csv(path: &Path, zones: &dyn TimezoneLookup) -> Result<Ingested> {
    let file = File::open(path)?;
    let rows = read_rows(file)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "read event source");
    Ok(ingest(rows, zones))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::ZoneTable;

    fn row(lat: &str, lon: &str, mag: &str) -> RawRow {
        RawRow {
            latitude: lat.into(),
            longitude: lon.into(),
            depth: "12.5".into(),
            mag: mag.into(),
            time: "2024-03-01T12:00:00.000Z".into(),
            place: "somewhere".into(),
            dmin: "0.2".into(),
        }
    }

    #[test]
    fn drops_empty_and_non_numeric_fields() {
        let rows = vec![
            row("10", "20", "4.5"),
            row("", "20", "4.5"),
            row("10", "abc", "4.5"),
            row("10", "20", "NaN"),
            row("10", "20", "inf"),
            RawRow {
                place: "   ".into(),
                ..row("10", "20", "4.5")
            },
            RawRow {
                time: "yesterday".into(),
                ..row("10", "20", "4.5")
            },
        ];
        let out = ingest(rows, &ZoneTable::default());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.dropped, 6);
    }

    #[test]
    fn drops_coordinates_off_the_globe() {
        let rows = vec![
            row("10", "1e10", "4.5"),
            row("-90.5", "20", "4.5"),
            row("90", "-180", "4.5"),
            row("-90", "180", "4.5"),
        ];
        let out = ingest(rows, &ZoneTable::default());
        assert_eq!(out.dropped, 2);
        let labels: Vec<_> = out.records.iter().map(|r| r.local_timezone_label.as_str()).collect();
        assert_eq!(labels, ["UTC-12", "UTC+12"]);
    }

    #[test]
    fn trims_numbers_and_converts_types() {
        let out = ingest(vec![row(" 10.5 ", "-20", "4.25")], &ZoneTable::default());
        let r = &out.records[0];
        assert_eq!(r.latitude, 10.5);
        assert_eq!(r.longitude, -20.0);
        assert_eq!(r.magnitude, 4.25);
        assert_eq!(r.depth, 12.5);
        assert_eq!(r.duration_proxy, 0.2);
    }

    #[test]
    fn local_time_uses_fallback_offset() {
        let out = ingest(vec![row("0", "-122.4", "4.0")], &ZoneTable::default());
        let r = &out.records[0];
        assert_eq!(r.local_timezone_label, "UTC-8");
        assert_eq!(
            r.occurred_at_local,
            r.occurred_at_utc.naive_utc() - Duration::hours(8)
        );
    }

    #[test]
    fn parses_naive_timestamps_as_utc() {
        let mut r = row("0", "0", "4.0");
        r.time = "2024-03-01 23:30:00".into();
        let out = ingest(vec![r], &ZoneTable::default());
        assert_eq!(out.records[0].occurred_at_utc.to_rfc3339(), "2024-03-01T23:30:00+00:00");
    }

    #[test]
    fn read_rows_locates_columns_by_header() {
        let csv = "time,latitude,longitude,depth,mag,magType,place,dmin\n\
                   2024-03-01T00:00:00Z,1,2,3,4.5,mb,\"Somewhere, Far\",0.1\n\
                   2024-03-02T00:00:00Z,1,2\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mag, "4.5");
        assert_eq!(rows[0].place, "Somewhere, Far");
        assert_eq!(rows[1].mag, "");

        let out = ingest(rows, &ZoneTable::default());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.dropped, 1);
    }

    #[test]
    fn read_rows_requires_every_column() {
        let csv = "latitude,longitude,depth,mag,time,place\n1,2,3,4,2024-01-01T00:00:00Z,x\n";
        let err = read_rows(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn("dmin")));
    }
}
