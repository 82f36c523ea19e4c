use std::sync::Arc;

use chrono::NaiveDate;
use quakescope_core::EventRecord;

use crate::aggregation::{daily_counts, DailyPoint};

/// Daily event counts ready for the line chart.
///
/// Invariant: dates are strictly ascending. The series may be empty (a
/// recombination that matched nothing).
#[derive(Clone, Debug, PartialEq)]
pub struct DailySeries {
    points: Arc<[DailyPoint]>,
}

impl DailySeries {
    pub fn new(points: Vec<DailyPoint>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            points.windows(2).all(|w| w[0].local_date < w[1].local_date),
            "daily points must be strictly ascending by date"
        );
        Ok(Self {
            points: points.into(),
        })
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        Self {
            points: daily_counts(records).into(),
        }
    }

    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn date_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((first.local_date, last.local_date))
    }

    pub fn max_count(&self) -> usize {
        self.points.iter().map(|p| p.event_count).max().unwrap_or(0)
    }

    pub fn total_count(&self) -> usize {
        self.points.iter().map(|p| p.event_count).sum()
    }

    /// Index of the first point on or after `date`.
    pub fn lower_bound(&self, date: NaiveDate) -> usize {
        self.points.partition_point(|p| p.local_date < date)
    }

    /// Point closest to `date`; ties go to the earlier point.
    pub fn nearest(&self, date: NaiveDate) -> Option<&DailyPoint> {
        if self.is_empty() {
            return None;
        }
        let i = self.lower_bound(date);
        if i == 0 {
            return self.points.first();
        }
        if i >= self.len() {
            return self.points.last();
        }
        let a = &self.points[i - 1];
        let b = &self.points[i];
        let da = (date - a.local_date).num_days().abs();
        let db = (b.local_date - date).num_days().abs();
        Some(if db < da { b } else { a })
    }
}

impl Default for DailySeries {
    fn default() -> Self {
        Self {
            points: Vec::new().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn point(d: u32, n: usize) -> DailyPoint {
        DailyPoint {
            local_date: day(d),
            event_count: n,
        }
    }

    #[test]
    fn rejects_unsorted_or_duplicate_dates() {
        assert!(DailySeries::new(vec![point(2, 1), point(1, 1)]).is_err());
        assert!(DailySeries::new(vec![point(1, 1), point(1, 2)]).is_err());
        assert!(DailySeries::new(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn extent_and_counts() {
        let s = DailySeries::new(vec![point(1, 3), point(4, 7), point(9, 2)]).unwrap();
        assert_eq!(s.date_extent(), Some((day(1), day(9))));
        assert_eq!(s.max_count(), 7);
        assert_eq!(s.total_count(), 12);
        assert_eq!(DailySeries::default().date_extent(), None);
    }

    #[test]
    fn nearest_prefers_earlier_on_tie() {
        let s = DailySeries::new(vec![point(1, 3), point(5, 7), point(9, 2)]).unwrap();
        assert_eq!(s.nearest(day(3)).map(|p| p.local_date), Some(day(1)));
        assert_eq!(s.nearest(day(4)).map(|p| p.local_date), Some(day(5)));
        assert_eq!(s.nearest(day(28)).map(|p| p.local_date), Some(day(9)));
        assert_eq!(DailySeries::default().nearest(day(1)), None);
    }
}
