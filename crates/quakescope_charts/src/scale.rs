use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Linear mapping between local timestamps and horizontal pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    domain_min: NaiveDateTime,
    domain_max: NaiveDateTime,
    range_min: f64,
    range_max: f64,
}

impl TimeScale {
    pub fn new(
        domain_min: NaiveDateTime,
        domain_max: NaiveDateTime,
        range_min: f64,
        range_max: f64,
    ) -> Self {
        Self {
            domain_min,
            domain_max,
            range_min,
            range_max,
        }
    }

    /// Scale spanning midnight of `first` to midnight of `last`.
    pub fn for_dates(first: NaiveDate, last: NaiveDate, width_px: f64) -> Self {
        Self::new(
            first.and_time(chrono::NaiveTime::MIN),
            last.and_time(chrono::NaiveTime::MIN),
            0.0,
            width_px,
        )
    }

    pub fn domain(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.domain_min, self.domain_max)
    }

    fn span_ms(&self) -> i64 {
        (self.domain_max - self.domain_min).num_milliseconds()
    }

    pub fn map(&self, t: NaiveDateTime) -> f64 {
        let span = self.span_ms();
        if span == 0 {
            return self.range_min;
        }
        let f = (t - self.domain_min).num_milliseconds() as f64 / span as f64;
        self.range_min + f * (self.range_max - self.range_min)
    }

    /// Timestamp under pixel `px`, clamped to the domain.
    pub fn invert(&self, px: f64) -> NaiveDateTime {
        let r = self.range_max - self.range_min;
        if r.abs() < 1e-12 || !px.is_finite() {
            return self.domain_min;
        }
        let f = ((px - self.range_min) / r).clamp(0.0, 1.0);
        let offset = (f * self.span_ms() as f64).round() as i64;
        self.domain_min + Duration::milliseconds(offset)
    }
}
