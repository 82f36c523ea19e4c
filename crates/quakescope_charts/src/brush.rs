use crate::scale::TimeScale;
use crate::selection::TimeRange;

/// Horizontal drag across the daily chart.
///
/// Positions stay in pixels, clamped to `[0, width]`, until the drag ends and
/// the span is inverted through the chart's [`TimeScale`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeBrush {
    width_px: f64,
    anchor_px: Option<f64>,
    cursor_px: f64,
}

impl TimeBrush {
    pub fn new(width_px: f64) -> Self {
        Self {
            width_px: width_px.max(0.0),
            ..Self::default()
        }
    }

    pub fn width_px(&self) -> f64 {
        self.width_px
    }

    pub fn is_active(&self) -> bool {
        self.anchor_px.is_some()
    }

    fn clamp(&self, x_px: f64) -> f64 {
        x_px.clamp(0.0, self.width_px)
    }

    pub fn begin(&mut self, x_px: f64) {
        let x = self.clamp(x_px);
        self.anchor_px = Some(x);
        self.cursor_px = x;
    }

    pub fn drag(&mut self, x_px: f64) {
        if self.is_active() {
            self.cursor_px = self.clamp(x_px);
        }
    }

    pub fn cancel(&mut self) {
        self.anchor_px = None;
    }

    /// Ordered pixel span of the drag in flight.
    pub fn span_px(&self) -> Option<(f64, f64)> {
        let a = self.anchor_px?;
        let b = self.cursor_px;
        Some((a.min(b), a.max(b)))
    }

    /// Ends the drag.
    ///
    /// The outer `None` means no drag was in flight. `Some(None)` is a drag
    /// that selects nothing: zero width, or no scale because the chart is
    /// empty.
    pub fn finish(&mut self, scale: Option<&TimeScale>) -> Option<Option<TimeRange>> {
        let (a, b) = self.span_px()?;
        self.anchor_px = None;
        Some(scale.and_then(|scale| TimeRange::new(scale.invert(a), scale.invert(b))))
    }
}

/// In-flight map rectangle, as two `(lat, lon)` corners.
///
/// Map gestures arrive already projected to lat/lon, so no view transform is
/// involved here.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrushRect {
    active: bool,
    anchor: (f64, f64),
    cursor: (f64, f64),
}

impl BrushRect {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn begin(&mut self, lat: f64, lon: f64) {
        self.active = true;
        self.anchor = (lat, lon);
        self.cursor = (lat, lon);
    }

    pub fn update(&mut self, lat: f64, lon: f64) {
        if self.active {
            self.cursor = (lat, lon);
        }
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Opposite corners of the current rectangle.
    pub fn corners(&self) -> Option<((f64, f64), (f64, f64))> {
        self.active.then_some((self.anchor, self.cursor))
    }

    pub fn take_final(&mut self) -> Option<((f64, f64), (f64, f64))> {
        let r = self.corners();
        self.active = false;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> TimeScale {
        let first = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let last = chrono::NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        TimeScale::for_dates(first, last, 1000.0)
    }

    #[test]
    fn time_brush_clamps_and_orders_span() {
        let mut b = TimeBrush::new(1000.0);
        assert_eq!(b.span_px(), None);
        b.drag(50.0);
        assert_eq!(b.span_px(), None);

        b.begin(1200.0);
        b.drag(-40.0);
        assert_eq!(b.span_px(), Some((0.0, 1000.0)));
    }

    #[test]
    fn time_brush_finishes_into_range() {
        let mut b = TimeBrush::new(1000.0);
        b.begin(600.0);
        b.drag(100.0);
        let range = b.finish(Some(&scale())).flatten().unwrap();
        assert_eq!(range.start().to_string(), "2024-03-02 00:00:00");
        assert_eq!(range.end().to_string(), "2024-03-07 00:00:00");
        assert!(!b.is_active());
        assert_eq!(b.finish(Some(&scale())), None);
    }

    #[test]
    fn time_brush_without_extent_or_scale_selects_nothing() {
        let mut b = TimeBrush::new(1000.0);
        b.begin(300.0);
        assert_eq!(b.finish(Some(&scale())), Some(None));

        b.begin(10.0);
        b.drag(400.0);
        assert_eq!(b.finish(None), Some(None));
    }

    #[test]
    fn brush_rect_tracks_corners() {
        let mut b = BrushRect::default();
        assert_eq!(b.corners(), None);
        b.update(1.0, 1.0);
        assert_eq!(b.corners(), None);

        b.begin(10.0, 5.0);
        b.update(3.0, 8.0);
        assert_eq!(b.corners(), Some(((10.0, 5.0), (3.0, 8.0))));
        assert_eq!(b.take_final(), Some(((10.0, 5.0), (3.0, 8.0))));
        assert!(!b.is_active());
    }

    #[test]
    fn cancel_discards_gesture() {
        let mut b = TimeBrush::new(100.0);
        b.begin(4.0);
        b.cancel();
        assert_eq!(b.finish(Some(&scale())), None);
    }
}
