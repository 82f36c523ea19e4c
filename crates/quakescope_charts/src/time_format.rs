use chrono::{NaiveDate, NaiveDateTime};

/// Domains shorter than this many days get day-level axis labels.
pub const DAY_LABEL_MAX_SPAN_DAYS: i64 = 120;

/// strftime pattern for line chart axis ticks over `[start, end]`.
pub fn tick_format(start: NaiveDate, end: NaiveDate) -> &'static str {
    if (end - start).num_days() < DAY_LABEL_MAX_SPAN_DAYS {
        "%b %d, %Y"
    } else {
        "%b %Y"
    }
}

pub fn format_tick(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> String {
    date.format(tick_format(start, end)).to_string()
}

/// e.g. `03/01/2024`
pub fn format_short_date(t: NaiveDateTime) -> String {
    t.format("%m/%d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn tick_format_switches_at_120_days() {
        let start = day(2024, 1, 1);
        assert_eq!(format_tick(day(2024, 3, 5), start, day(2024, 4, 29)), "Mar 05, 2024");
        assert_eq!(format_tick(day(2024, 3, 5), start, day(2024, 4, 30)), "Mar 2024");
    }

    #[test]
    fn short_date_label() {
        let t = day(2024, 3, 1).and_hms_opt(5, 15, 0).unwrap();
        assert_eq!(format_short_date(t), "03/01/2024");
    }
}
