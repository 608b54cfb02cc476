//! Weekly calendar window arithmetic.
//!
//! The dashboard shows a rolling window of three Sunday-aligned weeks: the
//! base week (current week shifted by the navigation offset) plus the two
//! weeks before it, rendered newest-first. Dates cross the backend boundary
//! as `YYYY-MM-DD` strings in the local calendar.

use chrono::{Datelike, Duration, NaiveDate};

pub const WEEKS_IN_WINDOW: usize = 3;
pub const DAYS_IN_WEEK: usize = 7;

const SHORT_MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekWindow {
    /// Newest week first; each week runs Sunday..Saturday chronologically.
    pub weeks: Vec<[NaiveDate; 7]>,
}

impl WeekWindow {
    /// `week_offset` 0 is the current window, +1 one week newer, -1 older.
    pub fn compute(today: NaiveDate, week_offset: i64) -> Self {
        let base_start = week_start(today) + Duration::weeks(week_offset);
        let mut weeks = Vec::with_capacity(WEEKS_IN_WINDOW);
        for weeks_back in 0..WEEKS_IN_WINDOW as i64 {
            let start = base_start - Duration::weeks(weeks_back);
            let mut week = [start; 7];
            for (day_offset, slot) in week.iter_mut().enumerate() {
                *slot = start + Duration::days(day_offset as i64);
            }
            weeks.push(week);
        }
        Self { weeks }
    }

    /// Overall min..max dates covered, inclusive.
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        let newest = self.weeks[0][DAYS_IN_WEEK - 1];
        let oldest = self.weeks[self.weeks.len() - 1][0];
        (oldest, newest)
    }

    /// Human title spanning the full window, e.g. `16 feb - 8 mar`.
    pub fn title(&self) -> String {
        let (start, end) = self.range();
        format!("{} - {}", short_date_es(start), short_date_es(end))
    }
}

pub fn format_db_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_db_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub fn short_date_es(date: NaiveDate) -> String {
    let month = SHORT_MONTHS_ES[date.month0() as usize];
    format!("{} {}", date.day(), month)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(
        date.weekday(),
        chrono::Weekday::Sat | chrono::Weekday::Sun
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
    }

    #[test]
    fn week_start_snaps_back_to_sunday() {
        assert_eq!(week_start(date("2026-03-04")), date("2026-03-01"));
        assert_eq!(week_start(date("2026-03-01")), date("2026-03-01"));
        assert_eq!(week_start(date("2026-03-07")), date("2026-03-01"));
    }

    #[test]
    fn window_covers_three_contiguous_weeks_newest_first() {
        let window = WeekWindow::compute(date("2026-03-04"), 0);

        assert_eq!(window.weeks.len(), WEEKS_IN_WINDOW);
        assert_eq!(window.weeks[0][0], date("2026-03-01"));
        assert_eq!(window.weeks[1][0], date("2026-02-22"));
        assert_eq!(window.weeks[2][0], date("2026-02-15"));

        for week in &window.weeks {
            assert_eq!(week[0].weekday(), chrono::Weekday::Sun);
            for day_offset in 1..DAYS_IN_WEEK {
                assert_eq!(week[day_offset], week[day_offset - 1] + Duration::days(1));
            }
        }

        let (start, end) = window.range();
        assert_eq!(start, date("2026-02-15"));
        assert_eq!(end, date("2026-03-07"));
        assert_eq!((end - start).num_days() + 1, 21);
    }

    #[test]
    fn offset_shifts_window_by_whole_weeks() {
        let current = WeekWindow::compute(date("2026-03-04"), 0);
        let newer = WeekWindow::compute(date("2026-03-04"), 1);
        let older = WeekWindow::compute(date("2026-03-04"), -2);

        assert_eq!(newer.weeks[0][0], current.weeks[0][0] + Duration::weeks(1));
        assert_eq!(older.weeks[0][0], current.weeks[0][0] - Duration::weeks(2));
    }

    #[test]
    fn title_spans_oldest_to_newest() {
        let window = WeekWindow::compute(date("2026-03-04"), 0);
        assert_eq!(window.title(), "15 feb - 7 mar");
    }

    #[test]
    fn db_date_roundtrip_and_rejection() {
        let day = date("2026-01-09");
        assert_eq!(format_db_date(day), "2026-01-09");
        assert_eq!(parse_db_date(" 2026-01-09 "), Some(day));
        assert_eq!(parse_db_date("09/01/2026"), None);
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(date("2026-03-07")));
        assert!(is_weekend(date("2026-03-01")));
        assert!(!is_weekend(date("2026-03-04")));
    }
}
