//! Month-grid arithmetic for the trading calendar. The grid always covers
//! full weeks, Sunday first, so leading and trailing cells belong to the
//! adjacent months.

use api_types::calendar::DailyStat;
use chrono::{Datelike, Days, Months, NaiveDate};

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Normalizes any date to its first-of-month anchor.
#[must_use]
pub fn month_anchor(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[must_use]
pub fn next_month(anchor: NaiveDate) -> NaiveDate {
    anchor
        .checked_add_months(Months::new(1))
        .unwrap_or(anchor)
}

#[must_use]
pub fn prev_month(anchor: NaiveDate) -> NaiveDate {
    anchor
        .checked_sub_months(Months::new(1))
        .unwrap_or(anchor)
}

/// All cells for the anchored month: from the Sunday on or before the 1st
/// through the Saturday on or after the last day. Always a multiple of 7.
#[must_use]
pub fn month_grid(anchor: NaiveDate) -> Vec<NaiveDate> {
    let anchor = month_anchor(anchor);
    let last = next_month(anchor).pred_opt().unwrap_or(anchor);

    let lead = anchor.weekday().num_days_from_sunday() as u64;
    let tail = 6 - last.weekday().num_days_from_sunday() as u64;

    let start = anchor.checked_sub_days(Days::new(lead)).unwrap_or(anchor);
    let end = last.checked_add_days(Days::new(tail)).unwrap_or(last);

    start.iter_days().take_while(|d| *d <= end).collect()
}

pub fn in_month(cell: NaiveDate, anchor: NaiveDate) -> bool {
    cell.year() == anchor.year() && cell.month() == anchor.month()
}

/// Looks up a day's aggregate by exact date equality. Days the backend
/// omitted traded nothing.
#[must_use]
pub fn day_stat(days: &[DailyStat], date: NaiveDate) -> Option<&DailyStat> {
    days.iter().find(|day| day.date == date)
}

#[must_use]
pub fn month_label(anchor: NaiveDate) -> String {
    anchor.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grid_covers_full_weeks_sunday_first() {
        // March 2024 starts on a Friday and ends on a Sunday.
        let grid = month_grid(date(2024, 3, 1));
        assert_eq!(grid.len(), 42);
        assert_eq!(grid[0], date(2024, 2, 25));
        assert_eq!(*grid.last().unwrap(), date(2024, 4, 6));
        assert_eq!(grid[0].weekday(), chrono::Weekday::Sun);
    }

    #[test]
    fn grid_for_month_starting_sunday_has_no_lead() {
        // September 2024 starts on a Sunday.
        let grid = month_grid(date(2024, 9, 1));
        assert_eq!(grid[0], date(2024, 9, 1));
        assert_eq!(grid.len(), 35);
    }

    #[test]
    fn anchor_normalizes_any_day() {
        assert_eq!(month_anchor(date(2024, 3, 17)), date(2024, 3, 1));
        assert_eq!(month_grid(date(2024, 3, 17)), month_grid(date(2024, 3, 1)));
    }

    #[test]
    fn navigation_wraps_year_boundaries() {
        assert_eq!(next_month(date(2024, 12, 1)), date(2025, 1, 1));
        assert_eq!(prev_month(date(2024, 1, 1)), date(2023, 12, 1));
    }

    #[test]
    fn lookup_matches_exactly_one_march_cell() {
        let days = vec![DailyStat {
            date: date(2024, 3, 5),
            profit: 120.0,
            trades_count: 2,
            wins: 2,
        }];

        let hit = day_stat(&days, date(2024, 3, 5)).unwrap();
        assert_eq!(hit.profit, 120.0);
        assert_eq!(hit.trades_count, 2);

        let other_hits = month_grid(date(2024, 3, 1))
            .into_iter()
            .filter(|cell| *cell != date(2024, 3, 5))
            .filter_map(|cell| day_stat(&days, cell))
            .count();
        assert_eq!(other_hits, 0);
    }

    #[test]
    fn adjacent_month_cells_still_show_data() {
        // Feb 25 sits in the March grid as a leading cell.
        let days = vec![DailyStat {
            date: date(2024, 2, 25),
            profit: -80.0,
            trades_count: 1,
            wins: 0,
        }];
        let grid = month_grid(date(2024, 3, 1));
        assert!(!in_month(grid[0], date(2024, 3, 1)));
        assert!(day_stat(&days, grid[0]).is_some());
    }

    #[test]
    fn month_label_is_human_readable() {
        assert_eq!(month_label(date(2024, 3, 1)), "March 2024");
    }
}
