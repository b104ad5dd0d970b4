use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::date_util::last_day_of_month;
use crate::error::{Error, Result};

/// Reporting granularity: one report per calendar week or per calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Granularity {
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(Error::Config(format!(
                "unknown report mode: {other} (expected weekly or monthly)"
            ))),
        }
    }

    /// Mode string used in artifact key paths and the insight JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One planned reporting window with inclusive date bounds.
///
/// The label keys the period's artifacts: `YYYY-MM-DD` of the end date for
/// weekly periods, `YYYY-MM` of the start month for monthly periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

impl ReportPeriod {
    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} -> {})", self.label, self.start_str(), self.end_str())
    }
}

/// Partition `[min_date, max_date]` into an ascending, non-overlapping,
/// gap-free sequence of reporting periods.
///
/// Weekly periods span 7 days from the cursor, clipped to `max_date` on the
/// last one. Monthly periods always start on the 1st of the cursor's month,
/// even when `min_date` falls mid-month: the first partial month is reported
/// under the full calendar month. That is a calendar-alignment convention
/// carried over from the business reports, not a claim that data exists
/// before `min_date`.
pub fn plan_periods(
    min_date: NaiveDate,
    max_date: NaiveDate,
    granularity: Granularity,
) -> Vec<ReportPeriod> {
    let mut periods = Vec::new();
    let mut cursor = min_date;

    while cursor <= max_date {
        match granularity {
            Granularity::Weekly => {
                let start = cursor;
                let end = (start + Duration::days(6)).min(max_date);
                periods.push(ReportPeriod {
                    start,
                    end,
                    label: end.format("%Y-%m-%d").to_string(),
                });
                cursor = end + Duration::days(1);
            }
            Granularity::Monthly => {
                let start = NaiveDate::from_ymd_opt(cursor.year(), cursor.month(), 1).unwrap();
                let month_end = last_day_of_month(cursor.year(), cursor.month());
                let end = month_end.min(max_date);
                periods.push(ReportPeriod {
                    start,
                    end,
                    label: start.format("%Y-%m").to_string(),
                });
                cursor = month_end + Duration::days(1);
            }
        }
    }

    periods
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Ascending, non-overlapping, and every day of [min, max] covered.
    fn assert_covers(periods: &[ReportPeriod], min: NaiveDate, max: NaiveDate) {
        assert!(!periods.is_empty());
        for p in periods {
            assert!(p.start <= p.end, "inverted period {p}");
        }
        for w in periods.windows(2) {
            assert_eq!(
                w[1].start,
                w[0].end + Duration::days(1),
                "gap or overlap between {} and {}",
                w[0],
                w[1]
            );
        }
        assert!(periods[0].start <= min);
        assert_eq!(periods.last().unwrap().end, max);
    }

    #[test]
    fn test_weekly_ten_day_extent() {
        let periods = plan_periods(d(2024, 1, 1), d(2024, 1, 10), Granularity::Weekly);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].start, d(2024, 1, 1));
        assert_eq!(periods[0].end, d(2024, 1, 7));
        assert_eq!(periods[0].label, "2024-01-07");
        assert_eq!(periods[1].start, d(2024, 1, 8));
        assert_eq!(periods[1].end, d(2024, 1, 10));
        assert_eq!(periods[1].label, "2024-01-10");
        assert_covers(&periods, d(2024, 1, 1), d(2024, 1, 10));
    }

    #[test]
    fn test_weekly_exact_multiple() {
        let periods = plan_periods(d(2024, 1, 1), d(2024, 1, 14), Granularity::Weekly);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].end, d(2024, 1, 14));
        assert_eq!(periods[1].label, "2024-01-14");
        assert_covers(&periods, d(2024, 1, 1), d(2024, 1, 14));
    }

    #[test]
    fn test_monthly_leap_february() {
        let periods = plan_periods(d(2024, 2, 5), d(2024, 3, 10), Granularity::Monthly);
        assert_eq!(periods.len(), 2);
        // First partial month is reported under the full calendar month.
        assert_eq!(periods[0].start, d(2024, 2, 1));
        assert_eq!(periods[0].end, d(2024, 2, 29));
        assert_eq!(periods[0].label, "2024-02");
        assert_eq!(periods[1].start, d(2024, 3, 1));
        assert_eq!(periods[1].end, d(2024, 3, 10));
        assert_eq!(periods[1].label, "2024-03");
    }

    #[test]
    fn test_monthly_max_on_month_boundary() {
        let periods = plan_periods(d(2024, 1, 1), d(2024, 2, 29), Granularity::Monthly);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].end, d(2024, 2, 29));
        assert_covers(&periods, d(2024, 1, 1), d(2024, 2, 29));
    }

    #[test]
    fn test_single_day_extent() {
        let day = d(2024, 6, 15);
        let weekly = plan_periods(day, day, Granularity::Weekly);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].start, day);
        assert_eq!(weekly[0].end, day);
        assert_eq!(weekly[0].label, "2024-06-15");

        let monthly = plan_periods(day, day, Granularity::Monthly);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].start, d(2024, 6, 1));
        assert_eq!(monthly[0].end, day);
        assert_eq!(monthly[0].label, "2024-06");
    }

    #[test]
    fn test_weekly_long_range_cover() {
        let min = d(2023, 11, 17);
        let max = d(2024, 3, 2);
        let periods = plan_periods(min, max, Granularity::Weekly);
        assert_covers(&periods, min, max);
        for p in &periods[..periods.len() - 1] {
            assert_eq!((p.end - p.start).num_days(), 6);
        }
    }

    #[test]
    fn test_monthly_long_range_cover() {
        let min = d(2023, 11, 17);
        let max = d(2024, 3, 2);
        let periods = plan_periods(min, max, Granularity::Monthly);
        assert_eq!(periods.len(), 5);
        assert_covers(&periods, min, max);
        let labels: Vec<&str> = periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2023-11", "2023-12", "2024-01", "2024-02", "2024-03"]);
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!(Granularity::parse("weekly").unwrap(), Granularity::Weekly);
        assert_eq!(Granularity::parse("Monthly ").unwrap(), Granularity::Monthly);
        assert!(Granularity::parse("daily").is_err());
    }
}
