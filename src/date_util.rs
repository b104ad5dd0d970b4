use chrono::{Duration, NaiveDate};

use crate::error::{Error, Result};

/// The date format used by the `dt` column of the sales fact table.
pub const DATASET_DATE_FORMAT: &str = "%Y-%m-%d";

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap() - Duration::days(1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap() - Duration::days(1)
    }
}

/// Parse a date cell in the dataset's `YYYY-MM-DD` format.
pub fn parse_dataset_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATASET_DATE_FORMAT)
        .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}
