//! Expiry buckets relative to today.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a product stands relative to its printed date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryStatus {
    /// Date is in the past
    Expired,
    /// Date falls within the critical window (today inclusive)
    Critical,
    /// Date is further out than the critical window
    Good,
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryStatus::Expired => write!(f, "Expired"),
            ExpiryStatus::Critical => write!(f, "Critical"),
            ExpiryStatus::Good => write!(f, "Good"),
        }
    }
}

/// Bucket an expiry date.
///
/// `Expired` before today, `Critical` up to and including
/// `today + window_days`, `Good` after that.
pub fn categorize(expiry: NaiveDate, today: NaiveDate, window_days: u32) -> ExpiryStatus {
    if expiry < today {
        return ExpiryStatus::Expired;
    }
    match today.checked_add_days(Days::new(u64::from(window_days))) {
        Some(limit) if expiry > limit => ExpiryStatus::Good,
        _ => ExpiryStatus::Critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bucket_boundaries() {
        let today = date(2026, 10, 16);
        assert_eq!(categorize(date(2026, 10, 15), today, 5), ExpiryStatus::Expired);
        assert_eq!(categorize(date(2026, 10, 16), today, 5), ExpiryStatus::Critical);
        assert_eq!(categorize(date(2026, 10, 21), today, 5), ExpiryStatus::Critical);
        assert_eq!(categorize(date(2026, 10, 22), today, 5), ExpiryStatus::Good);
    }

    #[test]
    fn test_zero_window_only_today_is_critical() {
        let today = date(2026, 10, 16);
        assert_eq!(categorize(today, today, 0), ExpiryStatus::Critical);
        assert_eq!(categorize(date(2026, 10, 17), today, 0), ExpiryStatus::Good);
    }

    #[test]
    fn test_window_crosses_month_end() {
        let today = date(2026, 2, 26);
        assert_eq!(categorize(date(2026, 3, 3), today, 5), ExpiryStatus::Critical);
        assert_eq!(categorize(date(2026, 3, 4), today, 5), ExpiryStatus::Good);
    }

    #[test]
    fn test_status_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&ExpiryStatus::Critical).unwrap(),
            "\"Critical\""
        );
        assert_eq!(ExpiryStatus::Expired.to_string(), "Expired");
    }
}
