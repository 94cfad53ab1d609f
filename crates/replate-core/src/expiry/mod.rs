//! Expiry-date scanning.
//!
//! The model is asked to read the printed date off the packaging. Its reply
//! is free text, so the date is recovered with [`parse_date`] and bucketed
//! with [`categorize`].

mod bucket;
mod date;

pub use bucket::{categorize, ExpiryStatus};
pub use date::parse_date;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prompt sent with every packaging photo.
pub const EXPIRY_PROMPT: &str =
    "Extract the expiry date from this image. If there is no date, return null.";

/// The date found in a model reply, formatted `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryInfo {
    pub expiry_date: Option<String>,
}

/// Extract the expiry date from a model reply.
pub fn get_expiry_info(text: &str, today: NaiveDate) -> ExpiryInfo {
    ExpiryInfo {
        expiry_date: parse_date(&[text], today).map(|d| d.format("%Y-%m-%d").to_string()),
    }
}

/// Per-image result of an expiry scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryReport {
    /// Source image
    pub file_path: PathBuf,

    /// Parsed expiry date, if the reply contained one
    pub expiry_date: Option<NaiveDate>,

    /// Bucket for `expiry_date`
    pub status: Option<ExpiryStatus>,

    /// Days from today until the date (negative once expired)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,

    /// The model's reply verbatim
    pub raw_response: String,

    /// Model that produced the reply
    pub model: String,
}

impl ExpiryReport {
    /// Build a report from a model reply.
    pub fn from_reply(
        file_path: PathBuf,
        reply: &str,
        model: &str,
        today: NaiveDate,
        window_days: u32,
    ) -> Self {
        let expiry_date = parse_date(&[reply], today);
        let status = expiry_date.map(|d| categorize(d, today, window_days));

        match (expiry_date, status) {
            (Some(date), Some(status)) => {
                tracing::info!("{:?}: expiry {date} ({status})", file_path)
            }
            _ => tracing::warn!("{:?}: no valid expiry date found", file_path),
        }

        Self {
            file_path,
            expiry_date,
            status,
            days_remaining: expiry_date.map(|d| (d - today).num_days()),
            raw_response: reply.to_string(),
            model: model.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_get_expiry_info_formats_iso() {
        let info = get_expiry_info("The expiry date is 03/11/2026.", today());
        assert_eq!(info.expiry_date.as_deref(), Some("2026-11-03"));
    }

    #[test]
    fn test_get_expiry_info_null() {
        assert_eq!(get_expiry_info("null", today()).expiry_date, None);
    }

    #[test]
    fn test_report_critical() {
        let report = ExpiryReport::from_reply(
            PathBuf::from("yogurt.jpg"),
            "EXP: 19/10/2026",
            "gemini-2.0-flash",
            today(),
            5,
        );
        assert_eq!(report.expiry_date, NaiveDate::from_ymd_opt(2026, 10, 19));
        assert_eq!(report.status, Some(ExpiryStatus::Critical));
        assert_eq!(report.days_remaining, Some(3));
    }

    #[test]
    fn test_report_expired_has_negative_days() {
        let report =
            ExpiryReport::from_reply(PathBuf::from("milk.jpg"), "01-10-26", "m", today(), 5);
        assert_eq!(report.status, Some(ExpiryStatus::Expired));
        assert_eq!(report.days_remaining, Some(-15));
    }

    #[test]
    fn test_report_without_date() {
        let report = ExpiryReport::from_reply(PathBuf::from("rice.jpg"), "null", "m", today(), 5);
        assert!(report.expiry_date.is_none());
        assert!(report.status.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["expiry_date"].is_null());
        assert!(json.get("days_remaining").is_none());
        assert_eq!(json["raw_response"], "null");
    }

    #[test]
    fn test_report_serializes_date_and_status() {
        let report = ExpiryReport::from_reply(
            PathBuf::from("beans.jpg"),
            "Best before 2027-01-31",
            "m",
            today(),
            5,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["expiry_date"], "2027-01-31");
        assert_eq!(json["status"], "Good");
    }
}
