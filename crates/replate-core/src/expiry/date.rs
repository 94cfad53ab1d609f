//! Printed-date extraction from free text.
//!
//! Three numeric layouts are tried in a fixed order: day-first
//! (`DD/MM/YYYY`, `DD-MM-YY`), year-first (`YYYY/MM/DD`), and compact
//! `DDMMYY`. Every match of a layout is tried before the next layout, and
//! the first candidate that is a real calendar date wins.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").expect("valid regex"));

static YEAR_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b").expect("valid regex"));

static COMPACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{6}\b").expect("valid regex"));

/// Find the first valid date in `texts`.
///
/// `today` anchors two-digit years in slash/dash dates.
pub fn parse_date(texts: &[&str], today: NaiveDate) -> Option<NaiveDate> {
    let combined = texts.join(" ");

    first_match(&DAY_FIRST, &combined, |m| parse_day_first(m, today))
        .or_else(|| first_match(&YEAR_FIRST, &combined, parse_year_first))
        .or_else(|| first_match(&COMPACT, &combined, parse_compact))
}

fn first_match(
    pattern: &Regex,
    text: &str,
    parse: impl Fn(&str) -> Option<NaiveDate>,
) -> Option<NaiveDate> {
    pattern.find_iter(text).find_map(|m| {
        let date = parse(m.as_str());
        if date.is_none() {
            tracing::trace!("Skipping non-date candidate '{}'", m.as_str());
        }
        date
    })
}

fn split_numeric(s: &str) -> Option<(u32, u32, &str)> {
    let mut parts = s.split(|c: char| c == '/' || c == '-');
    let first = parts.next()?.parse().ok()?;
    let second = parts.next()?.parse().ok()?;
    let third = parts.next()?;
    Some((first, second, third))
}

/// `a/b/c` read day-first; falls back to month-first only when the second
/// component cannot be a month.
fn parse_day_first(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (a, b, year) = split_numeric(s)?;
    let year = match year.len() {
        2 => expand_two_digit_year(year.parse().ok()?, today.year()),
        4 => year.parse().ok()?,
        _ => return None,
    };
    let (day, month) = if a > 12 || b <= 12 { (a, b) } else { (b, a) };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year_first(s: &str) -> Option<NaiveDate> {
    let (year, month, day) = split_numeric(s)?;
    NaiveDate::from_ymd_opt(year as i32, month, day.parse().ok()?)
}

/// `DDMMYY`, with `strptime`'s `%y` pivot: 00-68 → 20xx, 69-99 → 19xx.
fn parse_compact(s: &str) -> Option<NaiveDate> {
    let day = s.get(0..2)?.parse().ok()?;
    let month = s.get(2..4)?.parse().ok()?;
    let yy: i32 = s.get(4..6)?.parse().ok()?;
    let year = if yy <= 68 { 2000 + yy } else { 1900 + yy };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Place a two-digit year within 50 years of `current_year`.
fn expand_two_digit_year(yy: i32, current_year: i32) -> i32 {
    let year = current_year / 100 * 100 + yy;
    if year >= current_year + 50 {
        year - 100
    } else if year < current_year - 50 {
        year + 100
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn parse(text: &str) -> Option<NaiveDate> {
        parse_date(&[text], today())
    }

    #[test]
    fn test_day_first_slash() {
        assert_eq!(parse("EXP 04/03/2027"), ymd(2027, 3, 4));
    }

    #[test]
    fn test_day_first_dash_two_digit_year() {
        assert_eq!(parse("Best before: 12-05-27"), ymd(2027, 5, 12));
    }

    #[test]
    fn test_month_first_when_second_component_is_not_a_month() {
        assert_eq!(parse("USE BY 03/25/2027"), ymd(2027, 3, 25));
    }

    #[test]
    fn test_invalid_day_first_candidate_is_skipped() {
        // 31/02 is not a date; the next candidate wins
        assert_eq!(parse("LOT 31/02/2027 EXP 01/11/2026"), ymd(2026, 11, 1));
    }

    #[test]
    fn test_three_digit_year_rejected() {
        assert_eq!(parse("batch 12/05/202"), None);
    }

    #[test]
    fn test_year_first_iso() {
        assert_eq!(parse("The expiry date is 2026-10-20."), ymd(2026, 10, 20));
        assert_eq!(parse("2027/1/9"), ymd(2027, 1, 9));
    }

    #[test]
    fn test_day_first_layout_wins_over_year_first() {
        assert_eq!(
            parse("Packed 2026/09/01, expires 15/10/2026"),
            ymd(2026, 10, 15)
        );
    }

    #[test]
    fn test_compact_ddmmyy() {
        assert_eq!(parse("EXP 150327"), ymd(2027, 3, 15));
        assert_eq!(parse("EXP 150399"), ymd(1999, 3, 15));
    }

    #[test]
    fn test_compact_invalid_month_skipped() {
        assert_eq!(parse("code 123456"), None);
    }

    #[test]
    fn test_null_reply_has_no_date() {
        assert_eq!(parse("null"), None);
        assert_eq!(parse("There is no expiry date visible."), None);
    }

    #[test]
    fn test_multiple_texts_joined() {
        assert_eq!(
            parse_date(&["Best before", "05/11/26"], today()),
            ymd(2026, 11, 5)
        );
    }

    #[test]
    fn test_digits_inside_longer_numbers_ignored() {
        assert_eq!(parse("barcode 5012345678900"), None);
    }

    #[test]
    fn test_expand_two_digit_year() {
        assert_eq!(expand_two_digit_year(26, 2026), 2026);
        assert_eq!(expand_two_digit_year(75, 2026), 2075);
        assert_eq!(expand_two_digit_year(76, 2026), 1976);
        assert_eq!(expand_two_digit_year(5, 2090), 2105);
    }
}
