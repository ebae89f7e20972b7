// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" CSV/number/date handling so the rest
// of the code can assume clean, typed values.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Layout of the survey tool's own "Carimbo de data/hora" column.
pub const SUBMISSION_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Day-first layouts seen in the hand-typed review date column.
const DAY_FIRST_DATETIME_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

/// Trim a raw cell and turn empty strings into `None`.
pub fn clean_cell(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}

/// Numeric coercion for manually typed integer columns.
///
/// Accepts `"2024"` as well as spreadsheet-style `"2024.0"`; anything else,
/// including fractional values, is `None`.
pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i32>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

/// Strict parse of the submission timestamp column.
pub fn parse_submission_timestamp(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, SUBMISSION_TIMESTAMP_FORMAT).ok()
}

/// Lenient day-first parse: full timestamp, timestamp without seconds, or a
/// bare date (taken as midnight).
pub fn parse_day_first(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DAY_FIRST_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn days_diff(start: NaiveDate, end: NaiveDate) -> i64 {
    // `NaiveDate` supports subtraction; the result is a `Duration` in days.
    (end - start).num_days()
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn median(mut v: Vec<f64>) -> f64 {
    // We accept `Vec<f64>` by value so the function can sort in-place
    // without cloning at the call site.
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Ordinary least-squares line through `(i, ys[i])`, evaluated at each `i`.
///
/// The X axis is the point index, not the calendar date, so gaps between
/// periods do not bend the line.
pub fn linear_trend(ys: &[f64]) -> Vec<f64> {
    let n = ys.len();
    if n == 0 {
        return Vec::new();
    }
    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let mean_x = average(&xs);
    let mean_y = average(ys);
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    let slope = if sxx.abs() < f64::EPSILON { 0.0 } else { sxy / sxx };
    let intercept = mean_y - slope * mean_x;
    xs.iter().map(|x| intercept + slope * x).collect()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `1,204 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_timestamp_requires_full_layout() {
        let dt = parse_submission_timestamp(Some("02/01/2024 13:45:10")).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!(parse_submission_timestamp(Some("02/01/2024")).is_none());
        assert!(parse_submission_timestamp(Some("2024-01-02 13:45:10")).is_none());
        assert!(parse_submission_timestamp(Some("  ")).is_none());
    }

    #[test]
    fn day_first_accepts_bare_dates() {
        let dt = parse_day_first(Some("10/01/2024")).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        let dt = parse_day_first(Some("10/01/2024 08:30")).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(parse_day_first(Some("31/02/2024")).is_none());
    }

    #[test]
    fn integer_coercion_handles_spreadsheet_floats() {
        assert_eq!(parse_i32_safe(Some("2024")), Some(2024));
        assert_eq!(parse_i32_safe(Some(" 2024.0 ")), Some(2024));
        assert_eq!(parse_i32_safe(Some("2024.5")), None);
        assert_eq!(parse_i32_safe(Some("dois mil")), None);
        assert_eq!(parse_i32_safe(None), None);
    }

    #[test]
    fn trend_fits_a_straight_line() {
        let trend = linear_trend(&[1.0, 3.0, 5.0]);
        assert_eq!(trend.len(), 3);
        assert!((trend[0] - 1.0).abs() < 1e-9);
        assert!((trend[2] - 5.0).abs() < 1e-9);
        assert_eq!(linear_trend(&[4.0]), vec![4.0]);
        assert!(linear_trend(&[]).is_empty());
    }

    #[test]
    fn stats_helpers() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(round2(2.345_6), 2.35);
        assert_eq!(format_number(1234.5, 2), "1,234.50");
        assert_eq!(format_int(9855), "9,855");
    }
}
