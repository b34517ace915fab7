// Utility helpers for cell coercion, percentages and number formatting.
//
// Every "dirty" CSV value goes through the parse helpers here so the rest of
// the code can assume typed, non-failing values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Parse an integer cell, being forgiving about thousands separators and
/// decimal exports (`"1,234"`, `"12.0"`).
///
/// Returns `None` for anything that cannot be read as a finite number, so the
/// caller can apply its own default. Decimals truncate toward zero.
pub fn parse_i64_lenient(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if !f.is_finite() || f.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(f.trunc() as i64)
}

/// Trimmed string cell; `None` for a missing or blank cell.
pub fn parse_string(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// `part / total * 100`, reporting `0` instead of NaN/inf when `total` is 0.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    let pct = part / total * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// First day of the given month, or `None` if it is not a calendar date.
pub fn period_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// English name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(idx).copied()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places plus locale-aware thousands separators
    // (e.g. `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
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
    // Counts in sentences and stat cards, e.g. `9,855 vehicles`.
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_i64_lenient() {
        assert_eq!(parse_i64_lenient(Some("42")), Some(42));
        assert_eq!(parse_i64_lenient(Some(" 1,234 ")), Some(1234));
        assert_eq!(parse_i64_lenient(Some("12.7")), Some(12));
        assert_eq!(parse_i64_lenient(Some("-3")), Some(-3));
        assert_eq!(parse_i64_lenient(Some("abc")), None);
        assert_eq!(parse_i64_lenient(Some("")), None);
        assert_eq!(parse_i64_lenient(Some("NaN")), None);
        assert_eq!(parse_i64_lenient(None), None);
    }

    #[test]
    fn test_parse_string() {
        assert_eq!(parse_string(Some("  KA ")), Some("KA".to_string()));
        assert_eq!(parse_string(Some("   ")), None);
        assert_eq!(parse_string(None), None);
    }

    #[test]
    fn test_percentage_guards_zero_total() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(0.0, 0.0), 0.0);
        assert_eq!(format!("{:.1}", percentage(5.0, 15.0)), "33.3");
    }

    #[test]
    fn test_period_start() {
        assert_eq!(period_start(2021, 3), NaiveDate::from_ymd_opt(2021, 3, 1));
        assert_eq!(period_start(2021, 0), None);
        assert_eq!(period_start(2021, 13), None);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_int(1_234_567u64), "1,234,567");
        assert_eq!(format_number(1234.5, 1), "1,234.5");
        assert_eq!(format_number(-50.0, 1), "-50.0");
        assert_eq!(format_number(12.0, 0), "12");
    }
}
