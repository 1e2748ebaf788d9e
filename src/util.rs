// Utility helpers for lenient parsing, guarded arithmetic and number display.
//
// Every cell coercion in the loader goes through the `parse_*` functions
// here, so the "bad value becomes 0 / false" policy lives in one place and
// the rest of the code can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Date layouts accepted in the source file, tried in order.
///
/// ISO is what the exporter writes. The day-first form uses `/` so it can
/// never be confused with the ISO layout.
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Weekday names indexed by `Weekday::num_days_from_monday`.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Month names indexed by `month0`.
pub const MONTHS: [&str; 12] = [
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

/// Parse a currency cell that may use a decimal comma.
///
/// - Trims whitespace and swaps `,` for `.` (`"12,50"` -> `12.5`).
/// - A cell holding exactly `True` or `False` is treated as `0`.
/// - Anything unparseable, missing, `NaN` or infinite yields `0.0`.
pub fn parse_money(s: Option<&str>) -> f64 {
    let Some(s) = s else { return 0.0 };
    let s = s.trim().replace(',', ".");
    if s == "True" || s == "False" {
        return 0.0;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Largest magnitude a single count cell may carry. Totals are summed in
/// `i64`, so keeping each cell within `i32` range leaves room for billions
/// of rows before a sum could overflow.
pub const MAX_COUNT: i64 = i32::MAX as i64;

/// Parse an integer count. Decimal text is truncated toward zero
/// (`"3.0"` -> `3`), everything else unparseable becomes `0`. Values are
/// clamped to `±MAX_COUNT`.
pub fn parse_count(s: Option<&str>) -> i64 {
    let Some(s) = s.map(str::trim) else { return 0 };
    let v = match s.parse::<i64>() {
        Ok(v) => v,
        Err(_) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() => v.trunc() as i64,
            _ => 0,
        },
    };
    v.clamp(-MAX_COUNT, MAX_COUNT)
}

/// Only a literal `true` (any case, surrounding whitespace ignored) is true.
pub fn parse_flag(s: Option<&str>) -> bool {
    s.map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// `numerator / denominator`, or `0.0` when the denominator is zero or the
/// result is not finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let v = numerator / denominator;
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Share of `part` in `whole` as a percentage, 0 when `whole` is zero.
pub fn percent(part: f64, whole: f64) -> f64 {
    safe_div(part, whole) * 100.0
}

/// Relative change from `previous` to `current` in percent.
///
/// A non-positive baseline suppresses the delta and reports `0.0`.
pub fn pct_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        safe_div(current - previous, previous) * 100.0
    } else {
        0.0
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Least-squares straight line through `(i, ys[i])` for `i = 0..n`.
///
/// Returns `(slope, intercept)`. With fewer than two points the slope is 0
/// and the intercept is the mean of what is there.
pub fn linear_fit(ys: &[f64]) -> (f64, f64) {
    let n = ys.len();
    if n < 2 {
        return (0.0, average(ys));
    }
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = average(ys);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    let slope = safe_div(sxy, sxx);
    (slope, mean_y - slope * mean_x)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators on the integer part,
    // e.g. `1,234,567.89`.
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
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Currency in the dashboard's `R$ 1,234.56` style.
pub fn format_money(n: f64) -> String {
    format!("R$ {}", format_number(n, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
