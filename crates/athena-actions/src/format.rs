//! Deterministic number and date rendering for response text.
//!
//! Output follows en-US conventions: comma thousands grouping, `.` decimal
//! separator, currency symbol prefix. All dates are rendered in UTC.

use chrono::{DateTime, Utc};

/// Render `value` with comma grouping and between `min_frac` and
/// `max_frac` fraction digits (trailing zeros trimmed down to `min_frac`).
pub fn format_number(value: f64, min_frac: usize, max_frac: usize) -> String {
    let max_frac = max_frac.max(min_frac);
    let fixed = format!("{:.*}", max_frac, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (fixed.as_str(), ""),
    };

    let mut frac = frac_part.to_string();
    while frac.len() > min_frac && frac.ends_with('0') {
        frac.pop();
    }

    let mut out = group_thousands(int_part);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }

    let is_zero = out.chars().all(|c| matches!(c, '0' | '.' | ','));
    if value.is_sign_negative() && !is_zero {
        out.insert(0, '-');
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "CNY" => Some("CN¥"),
        "INR" => Some("₹"),
        "KRW" => Some("₩"),
        "CAD" => Some("CA$"),
        "AUD" => Some("A$"),
        _ => None,
    }
}

fn currency_digits(code: &str) -> usize {
    match code {
        "JPY" | "KRW" => 0,
        _ => 2,
    }
}

/// Currency-style rendering, e.g. `$1,234.50`, `€12.00`, `CHF 3.10`.
///
/// The currency's own fraction digits apply unless `max_frac` lowers them.
pub fn format_currency(value: f64, code: &str, max_frac: Option<usize>) -> String {
    let code = code.to_ascii_uppercase();
    let digits = currency_digits(&code);
    let frac = max_frac.map_or(digits, |m| m.min(digits));
    let number = format_number(value.abs(), frac, frac);
    let sign = if value < 0.0 && number.chars().any(|c| matches!(c, '1'..='9')) {
        "-"
    } else {
        ""
    };
    match currency_symbol(&code) {
        Some(sym) => format!("{sign}{sym}{number}"),
        None => format!("{sign}{code}\u{a0}{number}"),
    }
}

/// Two decimals with a `+` prefix for non-negative values: `+2.50%`.
pub fn format_signed_percent(value: f64) -> String {
    let prefix = if value >= 0.0 { "+" } else { "" };
    format!("{prefix}{value:.2}%")
}

/// Billions with two decimals: `870.50B`.
pub fn format_billions(value: f64) -> String {
    format!("{:.2}B", value / 1e9)
}

/// Fraction digits `format_scaled` will render at most.
pub const MAX_SCALED_FRACTION: usize = 18;

/// Shift a mantissa by a base-10 exponent and render with grouping:
/// `(6_512_345_678, -8)` → `65.12345678`.
pub fn format_scaled(mantissa: i64, expo: i32) -> String {
    let value = mantissa as f64 * 10f64.powi(expo);
    let frac = if expo < 0 {
        (expo.unsigned_abs() as usize).min(MAX_SCALED_FRACTION)
    } else {
        0
    };
    format_number(value, 2.min(frac), frac)
}

/// Unix seconds to a UTC timestamp, `None` when out of range.
pub fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// `1/19/2025`
pub fn short_date(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

/// `1/19/2025, 3:04:05 PM`
pub fn short_date_time(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// `January 20, 2025, 12:31 PM`
pub fn long_date_time(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y, %I:%M %p").to_string()
}
