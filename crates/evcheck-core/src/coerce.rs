//! Value coercion helpers
//!
//! Rule checks compare values through their string forms rather than through
//! strict typed equality: `5`, `5.0` and `"5"` all satisfy `value: 5`. The
//! conversions live here so every check shares one definition of "string
//! form", "truthy", "length" and "category".
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde_json::{Number, Value};

/// String form used for an absent value
pub const UNDEFINED: &str = "undefined";

/// String form of an optional value
///
/// - absent → `"undefined"`
/// - `null` → `"null"`
/// - booleans → `"true"` / `"false"`
/// - numbers → shortest round-trip form as JavaScript prints it: integral
///   floats without a fractional part, exponent notation below `1e-6` and
///   from `1e21` (`1e-7`, `1e+21`)
/// - strings → verbatim
/// - arrays → items joined by `,`, null items rendered empty
/// - objects → `"[object Object]"`
pub fn to_display_string(value: Option<&Value>) -> String {
    match value {
        None => UNDEFINED.to_string(),
        Some(value) => value_to_string(value),
    }
}

/// String form of a present value, see [`to_display_string`]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => value_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_to_string(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }

    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.is_finite() => float_to_string(f),
        _ => n.to_string(),
    }
}

/// Shortest round-trip digits laid out the way JavaScript prints numbers:
/// plain decimal for exponents in `-7..21`, otherwise `1.5e+300` / `1e-7`
fn float_to_string(f: f64) -> String {
    // `{:e}` yields the shortest digits, e.g. `1.2345e-7`
    let scientific = format!("{:e}", f.abs());
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return f.to_string(),
    };
    let exponent: i32 = match exponent.parse() {
        Ok(exponent) => exponent,
        Err(_) => return f.to_string(),
    };

    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let fraction = if k > 1 {
            format!(".{}", &digits[1..])
        } else {
            String::new()
        };
        format!("{}{}e{}{}", &digits[..1], fraction, sign, (n - 1).abs())
    };

    if f.is_sign_negative() {
        format!("-{}", body)
    } else {
        body
    }
}

/// Whether a value counts as "present" for contains-mode matching
///
/// `null`, `false`, `0` and `""` are falsy. Arrays and objects are always
/// truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Null or an all-whitespace string
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Measured length of a value
///
/// `null` measures as an empty array. Strings are measured in UTF-16 code
/// units, arrays in items. Numbers, booleans and objects have no length.
pub fn measured_length(value: &Value) -> Option<usize> {
    match value {
        Value::Null => Some(0),
        Value::String(s) => Some(s.encode_utf16().count()),
        Value::Array(items) => Some(items.len()),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => None,
    }
}

/// Runtime category name of a value
///
/// Arrays report `array`; `null` reports `object`.
pub fn runtime_category(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::Object(_) => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
    }
}

/// Integer-prefix parse of a declared length
///
/// Numbers are truncated toward zero. Strings are parsed from their leading
/// sign and digits after optional whitespace, so `"5px"` is 5. Anything
/// without a leading integer yields `None`.
pub fn parse_leading_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim_start();
            let (sign, rest) = match trimmed.as_bytes().first() {
                Some(b'-') => (-1, &trimmed[1..]),
                Some(b'+') => (1, &trimmed[1..]),
                _ => (1, trimmed),
            };
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return None;
            }
            digits.parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}
