use std::borrow::Cow;

use memchr::memchr;

/// Result of coercing one raw cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced<T> {
    Value(T),
    /// Empty cell
    Blank,
    /// Non-empty cell that did not parse
    Invalid,
}

impl<T> Coerced<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Coerced::Value(v) => Some(v),
            Coerced::Blank | Coerced::Invalid => None,
        }
    }
}

/// Parse-or-missing float coercion. Non-finite values count as invalid.
pub fn coerce_f64(field: &[u8]) -> Coerced<f64> {
    let field = field.trim_ascii();
    if field.is_empty() {
        return Coerced::Blank;
    }

    match fast_float::parse::<f64, _>(field) {
        Ok(v) if v.is_finite() => Coerced::Value(v),
        _ => Coerced::Invalid,
    }
}

/// Parse-or-missing integer coercion. Integral float text such as `2023.0`
/// is accepted.
pub fn coerce_i64(field: &[u8]) -> Coerced<i64> {
    let field = field.trim_ascii();
    if field.is_empty() {
        return Coerced::Blank;
    }

    if let Ok(v) = atoi_simd::parse::<i64>(field) {
        return Coerced::Value(v);
    }

    match coerce_f64(field) {
        Coerced::Value(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            Coerced::Value(v as i64)
        }
        _ => Coerced::Invalid,
    }
}

/// Removes `,` grouping separators; borrows when there are none.
pub fn strip_grouping(field: &[u8]) -> Cow<'_, [u8]> {
    if memchr(b',', field).is_none() {
        return Cow::Borrowed(field);
    }
    Cow::Owned(field.iter().copied().filter(|&b| b != b',').collect())
}

/// Formats a value rounded to an integer with `,` thousands separators.
pub fn format_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };

    let mut out = String::with_capacity(rounded.len() + digits.len() / 3);
    out.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
