use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ExtractError, Result};

/// The `decimals` attribute of a numeric fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decimals {
    Finite(i32),
    Infinite,
}

impl FromStr for Decimals {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("INF") {
            return Ok(Decimals::Infinite);
        }
        s.parse::<i32>()
            .map(Decimals::Finite)
            .map_err(|_| ExtractError::InvalidNumber(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// Reads the iXBRL `sign` attribute; only `-` negates.
    pub fn from_attribute(attr: Option<&str>) -> Self {
        match attr.map(str::trim) {
            Some("-") => Sign::Negative,
            _ => Sign::Positive,
        }
    }
}

/// Power of ten the displayed number must be multiplied by.
///
/// An explicit `scale` wins. Without one, a negative `decimals` means the
/// figure is shown in units of 10^-decimals (decimals=-3 is thousands).
pub fn scale_exponent(scale: Option<i32>, decimals: Option<Decimals>) -> i32 {
    if let Some(scale) = scale {
        return scale;
    }
    match decimals {
        Some(Decimals::Finite(d)) if d < 0 => -d,
        _ => 0,
    }
}

/// Scales a parsed figure; `sign="-"` forces a negative value even when the
/// displayed text was already parenthesised.
pub fn normalize(magnitude: f64, exponent: i32, sign: Sign) -> f64 {
    let scaled = magnitude * 10f64.powi(exponent);
    match sign {
        Sign::Positive => scaled,
        Sign::Negative => -scaled.abs(),
    }
}

enum NumberFormat {
    DotDecimal,
    CommaDecimal,
    ZeroDash,
    FixedZero,
}

impl NumberFormat {
    fn from_attribute(format: Option<&str>) -> Self {
        let name = format
            .map(|f| crate::ixbrl::document::strip_prefix(f).to_lowercase().replace('-', ""))
            .unwrap_or_default();
        if name == "fixedzero" {
            NumberFormat::FixedZero
        } else if name.contains("zerodash") || name.contains("numdash") {
            NumberFormat::ZeroDash
        } else if name.contains("commadecimal") {
            NumberFormat::CommaDecimal
        } else {
            NumberFormat::DotDecimal
        }
    }
}

fn is_dash(text: &str) -> bool {
    text.is_empty() || matches!(text, "-" | "\u{2013}" | "\u{2014}" | "nil")
}

/// Reads the displayed text of a numeric fact as a number.
///
/// Currency symbols, thousands separators and whitespace are dropped and a
/// parenthesised figure reads as negative.
pub fn parse_numeric(raw: &str, format: Option<&str>) -> Result<f64> {
    let format = NumberFormat::from_attribute(format);
    let text: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '£' | '$' | '€') && !c.is_whitespace())
        .collect();

    match format {
        NumberFormat::FixedZero => return Ok(0.0),
        NumberFormat::ZeroDash if is_dash(&text) => return Ok(0.0),
        _ => {}
    }

    let (negative, body) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner.to_string()),
        None => (false, text.clone()),
    };

    let body = match format {
        NumberFormat::CommaDecimal => body.replace('.', "").replace(',', "."),
        _ => body.replace(',', ""),
    };

    let value: f64 = body
        .parse()
        .map_err(|_| ExtractError::InvalidNumber(raw.to_string()))?;
    if !value.is_finite() {
        return Err(ExtractError::InvalidNumber(raw.to_string()));
    }

    Ok(if negative { -value } else { value })
}

/// Rounds to `places` decimal places, halves away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Largest magnitude divided exactly as an integer.
const EXACT_LIMIT: f64 = 1e15;

/// `100 * numerator / denominator` rounded to `places`, halves away from zero.
///
/// Whole-unit inputs are divided as integers with the remainder deciding the
/// last digit, so an exact half such as 1.005 is never lost to the binary
/// quotient. Returns `None` for a zero or non-finite denominator.
pub fn percentage(numerator: f64, denominator: f64, places: u32) -> Option<f64> {
    if denominator == 0.0 || !numerator.is_finite() || !denominator.is_finite() {
        return None;
    }
    let whole = |v: f64| v.fract() == 0.0 && v.abs() < EXACT_LIMIT;
    if !whole(numerator) || !whole(denominator) {
        return Some(round_to(100.0 * numerator / denominator, places as i32))
            .filter(|p| p.is_finite());
    }

    let factor = 10i128.pow(places);
    let num = numerator as i128 * 100 * factor;
    let den = denominator as i128;
    let negative = (num < 0) != (den < 0);
    let (num, den) = (num.abs(), den.abs());

    let mut quotient = num / den;
    if (num % den) * 2 >= den {
        quotient += 1;
    }
    let quotient = if negative { -quotient } else { quotient };
    Some(quotient as f64 / factor as f64)
}
