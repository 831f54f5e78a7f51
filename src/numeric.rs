//! Decoding boundary for numeric payload fields.
//!
//! Report payloads arrive as JSON produced by a REST API that is loose about
//! number encoding: the same field can be `1200`, `1200.5`, `"1200.50"` or
//! `null`. Every numeric field is routed through one of these helpers with
//! `#[serde(default, deserialize_with = "...")]`, so calculators only ever
//! see finite, non-negative values. Absent and `null` normalise to zero;
//! anything that is present but malformed is rejected.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Num(f64),
    Text(String),
}

fn parse_text(s: &str) -> Result<f64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    s.parse::<f64>()
        .map_err(|_| format!("malformed number {s:?}"))
}

fn raw_value<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = match Option::<Raw>::deserialize(d)? {
        None => 0.0,
        Some(Raw::Num(n)) => n,
        Some(Raw::Text(s)) => parse_text(&s).map_err(D::Error::custom)?,
    };
    if !value.is_finite() {
        return Err(D::Error::custom("number is not finite"));
    }
    Ok(value)
}

/// Monetary amount or rate: finite and non-negative.
pub fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = raw_value(d)?;
    if value < 0.0 {
        return Err(D::Error::custom(format!("negative amount {value}")));
    }
    Ok(value)
}

/// Largest count an `f64` carries exactly (2^53).
pub const MAX_QUANTITY: f64 = 9_007_199_254_740_992.0;

/// Item or unit count: a non-negative whole number no larger than 2^53.
pub fn quantity<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = raw_value(d)?;
    if value < 0.0 {
        return Err(D::Error::custom(format!("negative quantity {value}")));
    }
    if value.fract() != 0.0 {
        return Err(D::Error::custom(format!("fractional quantity {value}")));
    }
    if value > MAX_QUANTITY {
        return Err(D::Error::custom(format!("quantity {value} out of range")));
    }
    Ok(value as u64)
}

/// Day offset; negative means already past.
pub fn days<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let value = raw_value(d)?;
    if value.fract() != 0.0 {
        return Err(D::Error::custom(format!("fractional day count {value}")));
    }
    Ok(value as i64)
}

pub fn optional_days<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Option::<Raw>::deserialize(d)? {
        None => Ok(None),
        Some(Raw::Num(n)) if n.is_finite() && n.fract() == 0.0 => Ok(Some(n as i64)),
        Some(Raw::Num(n)) => Err(D::Error::custom(format!("invalid day count {n}"))),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => {
            let n = parse_text(&s).map_err(D::Error::custom)?;
            if n.fract() != 0.0 {
                return Err(D::Error::custom(format!("fractional day count {n}")));
            }
            Ok(Some(n as i64))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

/// Record identifier sent either as a string or as an integer.
pub fn identifier<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<RawId>::deserialize(d)? {
        None => String::new(),
        Some(RawId::Int(n)) => n.to_string(),
        Some(RawId::Text(s)) => s,
    })
}

/// Free text that may be `null`.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}
