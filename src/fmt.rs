use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Round half away from zero; non-finite values collapse to 0.
fn rounded(val: f64) -> i64 {
    if val.is_finite() {
        val.round() as i64
    } else {
        0
    }
}

fn with_commas(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

/// Format a monetary amount as a whole number with thousands separators: KES 1,234
pub fn money(prefix: &str, val: f64) -> String {
    let n = rounded(val);
    let body = with_commas(n.unsigned_abs());
    if n < 0 {
        format!("-{prefix} {body}")
    } else {
        format!("{prefix} {body}")
    }
}

/// Same rounding as [`money`], without prefix or separators. Safe inside a CSV cell.
pub fn money_plain(val: f64) -> String {
    rounded(val).to_string()
}

pub fn percent(val: f64) -> String {
    if !val.is_finite() || val <= 0.0 {
        "0%".to_string()
    } else if val < 1.0 {
        "< 1%".to_string()
    } else {
        format!("{}%", rounded(val))
    }
}

pub fn trend(val: f64) -> String {
    match rounded(val) {
        0 => "0%".to_string(),
        n if n > 0 => format!("+{n}%"),
        n => format!("{n}%"),
    }
}

pub fn ratio(val: f64) -> String {
    if val.is_finite() {
        format!("{val:.1}x")
    } else {
        "0.0x".to_string()
    }
}

pub fn count(val: u64) -> String {
    with_commas(val)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// ISO date (or date-time) → "05 Mar 2025". Empty → "—", unparseable → as given.
pub fn date_label(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "—".to_string();
    }
    match parse_date(raw) {
        Some(d) => d.format("%d %b %Y").to_string(),
        None => raw.trim().to_string(),
    }
}

pub fn timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Hour of day from "HH:MM", "HH:MM:SS" or an ISO date-time.
pub fn hour_of(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw.get(..19).unwrap_or(raw), fmt) {
            return Some(dt.hour());
        }
    }
    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(raw, fmt) {
            return Some(t.hour());
        }
    }
    None
}
