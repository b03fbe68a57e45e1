//! Best-effort scalar coercion.
//!
//! Upstream feeds send numbers, numeric strings, placeholders and garbage
//! in the same slots. None of these functions fail: anything that is not a
//! usable number becomes `None`.

use serde_json::Value;

/// Placeholder strings that mean "not reported", compared case-insensitively
const NULL_MARKERS: &[&str] = &["N/A", "NULL", "NONE"];

/// Converts a raw scalar into a finite `f64`.
///
/// Fallback order:
/// 1. JSON numbers are taken as-is.
/// 2. Strings are trimmed; empty strings and [`NULL_MARKERS`] give `None`.
/// 3. Remaining strings are parsed as `f64`.
///
/// Booleans, arrays, objects, unparseable strings and non-finite results
/// give `None`.
pub fn parse_lenient_float(raw: &Value) -> Option<f64> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || NULL_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)) {
                return None;
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Converts a raw scalar into an integer by truncating its lenient float value
pub fn parse_lenient_int(raw: &Value) -> Option<i64> {
    parse_lenient_float(raw).map(|v| v.trunc() as i64)
}

/// The 16 compass points, clockwise from north in 22.5° steps
const COMPASS_POINTS: &[&str] = &[
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Maps a compass point such as `WSW` to degrees. Case-insensitive.
pub fn compass_to_degrees(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    COMPASS_POINTS
        .iter()
        .position(|point| point.eq_ignore_ascii_case(raw))
        .map(|index| index as f64 * 22.5)
}

/// Wind direction in degrees from either a number or a compass point.
///
/// Unknown tokens (`Variable`, `CALM`, typos) give `None`.
pub fn parse_wind_direction(raw: &Value) -> Option<f64> {
    match raw {
        Value::String(s) => compass_to_degrees(s).or_else(|| parse_lenient_float(raw)),
        _ => parse_lenient_float(raw),
    }
}

/// Renders a scalar the way it appeared upstream, `None` for null
pub fn scalar_to_string(raw: &Value) -> Option<String> {
    match raw {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
