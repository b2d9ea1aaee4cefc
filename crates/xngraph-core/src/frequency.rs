//! Clock frequency normalization
//!
//! XN files spell frequencies in several ways (`500MHz`, `20 mhz`, `100M`,
//! `25000000`, `50KHz`). Everything is normalized to Hertz.

use crate::error::XnError;

/// Convert a frequency string with an optional `k`/`M` (and `Hz`) suffix to Hertz
///
/// The leading run of digits and dots is the value. Whitespace may separate
/// it from a single multiplier character; anything other than `k` or `m`
/// (case-insensitive) in that position is ignored.
pub fn parse_frequency(value: &str) -> Result<f64, XnError> {
    let lower = value.trim_start().to_ascii_lowercase();
    let digits_end = lower
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(lower.len());
    let (number, rest) = lower.split_at(digits_end);

    if number.is_empty() {
        return Err(XnError::MalformedFrequency(value.to_string()));
    }
    let base: f64 = number
        .parse()
        .map_err(|_| XnError::MalformedFrequency(value.to_string()))?;

    let multiplier = match rest.trim_start().chars().next() {
        Some('k') => 1e3,
        Some('m') => 1e6,
        _ => 1.0,
    };

    let hz = base * multiplier;
    if !hz.is_finite() || hz <= 0.0 {
        return Err(XnError::MalformedFrequency(value.to_string()));
    }
    Ok(hz)
}
