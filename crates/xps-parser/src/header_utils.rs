//! Header line utilities for the XY parser
//!
//! Prodigy writes metadata as `# Key: value` comment lines. Values may
//! themselves contain colons (dates, slit names), so only the first colon
//! separates key from value.

/// Remove the `#` markers and surrounding whitespace from a comment line
#[must_use]
pub fn strip_comment(text: &str) -> &str {
    text.trim_matches('#').trim()
}

/// Check whether a comment line carries no content at all
#[must_use]
pub fn is_empty_comment(text: &str) -> bool {
    strip_comment(text).is_empty()
}

/// Split a comment line into a trimmed key and value
///
/// A line without a colon yields its whole text as both key and value.
/// Returns None when no key remains.
#[must_use]
pub fn split_header_line(text: &str) -> Option<(String, String)> {
    let stripped = strip_comment(text);
    let (key, value) = match stripped.split_once(':') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (stripped, stripped),
    };

    if key.is_empty() {
        None
    } else {
        Some((key.to_string(), value.to_string()))
    }
}

/// Round a value to `digits` decimal places
///
/// Values too large to carry any fractional digits are returned unchanged.
#[must_use]
pub fn round_to(value: f64, digits: u32) -> f64 {
    if !value.is_finite() || value.abs() >= 1e15 {
        return value;
    }
    let factor = 10f64.powi(digits.min(15) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
