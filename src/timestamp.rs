//! Human-readable timestamp parsing.
//!
//! Accepts plain seconds (`"95"`, `"95.5"`), `mm:ss` and `hh:mm:ss`. Each
//! component is a non-negative real number. Validation is structural only:
//! `"90:00"` or `"99:99"` are accepted and simply add up, so totals beyond
//! the usual 60-minute or 60-second wraparound still resolve.
//!
//! # Example
//!
//! ```
//! use clipcut::parse_timestamp;
//!
//! assert_eq!(parse_timestamp("95").unwrap(), 95.0);
//! assert_eq!(parse_timestamp("1:35").unwrap(), 95.0);
//! assert_eq!(parse_timestamp("0:01:35").unwrap(), 95.0);
//! assert!(parse_timestamp("1:2:3:4").is_err());
//! ```

use crate::error::ClipError;

/// Convert a timestamp string into elapsed seconds.
///
/// # Errors
///
/// Returns [`ClipError::InvalidFormat`] if the string is empty, splits on
/// `:` into anything other than 1, 2 or 3 segments, or contains a segment
/// that is not a finite non-negative number.
pub fn parse_timestamp(text: &str) -> Result<f64, ClipError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClipError::invalid_format(text, "time value cannot be empty"));
    }

    let segments: Vec<&str> = trimmed.split(':').collect();
    if segments.len() > 3 {
        return Err(ClipError::invalid_format(
            text,
            format!(
                "expected ss, mm:ss or hh:mm:ss, found {} segments",
                segments.len()
            ),
        ));
    }

    // Most significant first: fold each component into the running total.
    let mut total = 0.0;
    for segment in segments {
        total = total * 60.0 + parse_component(text, segment)?;
    }
    Ok(total)
}

fn parse_component(text: &str, segment: &str) -> Result<f64, ClipError> {
    let segment = segment.trim();
    let value: f64 = segment.parse().map_err(|_| {
        ClipError::invalid_format(text, format!("{segment:?} is not a number"))
    })?;

    if !value.is_finite() || value < 0.0 {
        return Err(ClipError::invalid_format(
            text,
            format!("{segment:?} must be a finite non-negative number"),
        ));
    }
    Ok(value)
}
