//! Error types for the `clipcut` crate.
//!
//! This module defines [`ClipError`], the single error type returned by every
//! fallible operation in the crate. Variants carry the offending path or
//! value so callers can report the problem without extra logging.

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type for all `clipcut` operations.
///
/// Nothing is retried internally; a retry policy, if any, belongs to the
/// caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClipError {
    /// The source path does not reference an existing file.
    #[error("Source file not found: {path}")]
    SourceNotFound {
        /// Path that was passed as the source.
        path: PathBuf,
    },

    /// The source exists but could not be opened as a video stream.
    #[error("Failed to open video at {path}: {reason}")]
    OpenFailed {
        /// Path of the source.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A timestamp string is malformed.
    #[error("Invalid timestamp {value:?}: {reason}")]
    InvalidFormat {
        /// The text as given by the caller.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The resolved end time is not after the start time.
    #[error("Invalid range: end ({end}s) must be greater than start ({start}s)")]
    InvalidRange {
        /// Resolved start, in seconds.
        start: f64,
        /// Resolved end, in seconds.
        end: f64,
    },

    /// The destination could not be created or written.
    #[error("Failed to write clip to {path}: {reason}")]
    WriteFailed {
        /// Destination path.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },
}

impl ClipError {
    pub(crate) fn invalid_format(value: &str, reason: impl Into<String>) -> Self {
        ClipError::InvalidFormat {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ClipError::WriteFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
