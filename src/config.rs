//! Extraction options.
//!
//! [`ClipOptions`] is a builder carrying the fallback frame rate, the output
//! codec identifier and progress reporting settings into
//! [`ClipExtractor`](crate::ClipExtractor).
//!
//! # Example
//!
//! ```
//! use clipcut::ClipOptions;
//!
//! let options = ClipOptions::new()
//!     .with_fallback_frames_per_second(30.0)
//!     .with_codec("avc1");
//! assert_eq!(options.fallback_frames_per_second(), 30.0);
//! assert_eq!(options.codec(), "avc1");
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::codec::DEFAULT_CODEC;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Frame rate assumed when the source reports none.
pub const DEFAULT_FALLBACK_FRAMES_PER_SECOND: f64 = 25.0;

/// Configuration for [`ClipExtractor`](crate::ClipExtractor).
#[derive(Clone)]
pub struct ClipOptions {
    pub(crate) fallback_frames_per_second: f64,
    pub(crate) codec: String,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Fire the progress callback every N written frames.
    pub(crate) batch_size: u64,
}

impl Debug for ClipOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClipOptions")
            .field("fallback_frames_per_second", &self.fallback_frames_per_second)
            .field("codec", &self.codec)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipOptions {
    /// Defaults: 25 fps fallback, `"mp4v"`, no progress callback, batch size 1.
    pub fn new() -> Self {
        Self {
            fallback_frames_per_second: DEFAULT_FALLBACK_FRAMES_PER_SECOND,
            codec: DEFAULT_CODEC.to_string(),
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Frame rate to use when the source's reported rate is missing or
    /// below [`FRAME_RATE_EPSILON`](crate::FRAME_RATE_EPSILON).
    #[must_use]
    pub fn with_fallback_frames_per_second(mut self, frames_per_second: f64) -> Self {
        self.fallback_frames_per_second = frames_per_second;
        self
    }

    /// Output codec identifier, e.g. `"mp4v"` or `"avc1"`.
    #[must_use]
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured fallback frame rate.
    pub fn fallback_frames_per_second(&self) -> f64 {
        self.fallback_frames_per_second
    }

    /// The configured codec identifier.
    pub fn codec(&self) -> &str {
        &self.codec
    }

    /// The configured progress batch size.
    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }
}
