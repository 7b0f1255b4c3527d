//! Progress reporting.
//!
//! Attach a [`ProgressCallback`] through
//! [`ClipOptions::with_progress`](crate::ClipOptions::with_progress) to
//! observe an extraction while frames are written. Callbacks only observe:
//! they cannot stop the scan.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use clipcut::{ClipExtractor, ClipOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.1}% ({} frames)", info.current);
//!         }
//!     }
//! }
//!
//! let options = ClipOptions::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_batch_size(25);
//! ClipExtractor::new(options).extract("in.mp4", "clip.mp4", "1:00", "1:30")?;
//! # Ok::<(), clipcut::ClipError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A snapshot of extraction progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Frames written so far.
    pub current: u64,
    /// Frames the range nominally holds, if known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    ///
    /// Truncated sources finish below 100.
    pub percentage: Option<f32>,
    /// Wall-clock time since the scan started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Source frame index of the frame just written.
    pub current_frame: Option<i64>,
}

/// Trait for receiving progress updates during extraction.
///
/// Implementations must be [`Send`] and [`Sync`] so the same callback can
/// be shared between extractions running on different threads.
pub trait ProgressCallback: Send + Sync {
    /// Called every `batch_size` written frames and once at the end.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing for one scan and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: Option<u64>, batch_size: u64) -> Self {
        Self {
            callback,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            since_last_report: 0,
        }
    }

    /// Record one written frame.
    pub(crate) fn advance(&mut self, frame_index: i64) {
        self.current += 1;
        self.since_last_report += 1;

        if self.since_last_report >= self.batch_size {
            self.report(Some(frame_index));
            self.since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&self) {
        self.report(None);
    }

    fn report(&self, frame_index: Option<i64>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        let estimated_remaining = self
            .total
            .and_then(|total| estimate_remaining(elapsed, self.current, total));

        self.callback.on_progress(&ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_index,
        });
    }
}

/// Extrapolate the time left from the throughput so far.
///
/// `None` before the first frame, or when the estimate does not fit in a
/// [`Duration`] (open-ended ranges such as an end time of `"1e300"`).
fn estimate_remaining(elapsed: Duration, current: u64, total: u64) -> Option<Duration> {
    if current == 0 {
        return None;
    }
    let remaining = total.saturating_sub(current);
    Duration::try_from_secs_f64(elapsed.as_secs_f64() * (remaining as f64 / current as f64)).ok()
}
