//! Clip extraction.
//!
//! [`ClipExtractor`] turns a pair of timestamps into a frame range and copies
//! that range from a source into a new video file, one decoded frame at a
//! time. The coarse seek issued before the scan is only a hint: the scan
//! itself discards frames that precede the range, so an imprecise seek costs
//! time but never correctness.
//!
//! # Example
//!
//! ```no_run
//! use clipcut::extract_clip;
//!
//! let report = extract_clip("match.mp4", "clips/first_half.mp4", "30:00", "1:17:00", 25.0, "mp4v")?;
//! print!("{report}");
//! # Ok::<(), clipcut::ClipError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::ClipOptions,
    error::ClipError,
    progress::ProgressTracker,
    range::{FrameRange, effective_frame_rate},
    sink::{FrameSink, OutputSpec, VideoSink},
    source::{FrameSource, VideoSource},
    timestamp::parse_timestamp,
};

/// What an extraction did.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ExtractionReport {
    /// Source file.
    pub source: PathBuf,
    /// Destination file.
    pub destination: PathBuf,
    /// Frame rate the source reported (may be `0.0`).
    pub reported_frames_per_second: f64,
    /// Frame rate used for index math and for the output stream.
    pub frames_per_second: f64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Approximate frame count of the source.
    pub source_frame_count: u64,
    /// Resolved start of the clip, in seconds.
    pub start_seconds: f64,
    /// Resolved end of the clip, in seconds.
    pub end_seconds: f64,
    /// Frame bounds derived from the seconds and the effective rate.
    pub frame_range: FrameRange,
    /// Frames actually written. Lower than `frame_range.len()` when the
    /// source ends early.
    pub frames_written: u64,
    /// `frames_written / frames_per_second`, or `None` if the rate is not
    /// positive. Not corrected for variable-frame-rate sources.
    pub approximate_duration: Option<f64>,
}

impl Display for ExtractionReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "- source: {}", self.source.display())?;
        writeln!(f, "- destination: {}", self.destination.display())?;
        writeln!(f, "- reported_fps: {}", self.reported_frames_per_second)?;
        writeln!(f, "- fps_used: {}", self.frames_per_second)?;
        writeln!(f, "- width: {}", self.width)?;
        writeln!(f, "- height: {}", self.height)?;
        writeln!(f, "- source_frame_count: {}", self.source_frame_count)?;
        writeln!(f, "- start_seconds: {}", self.start_seconds)?;
        writeln!(f, "- end_seconds: {}", self.end_seconds)?;
        writeln!(f, "- frame_range: {}", self.frame_range)?;
        writeln!(f, "- frames_written: {}", self.frames_written)?;
        match self.approximate_duration {
            Some(seconds) => writeln!(f, "- approx_duration_out_s: {seconds:.3}"),
            None => writeln!(f, "- approx_duration_out_s: unknown"),
        }
    }
}

/// Extracts clips according to a set of [`ClipOptions`].
///
/// An extractor holds no stream state: every call opens and releases its
/// own source and destination, so one extractor can be reused, and separate
/// extractors can cut clips from the same file concurrently.
#[derive(Debug, Clone, Default)]
pub struct ClipExtractor {
    options: ClipOptions,
}

impl ClipExtractor {
    /// Create an extractor with the given options.
    pub fn new(options: ClipOptions) -> Self {
        Self { options }
    }

    /// The options this extractor runs with.
    pub fn options(&self) -> &ClipOptions {
        &self.options
    }

    /// Copy the frames between `start` and `end` of `source` into
    /// `destination`.
    ///
    /// Timestamps are parsed with [`parse_timestamp`]. Parent directories of
    /// `destination` are created as needed. A source that ends before the
    /// range does is not an error; the report shows fewer frames written.
    ///
    /// # Errors
    ///
    /// - [`ClipError::SourceNotFound`] if `source` is not an existing file,
    ///   checked before anything is opened.
    /// - [`ClipError::OpenFailed`] if the source cannot be opened as video.
    /// - [`ClipError::InvalidFormat`] for a malformed timestamp.
    /// - [`ClipError::InvalidRange`] if `end` is not after `start`; nothing is
    ///   created on disk in that case.
    /// - [`ClipError::WriteFailed`] if the destination cannot be created or
    ///   written, including unknown or unsupported codecs. A partially
    ///   written destination is left as-is.
    pub fn extract<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        source: P1,
        destination: P2,
        start: &str,
        end: &str,
    ) -> Result<ExtractionReport, ClipError> {
        let source = source.as_ref();
        if !source.is_file() {
            return Err(ClipError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let video = VideoSource::open(source)?;
        self.extract_with(video, destination, start, end, VideoSink::create)
    }

    /// Run an extraction against any [`FrameSource`] and sink factory.
    ///
    /// `open_sink` is called once, after the range has been validated and
    /// the destination's parent directories exist. Both endpoints are
    /// released before this returns, whichever way it returns; the sink is
    /// only finalised on success.
    pub fn extract_with<S, W, F, P>(
        &self,
        mut source: S,
        destination: P,
        start: &str,
        end: &str,
        open_sink: F,
    ) -> Result<ExtractionReport, ClipError>
    where
        S: FrameSource,
        W: FrameSink<S::Frame>,
        F: FnOnce(&OutputSpec<'_>) -> Result<W, ClipError>,
        P: AsRef<Path>,
    {
        let destination = destination.as_ref();
        let descriptor = source.descriptor().clone();

        let frames_per_second = effective_frame_rate(
            descriptor.frames_per_second,
            self.options.fallback_frames_per_second,
        );
        if frames_per_second != descriptor.frames_per_second {
            log::debug!(
                "Reported frame rate {} is unusable, falling back to {frames_per_second}",
                descriptor.frames_per_second,
            );
        }

        let start_seconds = parse_timestamp(start)?;
        let end_seconds = parse_timestamp(end)?;
        let frame_range = FrameRange::from_seconds(start_seconds, end_seconds, frames_per_second)?;

        let mut index = source.seek(frame_range.seek_target(), frames_per_second) as i64;

        if let Some(parent) = destination.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| {
                ClipError::write_failed(
                    destination,
                    format!("cannot create directory {}: {error}", parent.display()),
                )
            })?;
        }

        let mut sink = open_sink(&OutputSpec {
            path: destination,
            width: descriptor.width,
            height: descriptor.height,
            frames_per_second,
            codec: &self.options.codec,
        })?;

        log::debug!(
            "Scanning {} for frames {frame_range} starting at frame {index}",
            source.path().display(),
        );

        let mut progress = ProgressTracker::new(
            self.options.progress.clone(),
            Some(frame_range.len()),
            self.options.batch_size,
        );
        let mut frames_written: u64 = 0;

        while let Some(frame) = source.read_frame()? {
            if index < frame_range.start_frame {
                index += 1;
                continue;
            }
            if index > frame_range.end_frame {
                break;
            }

            sink.write_frame(&frame)?;
            frames_written += 1;
            progress.advance(index);
            index += 1;
        }

        sink.finish()?;
        progress.finish();

        let source_path = source.path().to_path_buf();
        drop(source);

        if frames_written < frame_range.len() {
            log::debug!(
                "Source ended after {frames_written} of {} requested frames",
                frame_range.len(),
            );
        }

        let report = ExtractionReport {
            source: source_path,
            destination: destination.to_path_buf(),
            reported_frames_per_second: descriptor.frames_per_second,
            frames_per_second,
            width: descriptor.width,
            height: descriptor.height,
            source_frame_count: descriptor.frame_count,
            start_seconds,
            end_seconds,
            frame_range,
            frames_written,
            approximate_duration: (frames_per_second > 0.0)
                .then(|| frames_written as f64 / frames_per_second),
        };

        log::info!(
            "Wrote {} frames ({}s to {}s) to {}",
            report.frames_written,
            report.start_seconds,
            report.end_seconds,
            report.destination.display(),
        );

        Ok(report)
    }
}

/// Extract a clip with an explicit fallback frame rate and codec.
///
/// Shorthand for building [`ClipOptions`] and calling
/// [`ClipExtractor::extract`]. The usual arguments are a fallback of
/// [`DEFAULT_FALLBACK_FRAMES_PER_SECOND`](crate::DEFAULT_FALLBACK_FRAMES_PER_SECOND)
/// and the codec [`DEFAULT_CODEC`](crate::DEFAULT_CODEC).
pub fn extract_clip<P1: AsRef<Path>, P2: AsRef<Path>>(
    source: P1,
    destination: P2,
    start: &str,
    end: &str,
    fallback_frames_per_second: f64,
    codec: &str,
) -> Result<ExtractionReport, ClipError> {
    let options = ClipOptions::new()
        .with_fallback_frames_per_second(fallback_frames_per_second)
        .with_codec(codec);
    ClipExtractor::new(options).extract(source, destination, start, end)
}
