//! Quick inspection of a source video.
//!
//! [`probe`] opens a file, reads its [`StreamDescriptor`], decodes a handful
//! of frames from the start to prove the stream is actually readable, and
//! closes it again.
//!
//! # Example
//!
//! ```no_run
//! let report = clipcut::probe("match.mp4", 30)?;
//! println!(
//!     "{}x{} @ {} fps, read {}/{} frames",
//!     report.descriptor.width,
//!     report.descriptor.height,
//!     report.descriptor.frames_per_second,
//!     report.frames_read,
//!     report.frames_requested,
//! );
//! # Ok::<(), clipcut::ClipError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use crate::{
    error::ClipError,
    metadata::StreamDescriptor,
    source::{FrameSource, VideoSource},
};

/// Number of frames [`probe`] is usually asked to decode.
pub const DEFAULT_PROBE_FRAMES: u64 = 30;

/// Result of [`probe`].
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ProbeReport {
    /// The probed file.
    pub path: PathBuf,
    /// Properties the container reports.
    pub descriptor: StreamDescriptor,
    /// Frames the read check asked for.
    pub frames_requested: u64,
    /// Frames that actually decoded.
    pub frames_read: u64,
}

impl ProbeReport {
    /// Returns `true` if every requested frame decoded.
    pub fn is_readable(&self) -> bool {
        self.frames_read == self.frames_requested
    }
}

impl Display for ProbeReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "- path: {}", self.path.display())?;
        writeln!(
            f,
            "- resolution: {} x {}",
            self.descriptor.width, self.descriptor.height
        )?;
        writeln!(f, "- codec: {}", self.descriptor.codec)?;
        writeln!(f, "- fps: {}", self.descriptor.frames_per_second)?;
        writeln!(f, "- frames: {}", self.descriptor.frame_count)?;
        writeln!(
            f,
            "- duration: {:.3}s",
            self.descriptor.duration.as_secs_f64()
        )?;
        writeln!(
            f,
            "- frames_read: {}/{}",
            self.frames_read, self.frames_requested
        )
    }
}

/// Inspect `path` and try to decode its first `read_frames` frames.
///
/// A file shorter than `read_frames` is not an error; the report shows how
/// many frames decoded.
///
/// # Errors
///
/// - [`ClipError::SourceNotFound`] if `path` is not an existing file.
/// - [`ClipError::OpenFailed`] if it cannot be opened as video.
pub fn probe<P: AsRef<Path>>(path: P, read_frames: u64) -> Result<ProbeReport, ClipError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ClipError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut source = VideoSource::open(path)?;
    probe_source(&mut source, read_frames)
}

/// Run the read check against an already opened [`FrameSource`].
pub fn probe_source<S: FrameSource>(
    source: &mut S,
    read_frames: u64,
) -> Result<ProbeReport, ClipError> {
    let mut frames_read = 0;
    while frames_read < read_frames && source.read_frame()?.is_some() {
        frames_read += 1;
    }

    log::debug!(
        "Probed {}: {frames_read}/{read_frames} frames decoded",
        source.path().display()
    );

    Ok(ProbeReport {
        path: source.path().to_path_buf(),
        descriptor: source.descriptor().clone(),
        frames_requested: read_frames,
        frames_read,
    })
}
