//! Stream property types.
//!
//! A [`StreamDescriptor`] is read once when a source is opened and never
//! changes afterwards. The numbers are what the container claims; for live
//! captures and variable-frame-rate files they can be approximate or zero.

use std::time::Duration;

/// Properties of the video stream of an opened source.
///
/// # Example
///
/// ```no_run
/// use clipcut::{FrameSource, VideoSource};
///
/// let source = VideoSource::open("input.mp4")?;
/// let descriptor = source.descriptor();
/// println!(
///     "{}x{} @ {} fps, ~{} frames",
///     descriptor.width, descriptor.height,
///     descriptor.frames_per_second, descriptor.frame_count,
/// );
/// # Ok::<(), clipcut::ClipError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct StreamDescriptor {
    /// Frames per second as reported by the container. May be `0.0`.
    pub frames_per_second: f64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Approximate total number of frames.
    pub frame_count: u64,
    /// Decoder name (e.g. `"h264"`, `"mpeg4"`).
    pub codec: String,
    /// Container-level duration, zero when unknown.
    pub duration: Duration,
}
