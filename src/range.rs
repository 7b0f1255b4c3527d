//! Frame-rate fallback policy and time-to-frame-index conversion.
//!
//! Containers carrying live captures or variable-frame-rate content often
//! report a frame rate of zero or some tiny bogus value. Everything in the
//! crate that turns seconds into frame indices goes through
//! [`effective_frame_rate`] first, and then through [`FrameRange`].

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::ClipError;

/// Reported frame rates at or below this value are treated as missing.
pub const FRAME_RATE_EPSILON: f64 = 1e-3;

/// Pick the frame rate used for index math and output encoding.
///
/// Returns `reported` if it exceeds [`FRAME_RATE_EPSILON`], otherwise
/// `fallback`, both unchanged.
///
/// # Example
///
/// ```
/// use clipcut::effective_frame_rate;
///
/// assert_eq!(effective_frame_rate(29.97, 25.0), 29.97);
/// assert_eq!(effective_frame_rate(0.0, 30.0), 30.0);
/// ```
pub fn effective_frame_rate(reported: f64, fallback: f64) -> f64 {
    if reported > FRAME_RATE_EPSILON {
        reported
    } else {
        fallback
    }
}

/// Inclusive `[start_frame, end_frame]` bounds of a clip.
///
/// The start is floored and the end is ceiled, so the clip always fully
/// contains the requested interval and may carry up to one frame of padding
/// at each edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRange {
    /// First frame to keep.
    pub start_frame: i64,
    /// Last frame to keep.
    pub end_frame: i64,
}

impl FrameRange {
    /// Derive the frame range for `[start_seconds, end_seconds]` at
    /// `frames_per_second`.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::InvalidRange`] unless `end_seconds > start_seconds`.
    /// The check is made on the seconds, not on the resulting indices.
    ///
    /// # Example
    ///
    /// ```
    /// use clipcut::FrameRange;
    ///
    /// let range = FrameRange::from_seconds(2.0, 5.0, 25.0)?;
    /// assert_eq!((range.start_frame, range.end_frame), (50, 125));
    /// assert_eq!(range.len(), 76);
    /// # Ok::<(), clipcut::ClipError>(())
    /// ```
    pub fn from_seconds(
        start_seconds: f64,
        end_seconds: f64,
        frames_per_second: f64,
    ) -> Result<Self, ClipError> {
        // Negated so NaN inputs are rejected as well.
        if !(end_seconds > start_seconds) {
            return Err(ClipError::InvalidRange {
                start: start_seconds,
                end: end_seconds,
            });
        }

        Ok(Self {
            start_frame: (start_seconds * frames_per_second).floor() as i64,
            end_frame: (end_seconds * frames_per_second).ceil() as i64,
        })
    }

    /// The frame a coarse seek should aim for: the start, clamped to zero.
    pub fn seek_target(&self) -> u64 {
        self.start_frame.max(0) as u64
    }

    /// Number of frames in the range, counting both ends.
    pub fn len(&self) -> u64 {
        if self.end_frame < self.start_frame {
            0
        } else {
            (self.end_frame - self.start_frame) as u64 + 1
        }
    }

    /// Returns `true` if the range holds no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `index` lies inside the range.
    pub fn contains(&self, index: i64) -> bool {
        index >= self.start_frame && index <= self.end_frame
    }
}

impl Display for FrameRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}..={}", self.start_frame, self.end_frame)
    }
}
