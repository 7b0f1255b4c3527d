//! # clipcut
//!
//! Cut a time range out of a video file into a new, playable clip.
//!
//! `clipcut` takes human-entered timestamps (`"95"`, `"1:35"`,
//! `"0:01:35"`), converts them to frame indices, and copies the matching
//! decoded frames from the source into a new file, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate. Sources that
//! report no usable frame rate (live captures, some variable-frame-rate
//! containers) fall back to a caller-chosen rate instead of failing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clipcut::{ClipExtractor, ClipOptions};
//!
//! let extractor = ClipExtractor::new(ClipOptions::new().with_fallback_frames_per_second(25.0));
//! let report = extractor.extract("match.mp4", "clips/goal.mp4", "20:00", "25:00")?;
//! println!("wrote {} frames", report.frames_written);
//! # Ok::<(), clipcut::ClipError>(())
//! ```
//!
//! ## Frame boundaries
//!
//! The start time is floored and the end time ceiled to whole frames, and
//! both ends are inclusive, so a clip always covers the requested interval.
//! A source that ends early yields a shorter clip, not an error.
//!
//! ## Audio
//!
//! Only the video stream is copied. Audio and subtitle tracks are dropped.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod codec;
pub mod config;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod metadata;
pub mod probe;
pub mod progress;
pub mod range;
pub mod sink;
pub mod source;
pub mod timestamp;
mod utilities;

pub use codec::DEFAULT_CODEC;
pub use config::{ClipOptions, DEFAULT_FALLBACK_FRAMES_PER_SECOND};
pub use error::ClipError;
pub use extract::{ClipExtractor, ExtractionReport, extract_clip};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::StreamDescriptor;
pub use probe::{DEFAULT_PROBE_FRAMES, ProbeReport, probe, probe_source};
pub use progress::{ProgressCallback, ProgressInfo};
pub use range::{FRAME_RATE_EPSILON, FrameRange, effective_frame_rate};
pub use sink::{FrameSink, OutputSpec, VideoSink};
pub use source::{FrameSource, VideoSource};
pub use timestamp::parse_timestamp;
