//! Reading decoded frames from a source video.
//!
//! [`FrameSource`] is the read side of an extraction: a descriptor, a coarse
//! seek, and a sequential frame reader. [`VideoSource`] implements it on top
//! of FFmpeg's demuxer and decoder. The scan loop in
//! [`ClipExtractor`](crate::ClipExtractor) only depends on the trait.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational, codec::context::Context as CodecContext, decoder::Video as VideoDecoder,
    format::context::Input, frame::Video as VideoFrame, media::Type,
};

use crate::{error::ClipError, metadata::StreamDescriptor};

/// A sequential source of decoded video frames.
pub trait FrameSource {
    /// The decoded frame type handed to a [`FrameSink`](crate::FrameSink).
    type Frame;

    /// Path the source was opened from.
    fn path(&self) -> &Path;

    /// Stream properties read when the source was opened.
    fn descriptor(&self) -> &StreamDescriptor;

    /// Move the read position close to `frame_index`.
    ///
    /// This is a hint. Returns the index of the frame the next
    /// [`read_frame`](FrameSource::read_frame) will yield, as far as the
    /// source can tell; it may be earlier than `frame_index`. A source that
    /// cannot seek leaves its position alone and returns where it is.
    fn seek(&mut self, frame_index: u64, frames_per_second: f64) -> u64;

    /// Read the next frame, or `None` once the source is exhausted.
    fn read_frame(&mut self) -> Result<Option<Self::Frame>, ClipError>;
}

/// FFmpeg-backed [`FrameSource`] over the best video stream of a file.
///
/// The demuxer and decoder are owned by this value and released when it is
/// dropped. Seek targets are offset by the container's start time, so
/// sources whose timestamps do not begin at zero (MPEG-TS captures, cut
/// recordings) land near the requested frame rather than early.
pub struct VideoSource {
    input: Input,
    decoder: VideoDecoder,
    stream_index: usize,
    time_base: Rational,
    start_time: i64,
    /// First timestamp of the container, in AV_TIME_BASE units.
    container_start: i64,
    descriptor: StreamDescriptor,
    path: PathBuf,
    /// A frame decoded while locating the seek position, not yet handed out.
    pending: Option<VideoFrame>,
    /// Frames handed out since open or the last seek.
    position: u64,
    draining: bool,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("descriptor", &self.descriptor)
            .field("stream_index", &self.stream_index)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open the best video stream of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::OpenFailed`] if FFmpeg cannot open the file, the
    /// file has no video stream, or no decoder is available for it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clipcut::VideoSource;
    ///
    /// let source = VideoSource::open("input.mp4")?;
    /// # Ok::<(), clipcut::ClipError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ClipError> {
        let path = path.as_ref().to_path_buf();
        let open_failed = |reason: String| ClipError::OpenFailed {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening source video: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_failed(format!("FFmpeg initialisation failed: {error}")))?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| open_failed(error.to_string()))?;

        let container_start = match unsafe { (*input.as_ptr()).start_time } {
            ffmpeg_next::ffi::AV_NOPTS_VALUE => 0,
            value => value,
        };

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| open_failed("no video stream found".to_string()))?;

        let stream_index = stream.index();
        let time_base = stream.time_base();
        let start_time = match stream.start_time() {
            ffmpeg_next::ffi::AV_NOPTS_VALUE => 0,
            value => value,
        };

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| open_failed(format!("cannot create video decoder: {error}")))?;

        // Average rate first, then the stream's nominal rate; 0 when neither
        // is known.
        let frames_per_second = [stream.avg_frame_rate(), stream.rate()]
            .into_iter()
            .find(|rate| rate.numerator() > 0 && rate.denominator() > 0)
            .map(f64::from)
            .unwrap_or(0.0);

        let duration = match input.duration() {
            microseconds if microseconds > 0 => Duration::from_micros(microseconds as u64),
            _ => Duration::ZERO,
        };

        let frame_count = match stream.frames() {
            frames if frames > 0 => frames as u64,
            _ => (duration.as_secs_f64() * frames_per_second) as u64,
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let descriptor = StreamDescriptor {
            frames_per_second,
            width: decoder.width(),
            height: decoder.height(),
            frame_count,
            codec,
            duration,
        };

        log::debug!(
            "Video stream {stream_index}: {}x{} {} @ {} fps, ~{} frames",
            descriptor.width,
            descriptor.height,
            descriptor.codec,
            descriptor.frames_per_second,
            descriptor.frame_count,
        );

        Ok(Self {
            input,
            decoder,
            stream_index,
            time_base,
            start_time,
            container_start,
            descriptor,
            path,
            pending: None,
            position: 0,
            draining: false,
        })
    }

    /// Pull the next decoded frame out of FFmpeg, feeding packets as needed.
    fn decode_next(&mut self) -> Option<VideoFrame> {
        let mut frame = VideoFrame::empty();
        loop {
            if self.decoder.receive_frame(&mut frame).is_ok() {
                return Some(frame);
            }
            if self.draining {
                return None;
            }

            match self.input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        log::warn!(
                            "Skipping undecodable packet in {}: {error}",
                            self.path.display()
                        );
                    }
                }
                None => {
                    // End of container: flush frames still buffered in the decoder.
                    self.draining = true;
                    if let Err(error) = self.decoder.send_eof() {
                        log::debug!("Decoder flush failed: {error}");
                    }
                }
            }
        }
    }
}

impl FrameSource for VideoSource {
    type Frame = VideoFrame;

    fn path(&self) -> &Path {
        &self.path
    }

    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn seek(&mut self, frame_index: u64, frames_per_second: f64) -> u64 {
        if frame_index == 0 || frames_per_second <= 0.0 {
            return self.position;
        }

        let timestamp = crate::utilities::frame_index_to_seek_timestamp(
            frame_index,
            frames_per_second,
            self.container_start,
        );

        // Lands on the last keyframe at or before the target.
        if let Err(error) = self.input.seek(timestamp, ..timestamp) {
            log::warn!(
                "Seek to frame {frame_index} in {} failed, scanning from frame {}: {error}",
                self.path.display(),
                self.position,
            );
            return self.position;
        }

        self.decoder.flush();
        self.pending = None;
        self.draining = false;

        // Decode one frame to learn where the seek actually landed.
        let Some(frame) = self.decode_next() else {
            self.position = frame_index;
            return frame_index;
        };

        let landed = match frame.timestamp().or(frame.pts()) {
            Some(pts) => crate::utilities::pts_to_frame_index(
                pts,
                self.start_time,
                self.time_base,
                frames_per_second,
            ),
            None => frame_index,
        };

        log::debug!("Seek to frame {frame_index} landed on frame {landed}");

        self.pending = Some(frame);
        self.position = landed;
        landed
    }

    fn read_frame(&mut self) -> Result<Option<Self::Frame>, ClipError> {
        let frame = match self.pending.take() {
            Some(frame) => Some(frame),
            None => self.decode_next(),
        };
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }
}
