//! Writing frames into a new video file.
//!
//! [`FrameSink`] is the write side of an extraction. [`VideoSink`] encodes
//! decoded FFmpeg frames with the requested codec and muxes them into the
//! container implied by the destination's extension.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use clipcut::{FrameSink, OutputSpec, VideoSink};
//!
//! let spec = OutputSpec {
//!     path: Path::new("out.mp4"),
//!     width: 640,
//!     height: 360,
//!     frames_per_second: 25.0,
//!     codec: "mp4v",
//! };
//! let sink = VideoSink::create(&spec)?;
//! sink.finish()?;
//! # Ok::<(), clipcut::ClipError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Packet, Rational,
    codec::context::Context as CodecContext,
    encoder::video::Encoder as VideoEncoder,
    format::{Flags as FormatFlags, Pixel, context::Output},
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::error::ClipError;

/// Parameters of the output stream, fixed before the sink is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSpec<'a> {
    /// Destination file. The container format follows its extension.
    pub path: &'a Path,
    /// Output width in pixels (the source width).
    pub width: u32,
    /// Output height in pixels (the source height).
    pub height: u32,
    /// Output frame rate (the effective frame rate).
    pub frames_per_second: f64,
    /// Codec identifier, see [`codec_id_for`](crate::codec::codec_id_for).
    pub codec: &'a str,
}

/// A sequential destination for frames of type `F`.
pub trait FrameSink<F> {
    /// Append one frame to the output.
    fn write_frame(&mut self, frame: &F) -> Result<(), ClipError>;

    /// Flush and finalise the output.
    ///
    /// Dropping a sink without calling `finish` still releases it, but
    /// leaves whatever was written so far unfinalised on disk.
    fn finish(self) -> Result<(), ClipError>;
}

/// FFmpeg-backed [`FrameSink`] for decoded video frames.
pub struct VideoSink {
    output: Output,
    encoder: VideoEncoder,
    /// Built on the first frame, once the decoded pixel format is known.
    scaler: Option<ScalingContext>,
    pixel_format: Pixel,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    width: u32,
    height: u32,
    next_pts: i64,
    path: PathBuf,
}

impl Debug for VideoSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSink")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frames_written", &self.frames_written())
            .finish_non_exhaustive()
    }
}

impl VideoSink {
    /// Create the destination file and write its header.
    ///
    /// The parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::WriteFailed`] if the codec identifier is unknown,
    /// the container cannot be created, or the encoder refuses the
    /// requested size, rate or container.
    pub fn create(spec: &OutputSpec<'_>) -> Result<Self, ClipError> {
        let path = spec.path.to_path_buf();
        let write_failed = |reason: String| ClipError::write_failed(&path, reason);

        log::debug!(
            "Creating clip {} ({}x{} @ {} fps, codec {:?})",
            path.display(),
            spec.width,
            spec.height,
            spec.frames_per_second,
            spec.codec,
        );

        ffmpeg_next::init()
            .map_err(|error| write_failed(format!("FFmpeg initialisation failed: {error}")))?;

        if !(spec.frames_per_second > 0.0) {
            return Err(write_failed(format!(
                "frame rate must be positive, got {}",
                spec.frames_per_second
            )));
        }

        let encoder_codec = crate::codec::resolve_encoder(spec.codec, &path)?;

        let mut output = ffmpeg_next::format::output(&path)
            .map_err(|error| write_failed(format!("cannot open output: {error}")))?;

        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let mut stream = output
            .add_stream(encoder_codec)
            .map_err(|error| write_failed(format!("cannot add stream: {error}")))?;
        let stream_index = stream.index();

        let mut encoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.encoder().video())
            .map_err(|error| write_failed(format!("cannot create video encoder: {error}")))?;

        let frame_rate = crate::utilities::frame_rate_to_rational(spec.frames_per_second);
        let encoder_time_base = frame_rate.invert();
        let pixel_format = encoder_codec
            .video()
            .ok()
            .and_then(|video| video.formats().and_then(|mut formats| formats.next()))
            .unwrap_or(Pixel::YUV420P);

        encoder.set_width(spec.width);
        encoder.set_height(spec.height);
        encoder.set_format(pixel_format);
        encoder.set_time_base(encoder_time_base);
        encoder.set_frame_rate(Some(frame_rate));

        if needs_global_header {
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let encoder = encoder
            .open_as(encoder_codec)
            .map_err(|error| write_failed(format!("cannot open encoder {:?}: {error}", spec.codec)))?;

        stream.set_parameters(&encoder);
        stream.set_time_base(encoder_time_base);

        output
            .write_header()
            .map_err(|error| write_failed(format!("container rejected stream: {error}")))?;

        // The muxer may pick its own time base while writing the header.
        let stream_time_base = output
            .stream(stream_index)
            .map(|stream| stream.time_base())
            .unwrap_or(encoder_time_base);

        Ok(Self {
            output,
            encoder,
            scaler: None,
            pixel_format,
            stream_index,
            encoder_time_base,
            stream_time_base,
            width: spec.width,
            height: spec.height,
            next_pts: 0,
            path,
        })
    }

    /// Number of frames accepted so far.
    pub fn frames_written(&self) -> u64 {
        self.next_pts as u64
    }

    /// Move every packet the encoder has ready into the container.
    fn drain_packets(&mut self) -> Result<(), ClipError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet.write_interleaved(&mut self.output).map_err(|error| {
                ClipError::write_failed(&self.path, format!("write packet failed: {error}"))
            })?;
        }
        Ok(())
    }
}

impl FrameSink<VideoFrame> for VideoSink {
    fn write_frame(&mut self, frame: &VideoFrame) -> Result<(), ClipError> {
        if self.scaler.is_none() {
            let scaler = ScalingContext::get(
                frame.format(),
                frame.width(),
                frame.height(),
                self.pixel_format,
                self.width,
                self.height,
                ScalingFlags::BILINEAR,
            )
            .map_err(|error| {
                ClipError::write_failed(&self.path, format!("cannot create scaler: {error}"))
            })?;
            self.scaler = Some(scaler);
        }

        let mut converted = VideoFrame::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(frame, &mut converted).map_err(|error| {
                ClipError::write_failed(&self.path, format!("scaling failed: {error}"))
            })?;
        }

        converted.set_pts(Some(self.next_pts));
        self.next_pts += 1;

        self.encoder.send_frame(&converted).map_err(|error| {
            ClipError::write_failed(&self.path, format!("send_frame failed: {error}"))
        })?;
        self.drain_packets()
    }

    fn finish(mut self) -> Result<(), ClipError> {
        self.encoder.send_eof().map_err(|error| {
            ClipError::write_failed(&self.path, format!("send_eof failed: {error}"))
        })?;
        self.drain_packets()?;

        self.output.write_trailer().map_err(|error| {
            ClipError::write_failed(&self.path, format!("cannot write trailer: {error}"))
        })?;

        log::debug!(
            "Finalised {} with {} frames",
            self.path.display(),
            self.frames_written()
        );
        Ok(())
    }
}
