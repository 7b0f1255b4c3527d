//! In-memory stream doubles and fixture helpers shared by the integration
//! tests.
//!
//! `MemorySource` hands out frames identified by their true index, so a test
//! can check exactly which source frames reached the sink.

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use clipcut::{ClipError, FrameSink, FrameSource, OutputSpec, StreamDescriptor, VideoSink};
use ffmpeg_next::{format::Pixel, frame::Video as VideoFrame};

pub struct MemorySource {
    path: PathBuf,
    descriptor: StreamDescriptor,
    total_frames: u64,
    cursor: u64,
    /// How many frames before the target a seek lands.
    seek_slack: u64,
    seekable: bool,
    pub released: Arc<AtomicBool>,
}

impl MemorySource {
    pub fn new(total_frames: u64, frames_per_second: f64) -> Self {
        Self {
            path: PathBuf::from("memory.mp4"),
            descriptor: StreamDescriptor {
                frames_per_second,
                width: 320,
                height: 240,
                frame_count: total_frames,
                codec: "rawvideo".to_string(),
                duration: Duration::ZERO,
            },
            total_frames,
            cursor: 0,
            seek_slack: 0,
            seekable: true,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_seek_slack(mut self, slack: u64) -> Self {
        self.seek_slack = slack;
        self
    }

    pub fn unseekable(mut self) -> Self {
        self.seekable = false;
        self
    }
}

impl Drop for MemorySource {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

impl FrameSource for MemorySource {
    type Frame = u64;

    fn path(&self) -> &Path {
        &self.path
    }

    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn seek(&mut self, frame_index: u64, _frames_per_second: f64) -> u64 {
        if self.seekable {
            self.cursor = frame_index
                .saturating_sub(self.seek_slack)
                .min(self.total_frames);
        }
        self.cursor
    }

    fn read_frame(&mut self) -> Result<Option<u64>, ClipError> {
        if self.cursor >= self.total_frames {
            return Ok(None);
        }
        let frame = self.cursor;
        self.cursor += 1;
        Ok(Some(frame))
    }
}

#[derive(Debug, Default)]
pub struct Recording {
    pub frames: Vec<u64>,
    pub finished: bool,
    pub released: bool,
    pub width: u32,
    pub height: u32,
    pub frames_per_second: f64,
    pub codec: String,
}

pub struct MemorySink {
    recording: Arc<Mutex<Recording>>,
    /// Fail the write of this many-th frame (0-based), if set.
    fail_at: Option<usize>,
}

impl MemorySink {
    pub fn open(spec: &OutputSpec<'_>, recording: &Arc<Mutex<Recording>>) -> Self {
        {
            let mut recording = recording.lock().unwrap();
            recording.width = spec.width;
            recording.height = spec.height;
            recording.frames_per_second = spec.frames_per_second;
            recording.codec = spec.codec.to_string();
        }
        Self {
            recording: Arc::clone(recording),
            fail_at: None,
        }
    }

    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl Drop for MemorySink {
    fn drop(&mut self) {
        self.recording.lock().unwrap().released = true;
    }
}

impl FrameSink<u64> for MemorySink {
    fn write_frame(&mut self, frame: &u64) -> Result<(), ClipError> {
        let mut recording = self.recording.lock().unwrap();
        if self.fail_at == Some(recording.frames.len()) {
            return Err(ClipError::WriteFailed {
                path: PathBuf::from("memory-out.mp4"),
                reason: "disk full".to_string(),
            });
        }
        recording.frames.push(*frame);
        Ok(())
    }

    fn finish(self) -> Result<(), ClipError> {
        self.recording.lock().unwrap().finished = true;
        Ok(())
    }
}

/// Encode `frames` synthetic RGB frames into `path` with the MPEG-4 encoder.
pub fn write_synthetic_video(
    path: &Path,
    frames: u64,
    frames_per_second: f64,
    width: u32,
    height: u32,
) -> Result<(), ClipError> {
    let mut sink = VideoSink::create(&OutputSpec {
        path,
        width,
        height,
        frames_per_second,
        codec: "mp4v",
    })?;

    for index in 0..frames {
        sink.write_frame(&synthetic_frame(index, width, height))?;
    }
    sink.finish()
}

/// An RGB frame shaded by its index, so consecutive frames differ.
pub fn synthetic_frame(index: u64, width: u32, height: u32) -> VideoFrame {
    let mut frame = VideoFrame::new(Pixel::RGB24, width, height);
    let stride = frame.stride(0);
    let data = frame.data_mut(0);
    for row in 0..height as usize {
        let shade = ((index * 3 + row as u64) % 256) as u8;
        data[row * stride..row * stride + width as usize * 3].fill(shade);
    }
    frame
}

/// Build a synthetic fixture, or `None` when the MPEG-4 encoder is missing.
pub fn synthetic_fixture(directory: &Path, name: &str, frames: u64) -> Option<PathBuf> {
    let path = directory.join(name);
    match write_synthetic_video(&path, frames, 25.0, 64, 48) {
        Ok(()) => Some(path),
        Err(error) => {
            eprintln!("Skipping: cannot build fixture ({error})");
            None
        }
    }
}
