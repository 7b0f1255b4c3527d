//! Scan-loop tests against in-memory sources and sinks.
//!
//! These cover the frame boundary arithmetic, seek tolerance and resource
//! release without needing FFmpeg or fixture files.

mod common;

use std::sync::{Arc, Mutex, atomic::Ordering};

use clipcut::{ClipError, ClipExtractor, ClipOptions, ProgressCallback, ProgressInfo};

use common::{MemorySink, MemorySource, Recording};

fn run(
    extractor: &ClipExtractor,
    source: MemorySource,
    start: &str,
    end: &str,
) -> (Result<clipcut::ExtractionReport, ClipError>, Arc<Mutex<Recording>>) {
    let recording = Arc::new(Mutex::new(Recording::default()));
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let destination = temporary_directory.path().join("clip.mp4");
    let result = extractor.extract_with(source, &destination, start, end, |spec| {
        Ok(MemorySink::open(spec, &recording))
    });
    (result, recording)
}

// ── Scenarios ──────────────────────────────────────────────────────

#[test]
fn clean_rate_inclusive_range() {
    let extractor = ClipExtractor::default();
    let (result, recording) = run(&extractor, MemorySource::new(250, 25.0), "00:02", "00:05");
    let report = result.expect("extraction should succeed");

    assert_eq!(report.frame_range.start_frame, 50);
    assert_eq!(report.frame_range.end_frame, 125);
    assert_eq!(report.frames_written, 76);
    assert_eq!(report.frames_per_second, 25.0);
    let duration = report.approximate_duration.expect("duration");
    assert!((duration - 3.04).abs() < 1e-9, "duration was {duration}");

    let recording = recording.lock().unwrap();
    assert_eq!(recording.frames.first(), Some(&50));
    assert_eq!(recording.frames.last(), Some(&125));
    assert_eq!(recording.frames.len(), 76);
    assert!(recording.finished);
    assert!(recording.released);
}

#[test]
fn zero_reported_rate_uses_fallback() {
    let extractor = ClipExtractor::new(ClipOptions::new().with_fallback_frames_per_second(30.0));
    let (result, recording) = run(&extractor, MemorySource::new(1_000, 0.0), "10", "20");
    let report = result.expect("extraction should succeed");

    assert_eq!(report.reported_frames_per_second, 0.0);
    assert_eq!(report.frames_per_second, 30.0);
    assert_eq!(report.frame_range.start_frame, 300);
    assert_eq!(report.frame_range.end_frame, 600);
    assert_eq!(report.frames_written, 301);
    assert_eq!(recording.lock().unwrap().frames_per_second, 30.0);
}

#[test]
fn truncated_source_is_not_an_error() {
    let extractor = ClipExtractor::default();
    let (result, recording) = run(&extractor, MemorySource::new(40, 25.0), "0", "10");
    let report = result.expect("truncated source should not fail");

    assert_eq!(report.frame_range.end_frame, 250);
    assert_eq!(report.frames_written, 40);
    assert!(recording.lock().unwrap().finished);
}

#[test]
fn start_past_end_of_source_writes_nothing() {
    let extractor = ClipExtractor::default();
    let (result, recording) = run(&extractor, MemorySource::new(40, 25.0), "10", "12");
    let report = result.expect("empty clip is still a clip");

    assert_eq!(report.frames_written, 0);
    assert_eq!(report.approximate_duration, Some(0.0));
    assert!(recording.lock().unwrap().finished);
}

#[test]
fn reported_rate_above_epsilon_is_kept() {
    let extractor = ClipExtractor::new(ClipOptions::new().with_fallback_frames_per_second(30.0));
    let (result, _) = run(&extractor, MemorySource::new(100, 29.97), "0", "1");
    let report = result.expect("extraction should succeed");

    assert_eq!(report.frames_per_second, 29.97);
    assert_eq!(report.frame_range.end_frame, 30);
}

#[test]
fn tiny_reported_rate_falls_back() {
    let extractor = ClipExtractor::new(ClipOptions::new().with_fallback_frames_per_second(24.0));
    let (result, _) = run(&extractor, MemorySource::new(100, 0.0005), "0", "1");
    assert_eq!(result.expect("extraction").frames_per_second, 24.0);
}

#[test]
fn open_ended_range_runs_to_end_of_source() {
    let progress = Arc::new(RecordingProgress::default());
    let extractor = ClipExtractor::new(ClipOptions::new().with_progress(progress.clone()));
    let (result, recording) = run(&extractor, MemorySource::new(250, 25.0), "00:02", "1e300");
    let report = result.expect("huge end timestamp should not fail");

    assert_eq!(report.frame_range.start_frame, 50);
    assert_eq!(report.frame_range.end_frame, i64::MAX);
    assert_eq!(report.frames_written, 200);
    assert_eq!(recording.lock().unwrap().frames.last(), Some(&249));

    let infos = progress.infos.lock().unwrap();
    assert_eq!(infos.len(), 201);
    assert_eq!(infos.last().unwrap().current, 200);
}

// ── Seek tolerance ─────────────────────────────────────────────────

#[test]
fn imprecise_seek_is_compensated_by_skipping() {
    let extractor = ClipExtractor::default();
    let source = MemorySource::new(250, 25.0).with_seek_slack(7);
    let (result, recording) = run(&extractor, source, "00:02", "00:05");

    assert_eq!(result.expect("extraction").frames_written, 76);
    let recording = recording.lock().unwrap();
    assert_eq!(recording.frames.first(), Some(&50));
    assert_eq!(recording.frames.last(), Some(&125));
}

#[test]
fn unseekable_source_scans_from_the_beginning() {
    let extractor = ClipExtractor::default();
    let source = MemorySource::new(250, 25.0).unseekable();
    let (result, recording) = run(&extractor, source, "00:02", "00:05");

    assert_eq!(result.expect("extraction").frames_written, 76);
    let expected: Vec<u64> = (50..=125).collect();
    assert_eq!(recording.lock().unwrap().frames, expected);
}

// ── Output stream configuration ────────────────────────────────────

#[test]
fn output_uses_source_size_and_requested_codec() {
    let extractor = ClipExtractor::new(ClipOptions::new().with_codec("mjpg"));
    let (result, recording) = run(&extractor, MemorySource::new(50, 25.0), "0", "1");
    result.expect("extraction");

    let recording = recording.lock().unwrap();
    assert_eq!((recording.width, recording.height), (320, 240));
    assert_eq!(recording.codec, "mjpg");
    assert_eq!(recording.frames_per_second, 25.0);
}

#[test]
fn destination_directories_are_created() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let destination = temporary_directory.path().join("clips/2024/first_half.mp4");
    let recording = Arc::new(Mutex::new(Recording::default()));

    ClipExtractor::default()
        .extract_with(MemorySource::new(50, 25.0), &destination, "0", "1", |spec| {
            assert_eq!(spec.path, destination.as_path());
            Ok(MemorySink::open(spec, &recording))
        })
        .expect("extraction");

    assert!(temporary_directory.path().join("clips/2024").is_dir());
}

// ── Errors ─────────────────────────────────────────────────────────

#[test]
fn reversed_range_creates_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let destination = temporary_directory.path().join("nested/clip.mp4");
    let mut sink_opened = false;

    let result = ClipExtractor::default().extract_with(
        MemorySource::new(250, 25.0),
        &destination,
        "00:05",
        "00:05",
        |spec| {
            sink_opened = true;
            Ok(MemorySink::open(spec, &Arc::new(Mutex::new(Recording::default()))))
        },
    );

    match result {
        Err(ClipError::InvalidRange { start, end }) => {
            assert_eq!(start, 5.0);
            assert_eq!(end, 5.0);
        }
        other => panic!("expected InvalidRange, got {other:?}"),
    }
    assert!(!sink_opened);
    assert!(!temporary_directory.path().join("nested").exists());
}

#[test]
fn malformed_timestamp_is_reported() {
    let (result, _) = run(&ClipExtractor::default(), MemorySource::new(250, 25.0), "ab:cd", "5");
    assert!(matches!(result, Err(ClipError::InvalidFormat { .. })));
}

#[test]
fn sink_open_failure_releases_source() {
    let source = MemorySource::new(250, 25.0);
    let released = Arc::clone(&source.released);
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");

    let result = ClipExtractor::default().extract_with(
        source,
        temporary_directory.path().join("clip.mp4"),
        "0",
        "1",
        |spec| -> Result<MemorySink, ClipError> {
            Err(ClipError::WriteFailed {
                path: spec.path.to_path_buf(),
                reason: "unsupported codec".to_string(),
            })
        },
    );

    assert!(matches!(result, Err(ClipError::WriteFailed { .. })));
    assert!(released.load(Ordering::SeqCst));
}

#[test]
fn write_failure_releases_both_streams_without_finishing() {
    let source = MemorySource::new(250, 25.0);
    let released = Arc::clone(&source.released);
    let recording = Arc::new(Mutex::new(Recording::default()));
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");

    let result = ClipExtractor::default().extract_with(
        source,
        temporary_directory.path().join("clip.mp4"),
        "0",
        "5",
        |spec| Ok(MemorySink::open(spec, &recording).failing_at(3)),
    );

    assert!(matches!(result, Err(ClipError::WriteFailed { .. })));
    assert!(released.load(Ordering::SeqCst));
    let recording = recording.lock().unwrap();
    assert_eq!(recording.frames, vec![0, 1, 2]);
    assert!(recording.released);
    assert!(!recording.finished);
}

#[test]
fn missing_source_file_is_reported_before_opening() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let destination = temporary_directory.path().join("out/clip.mp4");

    let result = ClipExtractor::default().extract(
        temporary_directory.path().join("does_not_exist.mp4"),
        &destination,
        "0",
        "5",
    );

    assert!(matches!(result, Err(ClipError::SourceNotFound { .. })));
    assert!(!temporary_directory.path().join("out").exists());
}

// ── Repeatability ──────────────────────────────────────────────────

#[test]
fn repeated_extraction_is_identical() {
    let extractor = ClipExtractor::default();
    let (first, first_recording) = run(&extractor, MemorySource::new(250, 25.0), "1.5", "0:04.25");
    let (second, second_recording) = run(&extractor, MemorySource::new(250, 25.0), "1.5", "0:04.25");

    let first = first.expect("first run");
    let second = second.expect("second run");
    assert_eq!(first.frames_written, second.frames_written);
    assert_eq!((first.width, first.height), (second.width, second.height));
    assert_eq!(
        first_recording.lock().unwrap().frames,
        second_recording.lock().unwrap().frames
    );
}

// ── Progress ───────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingProgress {
    infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

#[test]
fn progress_reports_in_batches_and_at_the_end() {
    let progress = Arc::new(RecordingProgress::default());
    let options = ClipOptions::new()
        .with_progress(progress.clone())
        .with_batch_size(10);

    let (result, _) = run(&ClipExtractor::new(options), MemorySource::new(250, 25.0), "00:02", "00:05");
    result.expect("extraction");

    let infos = progress.infos.lock().unwrap();
    // 76 frames: seven full batches plus the final report.
    assert_eq!(infos.len(), 8);
    assert_eq!(infos[0].current, 10);
    assert_eq!(infos[0].current_frame, Some(59));

    let last = infos.last().unwrap();
    assert_eq!(last.current, 76);
    assert_eq!(last.total, Some(76));
    assert_eq!(last.percentage, Some(100.0));
    assert_eq!(last.current_frame, None);
}

#[test]
fn report_display_lists_every_field() {
    let (result, _) = run(&ClipExtractor::default(), MemorySource::new(250, 25.0), "00:02", "00:05");
    let text = result.expect("extraction").to_string();

    assert!(text.contains("- fps_used: 25"));
    assert!(text.contains("- frame_range: 50..=125"));
    assert!(text.contains("- frames_written: 76"));
    assert!(text.contains("- approx_duration_out_s: 3.040"));
}
