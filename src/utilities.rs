//! Internal timestamp conversion helpers.

use ffmpeg_next::Rational;

/// Largest denominator accepted when turning a frame rate into a time base.
///
/// Several encoders (MPEG-4 Part 2 among them) reject time bases whose
/// denominator does not fit in 16 bits.
const MAX_TIME_BASE_DENOMINATOR: i32 = 65_535;

/// Convert a frame index to a seek timestamp in AV_TIME_BASE (microseconds).
///
/// `input.seek()` goes through `avformat_seek_file` with `stream_index = -1`,
/// which expects container-level microseconds rather than the stream's own
/// time base. Those are absolute, so `container_start` (the container's first
/// timestamp, also in microseconds) is added: MPEG-TS captures commonly start
/// well after zero.
pub fn frame_index_to_seek_timestamp(
    frame_index: u64,
    frames_per_second: f64,
    container_start: i64,
) -> i64 {
    if frames_per_second <= 0.0 {
        return container_start;
    }
    let seconds = frame_index as f64 / frames_per_second;
    ((seconds * 1_000_000.0) as i64).saturating_add(container_start)
}

/// Convert a PTS in `time_base` units to the nearest frame index.
///
/// `start_time` is the stream's first timestamp, so files whose timestamps
/// do not begin at zero still map their first frame to index 0.
pub fn pts_to_frame_index(
    pts: i64,
    start_time: i64,
    time_base: Rational,
    frames_per_second: f64,
) -> u64 {
    let seconds = (pts - start_time) as f64 * f64::from(time_base);
    (seconds * frames_per_second).round().max(0.0) as u64
}

/// Approximate a real-valued frame rate as a rational an encoder accepts.
pub fn frame_rate_to_rational(frames_per_second: f64) -> Rational {
    Rational::from(unsafe {
        ffmpeg_next::ffi::av_d2q(frames_per_second, MAX_TIME_BASE_DENOMINATOR)
    })
}
