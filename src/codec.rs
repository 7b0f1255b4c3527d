//! Output codec resolution.
//!
//! Callers name the output codec with a short identifier, usually a
//! four-character code such as `"mp4v"` or `"avc1"`. This module turns that
//! identifier into an FFmpeg encoder. There is no silent fallback: an
//! identifier that resolves to nothing is reported as
//! [`ClipError::WriteFailed`].

use std::path::Path;

use ffmpeg_next::Codec;
use ffmpeg_next::codec::Id;

use crate::error::ClipError;

/// Codec identifier used when the caller does not pick one.
pub const DEFAULT_CODEC: &str = "mp4v";

/// Map a four-character code or short codec name to an FFmpeg codec id.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Returns `None` for identifiers outside the known table.
///
/// # Example
///
/// ```
/// use clipcut::codec::codec_id_for;
/// use ffmpeg_next::codec::Id;
///
/// assert_eq!(codec_id_for("mp4v"), Some(Id::MPEG4));
/// assert_eq!(codec_id_for("AVC1"), Some(Id::H264));
/// assert_eq!(codec_id_for("zzzz"), None);
/// ```
pub fn codec_id_for(identifier: &str) -> Option<Id> {
    let id = match identifier.trim().to_ascii_lowercase().as_str() {
        "mp4v" | "fmp4" | "xvid" | "divx" | "dx50" | "mpeg4" => Id::MPEG4,
        "avc1" | "h264" | "x264" | "avc" => Id::H264,
        "hvc1" | "hev1" | "h265" | "hevc" | "x265" => Id::HEVC,
        "mjpg" | "mjpeg" => Id::MJPEG,
        "vp80" | "vp8" => Id::VP8,
        "vp90" | "vp09" | "vp9" => Id::VP9,
        "av01" | "av1" => Id::AV1,
        "mpg1" | "mpeg1" => Id::MPEG1VIDEO,
        "mpg2" | "mpeg2" => Id::MPEG2VIDEO,
        "ffv1" => Id::FFV1,
        "h263" | "u263" => Id::H263,
        "png" => Id::PNG,
        _ => return None,
    };
    Some(id)
}

/// Find an encoder for `identifier`, reporting failures against `destination`.
///
/// Known identifiers go through [`codec_id_for`]; anything else is tried as
/// an FFmpeg encoder name (e.g. `"libx264"`).
pub(crate) fn resolve_encoder(identifier: &str, destination: &Path) -> Result<Codec, ClipError> {
    let encoder = match codec_id_for(identifier) {
        Some(id) => ffmpeg_next::encoder::find(id),
        None => ffmpeg_next::encoder::find_by_name(identifier.trim()),
    };

    let encoder = encoder.ok_or_else(|| {
        ClipError::write_failed(
            destination,
            format!("no encoder available for codec {identifier:?}"),
        )
    })?;

    if !encoder.is_video() {
        return Err(ClipError::write_failed(
            destination,
            format!("codec {identifier:?} is not a video codec"),
        ));
    }
    Ok(encoder)
}
