//! Lossless trimming.

use std::path::Path;

use crate::command::FfmpegCommand;

/// Sources shorter than this are rejected.
pub const MIN_SOURCE_SECONDS: f64 = 2.0;

/// Margin kept before the end of the source when a target is requested.
const REQUESTED_END_MARGIN: f64 = 0.1;

/// Margin trimmed off the end when no target is requested.
const DEFAULT_END_MARGIN: f64 = 1.0;

/// Compute the trimmed duration for a source of `duration` seconds.
///
/// With a positive `requested` target the result is
/// `min(requested, duration - 0.1)`; otherwise `duration - 1`. Returns `None`
/// when the source is shorter than [`MIN_SOURCE_SECONDS`].
pub fn trim_target(duration: f64, requested: Option<f64>) -> Option<f64> {
    if !duration.is_finite() || duration < MIN_SOURCE_SECONDS {
        return None;
    }

    let target = match requested.filter(|r| r.is_finite() && *r > 0.0) {
        Some(requested) => requested.min(duration - REQUESTED_END_MARGIN),
        None => duration - DEFAULT_END_MARGIN,
    };

    Some(target)
}

/// Build a stream-copy trim to `target` seconds.
pub fn trim_command(input: &Path, output: &Path, target: f64) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .duration(target)
        .stream_copy()
}
