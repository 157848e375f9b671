//! Duration and metadata recovery from FFmpeg diagnostic text.
//!
//! `ffmpeg -i <file>` prints a stream summary on stderr and exits non-zero
//! because no output is given. The parsers here only look for the lines they
//! need and make no assumption about exit code or surrounding text.

use std::path::Path;
use std::sync::OnceLock;

use regex_lite::Regex;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("valid duration regex")
    })
}

/// Parse the first `Duration: HH:MM:SS[.frac]` occurrence into seconds.
///
/// Returns `None` when the pattern is absent (including `Duration: N/A`).
pub fn parse_duration(text: &str) -> Option<f64> {
    let caps = duration_regex().captures(text)?;
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Extract the first `tag : value` line from FFmpeg's metadata listing.
///
/// Tag names match case-insensitively; empty values are treated as absent.
pub fn parse_metadata_tag(text: &str, tag: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case(tag) {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Format seconds as `HH:MM:SS.mmm`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// What a probe could recover. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    /// Duration in seconds, if printed
    pub duration: Option<f64>,
    /// Container `title` tag
    pub title: Option<String>,
}

/// Probe a local media file for duration and title.
pub async fn probe_media(
    runner: &FfmpegRunner,
    path: impl AsRef<Path>,
) -> MediaResult<ProbeReport> {
    let path = path.as_ref();
    let output = runner.probe(&FfmpegCommand::probe(path)).await?;

    let report = ProbeReport {
        duration: parse_duration(&output.text),
        title: parse_metadata_tag(&output.text, "title"),
    };

    debug!(
        path = %path.display(),
        duration = ?report.duration,
        exit_code = ?output.exit_code,
        "Probed media"
    );

    Ok(report)
}
