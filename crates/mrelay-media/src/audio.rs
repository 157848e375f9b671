//! Audio extraction.

use std::path::Path;

use crate::command::FfmpegCommand;

/// Constant bitrate for extracted MP3 audio.
pub const MP3_BITRATE: &str = "192k";

/// Build the transform that drops video and encodes the audio track to MP3.
pub fn extract_mp3_command(input: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .no_video()
        .audio_codec("libmp3lame")
        .audio_bitrate(MP3_BITRATE)
}
