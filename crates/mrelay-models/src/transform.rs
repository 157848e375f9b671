//! Transform kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of work a job performs between fetch and publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Burn SRT subtitles into a portrait video.
    CaptionBurn,
    /// Extract the audio track to MP3.
    AudioExtract,
    /// Cut a clip to a target duration with stream copy.
    Trim,
    /// Republish the source bytes unchanged.
    Relay,
}

impl TransformKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::CaptionBurn => "caption_burn",
            TransformKind::AudioExtract => "audio_extract",
            TransformKind::Trim => "trim",
            TransformKind::Relay => "relay",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
