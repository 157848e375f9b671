//! Remote fetch and FFmpeg CLI wrapper for media transforms.
//!
//! This crate provides:
//! - Bounded-redirect HTTP(S) download to a local file
//! - Type-safe FFmpeg command building (discrete argv, never a shell)
//! - A runner with hard timeouts and combined output capture
//! - Diagnostic-text parsing for duration and metadata
//! - Caption-burn, audio-extract and trim command recipes

pub mod audio;
pub mod captions;
pub mod command;
pub mod config;
pub mod download;
pub mod error;
pub mod probe;
pub mod trim;

pub use audio::{extract_mp3_command, MP3_BITRATE};
pub use captions::{burn_captions_command, caption_filter, escape_filter_value};
pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner, InvocationKind, ToolOutput};
pub use config::MediaConfig;
pub use download::{RemoteFetcher, MAX_REDIRECTS};
pub use error::{MediaError, MediaResult};
pub use probe::{format_timestamp, parse_duration, parse_metadata_tag, probe_media, ProbeReport};
pub use trim::{trim_command, trim_target, MIN_SOURCE_SECONDS};
