//! Shared data models for the MediaRelay job server.
//!
//! This crate provides:
//! - Storage key sanitization and folder joining
//! - Caption style profiles for subtitle burning
//! - Transform kinds
//! - Video listing rules

pub mod key;
pub mod style;
pub mod transform;
pub mod video;

// Re-export common types
pub use key::{
    join_key, sanitize_filename, sanitize_folder, sanitize_key, split_extension, KeyRules,
};
pub use style::{AssColor, CaptionStyle, StyleError};
pub use transform::TransformKind;
pub use video::{is_listable_video, is_video_key, CAPTIONED_PREFIX, VIDEO_EXTENSIONS};
