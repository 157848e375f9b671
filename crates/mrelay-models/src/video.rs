//! Rules for which stored objects count as listable videos.

use crate::key::split_extension;

/// Namespace holding caption-burn outputs. Hidden from listings.
pub const CAPTIONED_PREFIX: &str = "captioned/";

/// Extensions treated as video objects.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "avi", "m4v"];

/// Whether the key's extension marks it as a video.
pub fn is_video_key(key: &str) -> bool {
    let name = key.rsplit('/').next().unwrap_or(key);
    match split_extension(name).1 {
        Some(ext) => VIDEO_EXTENSIONS
            .iter()
            .any(|v| v.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Whether the key should appear in video listings.
pub fn is_listable_video(key: &str) -> bool {
    !key.starts_with(CAPTIONED_PREFIX) && is_video_key(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_key() {
        assert!(is_video_key("a/b/clip.mp4"));
        assert!(is_video_key("CLIP.MOV"));
        assert!(!is_video_key("a/b/track.mp3"));
        assert!(!is_video_key("folder.mp4/readme"));
        assert!(!is_video_key("mp4"));
    }

    #[test]
    fn test_is_listable_video() {
        assert!(is_listable_video("uploads/clip.mp4"));
        assert!(!is_listable_video("captioned/clip_captioned.mp4"));
        assert!(!is_listable_video("uploads/notes.txt"));
    }
}
