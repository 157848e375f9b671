//! Caption burning.
//!
//! The subtitle path and style string are embedded into a filtergraph, which
//! has two escaping levels: option values (`\ ' :`) and the graph itself
//! (`\ ' [ ] , ;`). Both are applied so neither value can terminate its
//! option or inject another filter.

use std::path::Path;

use mrelay_models::CaptionStyle;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Portrait canvas the captioned video is fitted into.
pub const OUTPUT_WIDTH: u32 = 1080;
pub const OUTPUT_HEIGHT: u32 = 1920;

const OPTION_LEVEL: &[char] = &['\\', '\'', ':'];
const GRAPH_LEVEL: &[char] = &['\\', '\'', '[', ']', ',', ';'];

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a value for use as a filter option inside a `-vf` argument.
pub fn escape_filter_value(value: &str) -> String {
    escape_chars(&escape_chars(value, OPTION_LEVEL), GRAPH_LEVEL)
}

/// Whether a rendered `force_style` string only uses the allowed alphabet.
fn is_allowed_style_syntax(style: &str) -> bool {
    !style.is_empty()
        && style
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '=' | ',' | '&'))
}

/// Build the scale/pad/subtitles filter for a caption burn.
pub fn caption_filter(subtitle_path: &Path, style: &CaptionStyle) -> MediaResult<String> {
    let force_style = style
        .to_force_style()
        .map_err(|e| MediaError::InvalidStyle(e.to_string()))?;
    if !is_allowed_style_syntax(&force_style) {
        return Err(MediaError::InvalidStyle(format!(
            "style contains characters outside the allowed set: {}",
            force_style
        )));
    }

    Ok(format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,\
         subtitles=filename={path}:force_style={style}",
        w = OUTPUT_WIDTH,
        h = OUTPUT_HEIGHT,
        path = escape_filter_value(&subtitle_path.to_string_lossy()),
        style = escape_filter_value(&force_style),
    ))
}

/// Build the caption-burn transform.
pub fn burn_captions_command(
    input: &Path,
    subtitle: &Path,
    output: &Path,
    style: &CaptionStyle,
) -> MediaResult<FfmpegCommand> {
    let filter = caption_filter(subtitle, style)?;

    Ok(FfmpegCommand::new(input, output)
        .video_filter(filter)
        .video_codec("libx264")
        .preset("ultrafast")
        .crf(23)
        .output_args(["-profile:v", "high", "-level", "4.1"])
        .audio_codec("aac")
        .audio_bitrate("128k")
        .output_args(["-movflags", "+faststart"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrelay_models::AssColor;

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("/tmp/sub_1.srt"), "/tmp/sub_1.srt");
        assert_eq!(escape_filter_value("/tmp/a:b"), "/tmp/a\\\\:b");
        assert_eq!(escape_filter_value("it's"), "it\\\\\\'s");
        assert_eq!(escape_filter_value("a,b;c[d]"), "a\\,b\\;c\\[d\\]");
    }

    #[test]
    fn test_caption_filter_default_style() {
        let filter = caption_filter(Path::new("/tmp/sub_1.srt"), &CaptionStyle::default()).unwrap();
        assert!(filter.starts_with("scale=1080:1920:force_original_aspect_ratio=decrease,"));
        assert!(filter.contains("pad=1080:1920:(ow-iw)/2:(oh-ih)/2,"));
        assert!(filter.contains("subtitles=filename=/tmp/sub_1.srt:force_style=FontSize=24\\,"));
        assert!(filter.ends_with("MarginV=30"));
    }

    #[test]
    fn test_caption_filter_hostile_path() {
        let path = Path::new("/tmp/x',drawtext=text='pwned:y.srt");
        let filter = caption_filter(path, &CaptionStyle::default()).unwrap();
        // Every quote and comma from the path is escaped
        assert!(filter.contains("x\\\\\\'\\,drawtext=text=\\\\\\'pwned\\\\:y.srt"));
    }

    #[test]
    fn test_invalid_style_rejected() {
        let style = CaptionStyle {
            alignment: 0,
            ..Default::default()
        };
        let err = caption_filter(Path::new("/tmp/s.srt"), &style).unwrap_err();
        assert!(matches!(err, MediaError::InvalidStyle(_)));
    }

    #[test]
    fn test_burn_command_args() {
        let style = CaptionStyle {
            primary_colour: AssColor(0x00FF_FF00),
            ..Default::default()
        };
        let cmd = burn_captions_command(
            Path::new("/tmp/in.mp4"),
            Path::new("/tmp/sub.srt"),
            Path::new("/tmp/out.mp4"),
            &style,
        )
        .unwrap();
        let args = cmd.build_args();

        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert!(args[vf + 1].contains("PrimaryColour=&H00FFFF00"));
        for expected in ["libx264", "ultrafast", "23", "high", "4.1", "aac", "128k", "+faststart"] {
            assert!(args.contains(&expected.to_string()), "missing {}", expected);
        }
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mp4"));
    }
}
