//! Caption style profiles.
//!
//! A [`CaptionStyle`] is rendered into the `force_style` option of FFmpeg's
//! `subtitles` filter (ASS `Name=Value` pairs). Every field is numeric, so the
//! rendered string only ever contains `[A-Za-z0-9=,&]`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a style cannot be rendered safely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("Font size must be between 1 and 200, got {0}")]
    FontSize(u16),

    #[error("Alignment must be a numpad position 1-9, got {0}")]
    Alignment(u8),

    #[error("Outline width must be at most 20, got {0}")]
    Outline(u8),

    #[error("Shadow depth must be at most 20, got {0}")]
    Shadow(u8),

    #[error("Vertical margin must be at most 1000, got {0}")]
    MarginV(u16),
}

/// ASS colour in `&HAABBGGRR` form (alpha, blue, green, red).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssColor(pub u32);

impl AssColor {
    pub const WHITE: AssColor = AssColor(0x00FF_FFFF);
    pub const BLACK: AssColor = AssColor(0x0000_0000);
    /// Black at 50% transparency.
    pub const HALF_BLACK: AssColor = AssColor(0x8000_0000);
}

impl fmt::Display for AssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&H{:08X}", self.0)
    }
}

/// Subtitle styling applied when burning captions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionStyle {
    pub font_size: u16,
    pub primary_colour: AssColor,
    pub outline_colour: AssColor,
    pub back_colour: AssColor,
    pub bold: bool,
    pub outline: u8,
    pub shadow: u8,
    /// Numpad-style alignment (2 = bottom centre).
    pub alignment: u8,
    pub margin_v: u16,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 24,
            primary_colour: AssColor::WHITE,
            outline_colour: AssColor::BLACK,
            back_colour: AssColor::HALF_BLACK,
            bold: true,
            outline: 2,
            shadow: 1,
            alignment: 2,
            margin_v: 30,
        }
    }
}

impl CaptionStyle {
    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), StyleError> {
        if self.font_size == 0 || self.font_size > 200 {
            return Err(StyleError::FontSize(self.font_size));
        }
        if !(1..=9).contains(&self.alignment) {
            return Err(StyleError::Alignment(self.alignment));
        }
        if self.outline > 20 {
            return Err(StyleError::Outline(self.outline));
        }
        if self.shadow > 20 {
            return Err(StyleError::Shadow(self.shadow));
        }
        if self.margin_v > 1000 {
            return Err(StyleError::MarginV(self.margin_v));
        }
        Ok(())
    }

    /// Render the `force_style` value, e.g. `FontSize=24,PrimaryColour=&H00FFFFFF,...`.
    pub fn to_force_style(&self) -> Result<String, StyleError> {
        self.validate()?;

        Ok([
            format!("FontSize={}", self.font_size),
            format!("PrimaryColour={}", self.primary_colour),
            format!("OutlineColour={}", self.outline_colour),
            format!("BackColour={}", self.back_colour),
            format!("Bold={}", u8::from(self.bold)),
            format!("Outline={}", self.outline),
            format!("Shadow={}", self.shadow),
            format!("Alignment={}", self.alignment),
            format!("MarginV={}", self.margin_v),
        ]
        .join(","))
    }
}
