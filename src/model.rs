use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    assets::color::Rgb8,
    foundation::error::{ProtectorError, ProtectorResult},
};

pub const DEFAULT_TEXT: &str = "© DigiProtector";
pub const DEFAULT_FONT_SIZE: u32 = 48;
pub const DEFAULT_OPACITY: f32 = 0.5;
pub const MIN_FONT_SIZE: u32 = 1;

/// Where the watermark text is anchored on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Position {
    /// All placements in picker order (top row first).
    pub const ALL: [Position; 5] = [
        Position::TopLeft,
        Position::Center,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Center => "center",
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
        }
    }

    /// Human-readable label, e.g. `"bottom right"`.
    pub fn label(self) -> String {
        self.as_str().replace('-', " ")
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ProtectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == norm)
            .ok_or_else(|| {
                ProtectorError::validation(format!(
                    "unknown position \"{s}\" (expected one of center, top-left, top-right, bottom-left, bottom-right)"
                ))
            })
    }
}

/// Complete description of a text watermark.
///
/// Values are never rejected. [`WatermarkStyle::sanitized`] clamps them into a renderable range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkStyle {
    pub text: String,
    /// Font size in pixels. Also used as the approximate text height.
    pub font_size: u32,
    /// Global alpha in `[0, 1]`.
    pub opacity: f32,
    pub color: Rgb8,
    pub position: Position,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            opacity: DEFAULT_OPACITY,
            color: Rgb8::WHITE,
            position: Position::Center,
        }
    }
}

impl WatermarkStyle {
    pub fn from_json_str(s: &str) -> ProtectorResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ProtectorResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ProtectorError::validation(format!("failed to read style '{}': {e}", path.display()))
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn to_json_pretty(&self) -> ProtectorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Opacity clamped to `[0, 1]`; NaN maps to fully transparent.
    pub fn clamped_opacity(&self) -> f32 {
        if self.opacity.is_nan() {
            0.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        }
    }

    pub fn clamped_font_size(&self) -> u32 {
        self.font_size.max(MIN_FONT_SIZE)
    }

    pub fn sanitized(&self) -> Self {
        Self {
            text: self.text.clone(),
            font_size: self.clamped_font_size(),
            opacity: self.clamped_opacity(),
            color: self.color,
            position: self.position,
        }
    }

    /// Global alpha quantized to 8 bits, as the blend stage consumes it.
    pub fn alpha_u8(&self) -> u8 {
        (self.clamped_opacity() * 255.0).round() as u8
    }
}
