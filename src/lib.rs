//! digiprotector draws text watermarks onto raster images.
//!
//! The core is [`Compositor::render`], a deterministic function of a [`SourceImage`] and a
//! [`WatermarkStyle`]. [`EditorSession`] keeps the latest render in step with parameter changes,
//! and [`OutputImage`] exports to PNG.
#![forbid(unsafe_code)]

mod assets;
mod encode;
mod foundation;
mod model;
mod render;
mod session;

pub use crate::assets::color::Rgb8;
pub use crate::assets::decode::SourceImage;
pub use crate::assets::font::{
    FONT_ENV_VAR, FontSource, SYSTEM_FONT_CANDIDATES, load_font, resolve_font,
};
pub use crate::encode::png::{DEFAULT_EXPORT_FILENAME, encode_png, write_png};
pub use crate::foundation::core::{Canvas, CoverageMask, Point, Rect, Rgba8Premul};
pub use crate::foundation::error::{ProtectorError, ProtectorResult};
pub use crate::model::{
    DEFAULT_FONT_SIZE, DEFAULT_OPACITY, DEFAULT_TEXT, MIN_FONT_SIZE, Position, WatermarkStyle,
};
pub use crate::render::anchor::{EDGE_PADDING, anchor_point};
pub use crate::render::compositor::{Compositor, SHADOW_ALPHA, SHADOW_BLUR, SHADOW_OFFSET};
pub use crate::render::output::OutputImage;
pub use crate::render::text::{BlockRasterizer, ParleyRasterizer, TextRasterizer};
pub use crate::session::EditorSession;
