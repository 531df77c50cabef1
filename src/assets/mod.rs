//! Inputs to the compositor: decoded images, colors and font files.

pub mod color;
pub mod decode;
pub mod font;
