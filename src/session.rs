//! Editing session: the current image, the current style and the latest render.

use std::path::Path;

use crate::{
    assets::{color::Rgb8, decode::SourceImage},
    foundation::error::ProtectorResult,
    model::{Position, WatermarkStyle},
    render::{compositor::Compositor, output::OutputImage, text::TextRasterizer},
};

/// Holds one editing session and re-renders on every change.
///
/// Each setter replaces one parameter and recomputes the output from the source image, so the
/// most recent call always wins.
pub struct EditorSession<R> {
    compositor: Compositor<R>,
    source: Option<SourceImage>,
    style: WatermarkStyle,
    output: Option<OutputImage>,
}

impl<R: TextRasterizer> EditorSession<R> {
    pub fn new(text: R) -> Self {
        Self::with_style(text, WatermarkStyle::default())
    }

    pub fn with_style(text: R, style: WatermarkStyle) -> Self {
        Self {
            compositor: Compositor::new(text),
            source: None,
            style,
            output: None,
        }
    }

    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn output(&self) -> Option<&OutputImage> {
        self.output.as_ref()
    }

    /// Export is only offered once an image has been loaded.
    pub fn can_export(&self) -> bool {
        self.output.is_some()
    }

    pub fn load_image(&mut self, image: SourceImage) -> ProtectorResult<()> {
        self.source = Some(image);
        self.rerender()
    }

    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> ProtectorResult<()> {
        let image = SourceImage::decode(bytes)?;
        self.load_image(image)
    }

    pub fn clear_image(&mut self) {
        self.source = None;
        self.output = None;
    }

    pub fn set_style(&mut self, style: WatermarkStyle) -> ProtectorResult<()> {
        self.style = style;
        self.rerender()
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> ProtectorResult<()> {
        self.style.text = text.into();
        self.rerender()
    }

    pub fn set_font_size(&mut self, font_size: u32) -> ProtectorResult<()> {
        self.style.font_size = font_size;
        self.rerender()
    }

    pub fn set_opacity(&mut self, opacity: f32) -> ProtectorResult<()> {
        self.style.opacity = opacity;
        self.rerender()
    }

    pub fn set_color(&mut self, color: Rgb8) -> ProtectorResult<()> {
        self.style.color = color;
        self.rerender()
    }

    pub fn set_position(&mut self, position: Position) -> ProtectorResult<()> {
        self.style.position = position;
        self.rerender()
    }

    /// PNG bytes of the current output, or `None` while no image is loaded.
    pub fn export_png(&self) -> ProtectorResult<Option<Vec<u8>>> {
        self.output.as_ref().map(OutputImage::encode_png).transpose()
    }

    /// Write the current output to `path`. Returns `false` when there is nothing to export.
    pub fn export_to(&self, path: impl AsRef<Path>) -> ProtectorResult<bool> {
        match &self.output {
            Some(out) => {
                out.save_png(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn rerender(&mut self) -> ProtectorResult<()> {
        self.output = self.compositor.render(self.source.as_ref(), &self.style)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::text::BlockRasterizer;

    fn solid(w: u32, h: u32, v: u8) -> SourceImage {
        SourceImage::from_rgba8(w, h, [v, v, v, 255].repeat((w * h) as usize)).unwrap()
    }

    #[test]
    fn setters_without_image_produce_nothing() {
        let mut s = EditorSession::new(BlockRasterizer::default());
        s.set_text("hi").unwrap();
        s.set_opacity(0.9).unwrap();
        assert!(!s.can_export());
        assert!(s.export_png().unwrap().is_none());
        assert_eq!(s.style().text, "hi");
    }

    #[test]
    fn upload_replaces_previous_image() {
        let mut s = EditorSession::new(BlockRasterizer::default());
        s.load_image(solid(10, 10, 0)).unwrap();
        s.load_image(solid(30, 20, 0)).unwrap();
        let out = s.output().unwrap();
        assert_eq!((out.width(), out.height()), (30, 20));
        assert!(s.can_export());
    }

    #[test]
    fn last_setter_wins() {
        let mut s = EditorSession::new(BlockRasterizer::default());
        s.load_image(solid(200, 100, 40)).unwrap();
        s.set_position(Position::TopLeft).unwrap();
        s.set_position(Position::BottomRight).unwrap();

        let mut fresh = Compositor::new(BlockRasterizer::default());
        let style = WatermarkStyle {
            position: Position::BottomRight,
            ..WatermarkStyle::default()
        };
        let expected = fresh.render(s.source(), &style).unwrap();
        assert_eq!(s.output(), expected.as_ref());
    }

    #[test]
    fn clear_image_disables_export() {
        let mut s = EditorSession::new(BlockRasterizer::default());
        s.load_image(solid(8, 8, 0)).unwrap();
        s.clear_image();
        assert!(!s.can_export());
        assert!(!s.export_to("target/session_unit/never.png").unwrap());
    }
}
