use crate::{
    assets::decode::SourceImage,
    foundation::{
        core::{Canvas, Point, Rgba8Premul, unpremul},
        error::ProtectorResult,
    },
    model::WatermarkStyle,
    render::{
        anchor::anchor_point,
        blur::blur_mask,
        composite::fill_mask_over_in_place,
        output::OutputImage,
        text::TextRasterizer,
    },
};

/// Shadow offset in pixels, applied after blurring.
pub const SHADOW_OFFSET: (i64, i64) = (2, 2);
/// Shadow blur radius; the gaussian standard deviation is half of it.
pub const SHADOW_BLUR: f32 = 4.0;
/// Shadow alpha before global opacity is applied (50% black).
pub const SHADOW_ALPHA: u8 = 128;

/// Draws a text watermark over a source image.
///
/// Every call recomputes the output from the source; nothing is cached between calls.
pub struct Compositor<R> {
    text: R,
}

impl<R: TextRasterizer> Compositor<R> {
    pub fn new(text: R) -> Self {
        Self { text }
    }

    pub fn rasterizer(&self) -> &R {
        &self.text
    }

    /// Anchor the text of `style` would be centered on for a canvas of this size.
    pub fn anchor_for(&mut self, canvas: Canvas, style: &WatermarkStyle) -> ProtectorResult<Point> {
        let style = style.sanitized();
        let font_size = style.font_size as f32;
        let text_width = self.text.measure(&style.text, font_size)?;
        let anchor = anchor_point(style.position, canvas, text_width, f64::from(font_size));
        tracing::debug!(
            position = %style.position,
            text_width,
            x = anchor.x,
            y = anchor.y,
            "computed watermark anchor"
        );
        Ok(anchor)
    }

    /// Compose `source` and the styled text into a new image.
    ///
    /// Returns `Ok(None)` without doing any work when there is no source image.
    #[tracing::instrument(skip_all, fields(position = %style.position, font_size = style.font_size))]
    pub fn render(
        &mut self,
        source: Option<&SourceImage>,
        style: &WatermarkStyle,
    ) -> ProtectorResult<Option<OutputImage>> {
        let Some(source) = source else {
            tracing::debug!("no source image; render skipped");
            return Ok(None);
        };

        let canvas = source.canvas();
        let mut data = source.data().to_vec();

        let style = style.sanitized();
        let alpha = style.alpha_u8();
        if alpha == 0 || style.text.is_empty() {
            return Ok(Some(OutputImage::from_parts(
                canvas,
                data,
                source.rgba8().to_vec(),
            )?));
        }

        let font_size = style.font_size as f32;
        let anchor = self.anchor_for(canvas, &style)?;
        let mask = self
            .text
            .rasterize(&style.text, font_size, anchor, canvas.width, canvas.height)?;

        if !mask.is_empty() {
            let shadow = blur_mask(&mask, SHADOW_BLUR / 2.0)?;
            let shadow_alpha = scale_alpha(SHADOW_ALPHA, alpha);
            let (dx, dy) = SHADOW_OFFSET;
            fill_mask_over_in_place(
                &mut data,
                &shadow,
                Rgba8Premul::from_straight_rgba(0, 0, 0, shadow_alpha),
                dx,
                dy,
            )?;
            fill_mask_over_in_place(&mut data, &mask, style.color.with_alpha(alpha), 0, 0)?;
        }

        let straight = straight_over_source(source, &data);
        Ok(Some(OutputImage::from_parts(canvas, data, straight)?))
    }
}

/// Straight copy of `blended`: source pixels the overlay left untouched are taken verbatim.
fn straight_over_source(source: &SourceImage, blended: &[u8]) -> Vec<u8> {
    let mut out = source.rgba8().to_vec();
    for ((dst, now), before) in out
        .chunks_exact_mut(4)
        .zip(blended.chunks_exact(4))
        .zip(source.data().chunks_exact(4))
    {
        if now == before {
            continue;
        }
        let a = now[3];
        dst[0] = unpremul(now[0], a);
        dst[1] = unpremul(now[1], a);
        dst[2] = unpremul(now[2], a);
        dst[3] = a;
    }
    out
}

fn scale_alpha(a: u8, by: u8) -> u8 {
    ((u32::from(a) * u32::from(by) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assets::color::Rgb8, model::Position, render::text::BlockRasterizer};

    fn gray_source(w: u32, h: u32) -> SourceImage {
        SourceImage::from_rgba8(w, h, [90u8, 90, 90, 255].repeat((w * h) as usize)).unwrap()
    }

    fn style(text: &str, position: Position, opacity: f32) -> WatermarkStyle {
        WatermarkStyle {
            text: text.to_owned(),
            font_size: 20,
            opacity,
            color: Rgb8::new(255, 0, 0),
            position,
        }
    }

    #[test]
    fn absent_source_is_a_noop() {
        let mut c = Compositor::new(BlockRasterizer::default());
        let out = c.render(None, &WatermarkStyle::default()).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn full_opacity_paints_color_at_anchor() {
        let src = gray_source(120, 60);
        let mut c = Compositor::new(BlockRasterizer::new(0.5));
        let out = c
            .render(Some(&src), &style("W", Position::Center, 1.0))
            .unwrap()
            .unwrap();
        assert_eq!(out.pixel(60, 30), Some([255, 0, 0, 255]));
        assert_eq!(out.pixel(0, 0), Some([90, 90, 90, 255]));
    }

    #[test]
    fn shadow_darkens_below_right_of_glyphs() {
        let src = gray_source(120, 60);
        let mut c = Compositor::new(BlockRasterizer::new(0.5));
        let out = c
            .render(Some(&src), &style("W", Position::Center, 1.0))
            .unwrap()
            .unwrap();
        // Glyph box spans x 56..63, y 23..36; the shadow leaks past its right/bottom edges.
        let [r, g, b, a] = out.pixel(65, 38).unwrap();
        assert_eq!(a, 255);
        assert!(r < 90 && g < 90 && b < 90);
        assert_eq!(r, g);
    }

    #[test]
    fn opacity_zero_returns_source_bytes() {
        let src = gray_source(64, 64);
        let mut c = Compositor::new(BlockRasterizer::default());
        let out = c
            .render(Some(&src), &style("HELLO", Position::TopLeft, 0.0))
            .unwrap()
            .unwrap();
        assert_eq!(out.data(), src.data());
    }

    #[test]
    fn translucent_source_pixels_keep_straight_bytes() {
        let mut rgba = [90u8, 90, 90, 255].repeat(120 * 60);
        rgba[..4].copy_from_slice(&[201, 7, 99, 3]);
        let src = SourceImage::from_rgba8(120, 60, rgba).unwrap();
        let mut c = Compositor::new(BlockRasterizer::new(0.5));
        let out = c
            .render(Some(&src), &style("W", Position::Center, 1.0))
            .unwrap()
            .unwrap();
        assert_eq!(&out.straight_data()[..4], &[201, 7, 99, 3]);
        let i = (30 * 120 + 60) * 4;
        assert_eq!(&out.straight_data()[i..i + 4], &[255, 0, 0, 255]);
    }

    #[test]
    fn scale_alpha_rounds() {
        assert_eq!(scale_alpha(128, 255), 128);
        assert_eq!(scale_alpha(128, 128), 64);
        assert_eq!(scale_alpha(255, 0), 0);
    }
}
