use crate::{
    assets::font::FontSource,
    foundation::{
        core::{CoverageMask, Point},
        error::{ProtectorError, ProtectorResult},
    },
};

/// Measures and rasterizes a single line of watermark text.
///
/// Implementations must be deterministic: the same arguments always produce the same width and
/// the same mask.
pub trait TextRasterizer {
    /// Advance width of `text` in pixels at `font_size`.
    fn measure(&mut self, text: &str, font_size: f32) -> ProtectorResult<f64>;

    /// Coverage of `text` centered on `anchor`, on a `width` x `height` surface.
    fn rasterize(
        &mut self,
        text: &str,
        font_size: f32,
        anchor: Point,
        width: u32,
        height: u32,
    ) -> ProtectorResult<CoverageMask>;
}

impl<T: TextRasterizer + ?Sized> TextRasterizer for Box<T> {
    fn measure(&mut self, text: &str, font_size: f32) -> ProtectorResult<f64> {
        (**self).measure(text, font_size)
    }

    fn rasterize(
        &mut self,
        text: &str,
        font_size: f32,
        anchor: Point,
        width: u32,
        height: u32,
    ) -> ProtectorResult<CoverageMask> {
        (**self).rasterize(text, font_size, anchor, width, height)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const COVERAGE_BRUSH: TextBrushRgba8 = TextBrushRgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

/// Text backend shaping with Parley and filling glyph outlines with `vello_cpu`.
pub struct ParleyRasterizer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl ParleyRasterizer {
    pub fn new(source: FontSource) -> ProtectorResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(source.bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ProtectorError::font(format!(
                "no font families registered from '{}'",
                source.path.display()
            ))
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ProtectorError::font("registered font family has no name"))?
            .to_string();
        tracing::debug!(family = %family_name, "registered watermark font family");

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(source.bytes), 0);
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    fn layout(
        &mut self,
        text: &str,
        font_size: f32,
    ) -> ProtectorResult<parley::Layout<TextBrushRgba8>> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(ProtectorError::validation(
                "font size must be finite and > 0",
            ));
        }

        let family = self.family_name.clone();
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font_size));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(COVERAGE_BRUSH));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextRasterizer for ParleyRasterizer {
    fn measure(&mut self, text: &str, font_size: f32) -> ProtectorResult<f64> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let layout = self.layout(text, font_size)?;
        Ok(f64::from(layout.full_width()))
    }

    fn rasterize(
        &mut self,
        text: &str,
        font_size: f32,
        anchor: Point,
        width: u32,
        height: u32,
    ) -> ProtectorResult<CoverageMask> {
        let w: u16 = width
            .try_into()
            .map_err(|_| ProtectorError::render("surface width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| ProtectorError::render("surface height exceeds u16"))?;

        let mut mask = CoverageMask::new(width, height)?;
        if text.is_empty() {
            return Ok(mask);
        }

        // Positioned glyph `y` is the baseline in layout space, so centering the line box puts the
        // middle of ascent..descent on the anchor.
        let layout = self.layout(text, font_size)?;
        let origin_x = anchor.x - f64::from(layout.full_width()) / 2.0;
        let origin_y = anchor.y - f64::from(layout.height()) / 2.0;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin_x, origin_y)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        for (dst, px) in mask
            .data
            .iter_mut()
            .zip(pixmap.data_as_u8_slice().chunks_exact(4))
        {
            *dst = px[3];
        }
        Ok(mask)
    }
}

/// Font-free rasterizer drawing one solid box per non-whitespace character.
///
/// Every character advances `advance_ratio * font_size`. Useful for previews and tests on hosts
/// without fonts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockRasterizer {
    pub advance_ratio: f64,
}

impl Default for BlockRasterizer {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl BlockRasterizer {
    pub fn new(advance_ratio: f64) -> Self {
        Self { advance_ratio }
    }

    fn advance(&self, font_size: f32) -> f64 {
        self.advance_ratio.max(0.0) * f64::from(font_size)
    }
}

impl TextRasterizer for BlockRasterizer {
    fn measure(&mut self, text: &str, font_size: f32) -> ProtectorResult<f64> {
        Ok(text.chars().count() as f64 * self.advance(font_size))
    }

    fn rasterize(
        &mut self,
        text: &str,
        font_size: f32,
        anchor: Point,
        width: u32,
        height: u32,
    ) -> ProtectorResult<CoverageMask> {
        let mut mask = CoverageMask::new(width, height)?;
        let adv = self.advance(font_size);
        let total = self.measure(text, font_size)?;
        let half_h = f64::from(font_size) * 0.35;
        let (y0, y1) = (anchor.y - half_h, anchor.y + half_h);
        let left = anchor.x - total / 2.0;

        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = left + i as f64 * adv + adv * 0.1;
            let x1 = x0 + adv * 0.8;
            fill_box(&mut mask, x0, y0, x1, y1);
        }
        Ok(mask)
    }
}

fn fill_box(mask: &mut CoverageMask, x0: f64, y0: f64, x1: f64, y1: f64) {
    let w = mask.width as usize;
    for y in 0..mask.height as usize {
        let cy = y as f64 + 0.5;
        if cy < y0 || cy >= y1 {
            continue;
        }
        for x in 0..w {
            let cx = x as f64 + 0.5;
            if cx >= x0 && cx < x1 {
                mask.data[y * w + x] = 255;
            }
        }
    }
}
