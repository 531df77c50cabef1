use std::path::Path;

use crate::{
    assets::decode::unpremultiply_rgba8,
    encode::png,
    foundation::{
        core::Canvas,
        error::{ProtectorError, ProtectorResult},
    },
};

/// A composed watermark image as RGBA8 pixels.
///
/// [`OutputImage::data`] is premultiplied alpha, exactly like [`crate::SourceImage::data`]. The
/// straight copy used at export keeps untouched source pixels bit-exact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
    straight: Vec<u8>,
}

impl OutputImage {
    #[cfg(test)]
    pub(crate) fn from_premul_parts(canvas: Canvas, data: Vec<u8>) -> ProtectorResult<Self> {
        let straight = unpremultiply_rgba8(&data);
        Self::from_parts(canvas, data, straight)
    }

    /// `straight` must be the un-premultiplied form of `data`, pixel for pixel.
    pub(crate) fn from_parts(
        canvas: Canvas,
        data: Vec<u8>,
        straight: Vec<u8>,
    ) -> ProtectorResult<Self> {
        let len = canvas.rgba_len()?;
        if data.len() != len || straight.len() != len {
            return Err(ProtectorError::render(
                "output byte length does not match canvas",
            ));
        }
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data,
            straight,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight (non-premultiplied) RGBA8 bytes, as image encoders expect.
    pub fn straight_data(&self) -> &[u8] {
        &self.straight
    }

    pub fn to_rgba8_straight(&self) -> Vec<u8> {
        self.straight.clone()
    }

    pub fn encode_png(&self) -> ProtectorResult<Vec<u8>> {
        png::encode_png(self)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> ProtectorResult<()> {
        png::write_png(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_conversion_undoes_premultiply() {
        let out = OutputImage::from_premul_parts(
            Canvas {
                width: 2,
                height: 1,
            },
            vec![100, 50, 25, 128, 7, 8, 9, 255],
        )
        .unwrap();
        let straight = out.to_rgba8_straight();
        assert_eq!(&straight[4..], &[7, 8, 9, 255]);
        assert_eq!(straight[3], 128);
        assert!((i32::from(straight[0]) - 199).abs() <= 1);
    }

    #[test]
    fn pixel_is_bounds_checked() {
        let out = OutputImage::from_premul_parts(
            Canvas {
                width: 1,
                height: 1,
            },
            vec![1, 2, 3, 4],
        )
        .unwrap();
        assert_eq!(out.pixel(0, 0), Some([1, 2, 3, 4]));
        assert_eq!(out.pixel(1, 0), None);
        assert!(
            OutputImage::from_premul_parts(
                Canvas {
                    width: 2,
                    height: 2
                },
                vec![0; 4]
            )
            .is_err()
        );
    }
}
