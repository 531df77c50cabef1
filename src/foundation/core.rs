use crate::foundation::error::{ProtectorError, ProtectorResult};

pub use kurbo::{Point, Rect};

/// Pixel dimensions of a raster surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Number of bytes needed for an RGBA8 buffer of this size.
    pub fn rgba_len(self) -> ProtectorResult<usize> {
        self.pixel_count()?
            .checked_mul(4)
            .ok_or_else(|| ProtectorError::validation("rgba buffer size overflow"))
    }

    pub fn pixel_count(self) -> ProtectorResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or_else(|| ProtectorError::validation("pixel count overflow"))
    }

    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

pub(crate) fn premul(c: u8, a: u8) -> u8 {
    let c = u16::from(c);
    let a = u16::from(a);
    (((c * a) + 127) / 255) as u8
}

pub(crate) fn unpremul(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let c = u32::from(c);
    let a = u32::from(a);
    (((c * 255) + a / 2) / a).min(255) as u8
}

/// Single-channel 8-bit coverage, row-major, same size as its target surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl CoverageMask {
    pub fn new(width: u32, height: u32) -> ProtectorResult<Self> {
        let len = Canvas { width, height }.pixel_count()?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    pub fn get(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0;
        }
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&c| c == 0)
    }

    /// Smallest pixel rectangle holding every non-zero sample.
    pub fn bounds(&self) -> Option<Rect> {
        let w = self.width as usize;
        let mut min = (usize::MAX, usize::MAX);
        let mut max = (0usize, 0usize);
        let mut any = false;
        for (i, &c) in self.data.iter().enumerate() {
            if c == 0 {
                continue;
            }
            let (x, y) = (i % w, i / w);
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
            any = true;
        }
        any.then(|| Rect::new(min.0 as f64, min.1 as f64, (max.0 + 1) as f64, (max.1 + 1) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_center_is_half_extent() {
        let c = Canvas {
            width: 801,
            height: 600,
        };
        assert_eq!(c.center(), Point::new(400.5, 300.0));
        assert_eq!(c.rgba_len().unwrap(), 801 * 600 * 4);
    }

    #[test]
    fn premul_roundtrip_is_exact_for_opaque() {
        for c in [0u8, 1, 127, 128, 254, 255] {
            assert_eq!(unpremul(premul(c, 255), 255), c);
        }
        assert_eq!(unpremul(10, 0), 0);
        assert_eq!(
            Rgba8Premul::from_straight_rgba(200, 100, 50, 128),
            Rgba8Premul {
                r: 100,
                g: 50,
                b: 25,
                a: 128
            }
        );
    }

    #[test]
    fn mask_bounds_cover_nonzero_samples() {
        let mut m = CoverageMask::new(6, 4).unwrap();
        assert!(m.bounds().is_none());
        m.data[6 + 2] = 9;
        m.data[3 * 6 + 4] = 200;
        assert_eq!(m.bounds(), Some(Rect::new(2.0, 1.0, 5.0, 4.0)));
        assert_eq!(m.get(-1, 0), 0);
        assert_eq!(m.get(4, 3), 200);
        assert_eq!(m.get(6, 3), 0);
    }
}
