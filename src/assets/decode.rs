use std::{path::Path, sync::Arc};

use crate::foundation::{
    core::{Canvas, premul, unpremul},
    error::{ProtectorError, ProtectorResult},
};

/// Decoded raster the watermark is drawn over.
///
/// Pixels are kept both premultiplied (for blending) and straight (as decoded, for export) and
/// shared; a new upload replaces the whole value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
    rgba8: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Decode any raster format the `image` crate understands.
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn decode(bytes: &[u8]) -> ProtectorResult<Self> {
        let dyn_img = image::load_from_memory(bytes)
            .map_err(|e| ProtectorError::decode(format!("decode image from memory: {e}")))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        tracing::debug!(width, height, "decoded source image");

        Self::from_rgba8(width, height, rgba.into_raw())
    }

    pub fn open(path: impl AsRef<Path>) -> ProtectorResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ProtectorError::decode(format!("failed to read image '{}': {e}", path.display()))
        })?;
        Self::decode(&bytes)
    }

    /// Build from straight (non-premultiplied) RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> ProtectorResult<Self> {
        check_len(width, height, &rgba8)?;
        let mut rgba8_premul = rgba8.clone();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            rgba8: Arc::new(rgba8),
        })
    }

    /// Build from premultiplied RGBA8 bytes; the straight copy is derived by un-premultiplying.
    pub fn from_premul_parts(
        width: u32,
        height: u32,
        rgba8_premul: Vec<u8>,
    ) -> ProtectorResult<Self> {
        check_len(width, height, &rgba8_premul)?;
        let rgba8 = unpremultiply_rgba8(&rgba8_premul);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            rgba8: Arc::new(rgba8),
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
        self.rgba8_premul.as_slice()
    }

    /// Straight RGBA8 bytes, row-major, exactly as decoded.
    pub fn rgba8(&self) -> &[u8] {
        self.rgba8.as_slice()
    }
}

fn check_len(width: u32, height: u32, rgba: &[u8]) -> ProtectorResult<()> {
    let expected = Canvas { width, height }.rgba_len()?;
    if rgba.len() != expected {
        return Err(ProtectorError::validation(format!(
            "source byte length {} does not match {width}x{height} rgba8",
            rgba.len()
        )));
    }
    Ok(())
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 255 {
            continue;
        }
        px[0] = premul(px[0], a);
        px[1] = premul(px[1], a);
        px[2] = premul(px[2], a);
    }
}

pub(crate) fn unpremultiply_rgba8(rgba8_premul: &[u8]) -> Vec<u8> {
    let mut out = rgba8_premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = px[3];
        if a == 255 {
            continue;
        }
        px[0] = unpremul(px[0], a);
        px[1] = unpremul(px[1], a);
        px[2] = unpremul(px[2], a);
    }
    out
}
