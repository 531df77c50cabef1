use std::{io::Cursor, path::Path};

use crate::{
    foundation::error::{ProtectorError, ProtectorResult},
    render::output::OutputImage,
};

/// File name offered when exporting a protected image.
pub const DEFAULT_EXPORT_FILENAME: &str = "protected-image.png";

pub fn encode_png(img: &OutputImage) -> ProtectorResult<Vec<u8>> {
    let rgba = image::RgbaImage::from_raw(img.width(), img.height(), img.to_rgba8_straight())
        .ok_or_else(|| ProtectorError::render("output buffer does not match its dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| ProtectorError::render(format!("encode png: {e}")))?;
    Ok(buf)
}

#[tracing::instrument(skip_all, fields(path = %path.display(), width = img.width(), height = img.height()))]
pub fn write_png(img: &OutputImage, path: &Path) -> ProtectorResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    image::save_buffer_with_format(
        path,
        img.straight_data(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| ProtectorError::render(format!("write png '{}': {e}", path.display())))?;

    tracing::info!("exported protected image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::decode::SourceImage;
    use crate::foundation::core::Canvas;

    #[test]
    fn encoded_png_decodes_to_same_pixels() {
        let data = vec![10, 20, 30, 255, 0, 0, 0, 0, 200, 100, 0, 255, 1, 2, 3, 255];
        let img = OutputImage::from_premul_parts(
            Canvas {
                width: 2,
                height: 2,
            },
            data.clone(),
        )
        .unwrap();

        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let back = SourceImage::decode(&bytes).unwrap();
        assert_eq!(back.data(), data.as_slice());
    }
}
