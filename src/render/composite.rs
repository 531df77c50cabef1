use crate::foundation::{
    core::{CoverageMask, Rgba8Premul},
    error::{ProtectorError, ProtectorResult},
};

pub type PremulRgba8 = [u8; 4];

/// Source-over of one premultiplied pixel, with the source scaled by `coverage / 255`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, coverage: u8) -> PremulRgba8 {
    if coverage == 0 || src[3] == 0 {
        return dst;
    }

    let cov = u16::from(coverage);
    let sa = mul_div255(u16::from(src[3]), cov);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), cov);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Paint `color` through `mask` onto `dst`, reading the mask shifted by `(dx, dy)`.
pub fn fill_mask_over_in_place(
    dst: &mut [u8],
    mask: &CoverageMask,
    color: Rgba8Premul,
    dx: i64,
    dy: i64,
) -> ProtectorResult<()> {
    let expected = (mask.width as usize)
        .checked_mul(mask.height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ProtectorError::render("mask buffer size overflow"))?;
    if dst.len() != expected {
        return Err(ProtectorError::render(
            "fill_mask_over_in_place expects dst matching mask width*height*4",
        ));
    }
    if color.a == 0 {
        return Ok(());
    }

    let src = color.to_array();
    let w = mask.width as usize;
    for (i, d) in dst.chunks_exact_mut(4).enumerate() {
        let (x, y) = ((i % w) as i64, (i / w) as i64);
        let cov = mask.get(x - dx, y - dy);
        if cov == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], src, cov);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    let v = u32::from(x) * u32::from(y) + 127;
    (v / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}
