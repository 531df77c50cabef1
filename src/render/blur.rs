use crate::foundation::{
    core::CoverageMask,
    error::{ProtectorError, ProtectorResult},
};

/// Kernel radius covering three standard deviations.
pub fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Separable gaussian blur of a coverage mask. Samples past the edge read as empty.
pub fn blur_mask(src: &CoverageMask, sigma: f32) -> ProtectorResult<CoverageMask> {
    let radius = radius_for_sigma(sigma);
    if radius == 0 || src.is_empty() {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = CoverageMask::new(src.width, src.height)?;
    let mut out = CoverageMask::new(src.width, src.height)?;

    horizontal_pass(src, &mut tmp, &kernel);
    vertical_pass(&tmp, &mut out, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> ProtectorResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ProtectorError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(ProtectorError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &CoverageMask, dst: &mut CoverageMask, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = src.width as usize;
    for y in 0..src.height as i64 {
        for x in 0..src.width as i64 {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                acc += u64::from(kw) * u64::from(src.get(x + ki as i64 - radius, y));
            }
            dst.data[(y as usize) * w + x as usize] = q16_to_u8(acc);
        }
    }
}

fn vertical_pass(src: &CoverageMask, dst: &mut CoverageMask, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = src.width as usize;
    for y in 0..src.height as i64 {
        for x in 0..src.width as i64 {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                acc += u64::from(kw) * u64::from(src.get(x, y + ki as i64 - radius));
            }
            dst.data[(y as usize) * w + x as usize] = q16_to_u8(acc);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}
