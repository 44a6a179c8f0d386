use crate::{validate_plane_size, Result};
use image::GrayImage;
use rayon::prelude::*;

pub fn compute_histogram(image: &GrayImage) -> [u32; 256] {
    let mut hist = [0u32; 256];
    for &v in image.as_raw() {
        hist[v as usize] += 1;
    }
    hist
}

pub fn compute_cdf(hist: &[u32; 256]) -> [u64; 256] {
    let mut cdf = [0u64; 256];
    let mut running = 0u64;
    for (bin, &count) in hist.iter().enumerate() {
        running += count as u64;
        cdf[bin] = running;
    }
    cdf
}

/// Histogram equalization, stretching the CDF over the full 0..=255 range.
///
/// A constant image has nothing to stretch and is returned unchanged.
pub fn equalize_histogram(image: &GrayImage) -> GrayImage {
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return image.clone();
    }

    let cdf = compute_cdf(&compute_histogram(image));
    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    if total == cdf_min {
        return image.clone();
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    let mut lut = [0u8; 256];
    for (bin, slot) in lut.iter_mut().enumerate() {
        *slot = ((cdf[bin].saturating_sub(cdf_min)) as f64 * scale).round() as u8;
    }

    let width = image.width() as usize;
    let src = image.as_raw();
    let mut out = GrayImage::new(image.width(), image.height());
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                *px = lut[src[y * width + x] as usize];
            }
        });

    out
}

/// Min/max-normalize a `f32` plane into a 0..=255 grayscale image.
///
/// A flat plane (zero range) maps to all zeros.
pub fn normalize_to_u8(plane: &[f32], width: usize, height: usize) -> Result<GrayImage> {
    validate_plane_size(plane.len(), width, height)?;

    let min = plane.iter().copied().fold(f32::INFINITY, f32::min);
    let max = plane.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    let mut out = GrayImage::new(width as u32, height as u32);
    if range > 0.0 {
        for (px, &v) in out.iter_mut().zip(plane) {
            *px = ((v - min) / range * 255.0) as u8;
        }
    }
    Ok(out)
}

/// Bitwise inversion: every sample becomes `255 - sample`.
pub fn invert(image: &GrayImage) -> GrayImage {
    let mut out = image.clone();
    for px in out.iter_mut() {
        *px = 255 - *px;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_equalize_stretches_two_levels() {
        let mut img = GrayImage::from_pixel(4, 2, Luma([100]));
        for x in 0..4 {
            img.put_pixel(x, 1, Luma([110]));
        }
        let eq = equalize_histogram(&img);
        // Lower level maps to 0, upper level to 255.
        assert_eq!(eq.get_pixel(0, 0)[0], 0);
        assert_eq!(eq.get_pixel(0, 1)[0], 255);
    }

    #[test]
    fn test_equalize_constant_is_identity() {
        let img = GrayImage::from_pixel(6, 6, Luma([57]));
        let eq = equalize_histogram(&img);
        assert_eq!(img, eq);
    }

    #[test]
    fn test_normalize_extremes() {
        let plane = vec![2.0f32, 4.0, 6.0, 4.0];
        let img = normalize_to_u8(&plane, 2, 2).unwrap();
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(0, 1)[0], 255);
        assert_eq!(img.get_pixel(1, 0)[0], 127);
    }

    #[test]
    fn test_normalize_flat_plane_is_zero() {
        let plane = vec![3.0f32; 9];
        let img = normalize_to_u8(&plane, 3, 3).unwrap();
        assert!(img.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_normalize_rejects_bad_dims() {
        assert!(normalize_to_u8(&[0.0; 5], 2, 2).is_err());
    }

    #[test]
    fn test_invert_involution() {
        let mut img = GrayImage::from_pixel(3, 3, Luma([17]));
        img.put_pixel(2, 2, Luma([255]));
        let back = invert(&invert(&img));
        assert_eq!(img, back);
    }
}
