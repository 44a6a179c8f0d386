use rayon::prelude::*;

/// Normalized box blur over a row-major `f32` plane.
///
/// Borders replicate the edge sample. Even window sizes keep the anchor at
/// `size / 2`, so the kernel spans `[-size/2, size - 1 - size/2]`.
pub fn box_blur_plane(src: &[f32], width: usize, height: usize, size: usize) -> Vec<f32> {
    let mut tmp = vec![0.0f32; src.len()];
    let mut dst = vec![0.0f32; src.len()];
    box_blur_plane_into(src, &mut tmp, &mut dst, width, height, size);
    dst
}

/// In-place variant of [`box_blur_plane`] for callers that reuse buffers
/// across many planes. `tmp` and `dst` must both hold `width * height`
/// samples; only the leading `width * height` samples of each are touched.
pub fn box_blur_plane_into(
    src: &[f32],
    tmp: &mut [f32],
    dst: &mut [f32],
    width: usize,
    height: usize,
    size: usize,
) {
    let n = width * height;
    if n == 0 {
        return;
    }
    debug_assert!(src.len() >= n && tmp.len() >= n && dst.len() >= n);

    let size = size.max(1);
    if size == 1 {
        dst[..n].copy_from_slice(&src[..n]);
        return;
    }

    let lo = -((size / 2) as isize);
    let hi = lo + size as isize - 1;
    let norm = 1.0 / size as f32;

    // Horizontal pass.
    tmp[..n]
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * width..y * width + width];
            for (x, out) in row.iter_mut().enumerate() {
                let mut acc = 0.0f32;
                for off in lo..=hi {
                    let sx = (x as isize + off).clamp(0, width as isize - 1) as usize;
                    acc += src_row[sx];
                }
                *out = acc * norm;
            }
        });

    // Vertical pass reads the horizontally blurred plane.
    let tmp_ref = &tmp[..n];
    dst[..n]
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let mut acc = 0.0f32;
                for off in lo..=hi {
                    let sy = (y as isize + off).clamp(0, height as isize - 1) as usize;
                    acc += tmp_ref[sy * width + x];
                }
                *out = acc * norm;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_preserves_constant_plane() {
        let plane = vec![7.5f32; 6 * 4];
        let blurred = box_blur_plane(&plane, 6, 4, 3);
        for v in blurred {
            assert!((v - 7.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let mut plane = vec![0.0f32; 5 * 5];
        plane[2 * 5 + 2] = 9.0;
        let blurred = box_blur_plane(&plane, 5, 5, 3);
        // Center keeps 1/9 of the mass, every 3x3 neighbor gets the same share.
        assert!((blurred[2 * 5 + 2] - 1.0).abs() < 1e-5);
        assert!((blurred[1 * 5 + 1] - 1.0).abs() < 1e-5);
        assert!(blurred[0].abs() < 1e-5);
    }

    #[test]
    fn test_window_one_is_identity() {
        let plane: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let blurred = box_blur_plane(&plane, 4, 3, 1);
        assert_eq!(plane, blurred);
    }
}
