use crate::{CodecError, DepthDecoder, DisparitySearch, Result};
use image::{GrayImage, RgbImage};
use log::debug;
use rayon::prelude::*;
use sirds_core::{is_empty, rgb_to_luma};
use sirds_imgproc::{box_blur_plane_into, equalize_histogram, median_filter};
use wide::f32x8;

/// Running per-pixel minimum match cost and the disparity that produced it.
///
/// This is the only state shared across disparity candidates; it is updated
/// candidate-by-candidate, never from two candidates at once.
pub struct DisparityCostField {
    pub min_cost: Vec<f32>,
    pub best: Vec<u8>,
}

impl DisparityCostField {
    pub fn new(len: usize) -> Self {
        Self {
            min_cost: vec![f32::MAX; len],
            best: vec![0u8; len],
        }
    }
}

/// Brute-force windowed block-matching decoder.
///
/// For every candidate disparity the stereogram is compared against itself
/// shifted left by that many columns; a box-blurred absolute-difference
/// plane scores the match and the per-pixel minimum wins. Complexity is
/// O(candidates x width x height), dominated by the blur.
pub struct BlockMatchDecoder {
    pub eye_sep: i32,
    pub max_depth: i32,
    pub window_size: usize,
}

impl Default for BlockMatchDecoder {
    fn default() -> Self {
        Self {
            eye_sep: 130,
            max_depth: 50,
            window_size: 7,
        }
    }
}

impl BlockMatchDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eye_sep(mut self, eye_sep: i32) -> Self {
        self.eye_sep = eye_sep;
        self
    }

    pub fn with_max_depth(mut self, max_depth: i32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }
}

impl DepthDecoder for BlockMatchDecoder {
    fn decode(&self, stereogram: &RgbImage) -> Result<GrayImage> {
        if is_empty(stereogram) {
            return Err(CodecError::EmptyStereogram);
        }

        let gray = rgb_to_luma(stereogram);
        let width = gray.width() as usize;
        let height = gray.height() as usize;
        let data = gray.as_raw();

        let search = DisparitySearch::from_params(self.eye_sep, self.max_depth);
        let window = self.window_size.max(1);
        debug!(
            "block-match decode {}x{}, d in {}..={}, window {}",
            width, height, search.min, search.max, window
        );

        let n = width * height;
        let mut field = DisparityCostField::new(n);
        // Scratch planes sized for the widest overlap, reused per candidate.
        let mut diff = vec![0.0f32; n];
        let mut tmp = vec![0.0f32; n];
        let mut blurred = vec![0.0f32; n];

        for d in search.min..=search.max {
            let d = d as usize;
            if d >= width {
                break;
            }
            let overlap = width - d;

            shifted_absdiff(data, width, height, d, &mut diff);
            box_blur_plane_into(
                &diff[..overlap * height],
                &mut tmp,
                &mut blurred,
                overlap,
                height,
                window,
            );

            let scored = &blurred[..overlap * height];
            field
                .min_cost
                .par_chunks_mut(width)
                .zip(field.best.par_chunks_mut(width))
                .enumerate()
                .for_each(|(y, (cost_row, best_row))| {
                    let scored_row = &scored[y * overlap..(y + 1) * overlap];
                    for x in 0..overlap {
                        if scored_row[x] < cost_row[x] {
                            cost_row[x] = scored_row[x];
                            best_row[x] = d as u8;
                        }
                    }
                });
        }

        let mut depth = GrayImage::new(gray.width(), gray.height());
        for (px, &d) in depth.iter_mut().zip(&field.best) {
            *px = search.depth_value(d);
        }

        let cleaned = median_filter(&depth, 5);
        Ok(equalize_histogram(&cleaned))
    }
}

/// Absolute luminance difference between the image and itself shifted left
/// by `d` columns, over the overlapping region. Output rows have stride
/// `width - d`.
fn shifted_absdiff(data: &[u8], width: usize, height: usize, d: usize, out: &mut [f32]) {
    let overlap = width - d;
    out[..overlap * height]
        .par_chunks_mut(overlap)
        .enumerate()
        .for_each(|(y, row)| {
            let base = &data[y * width..y * width + width];
            let mut x = 0usize;
            while x + 8 <= overlap {
                let a = f32x8::from([
                    base[x] as f32,
                    base[x + 1] as f32,
                    base[x + 2] as f32,
                    base[x + 3] as f32,
                    base[x + 4] as f32,
                    base[x + 5] as f32,
                    base[x + 6] as f32,
                    base[x + 7] as f32,
                ]);
                let b = f32x8::from([
                    base[x + d] as f32,
                    base[x + d + 1] as f32,
                    base[x + d + 2] as f32,
                    base[x + d + 3] as f32,
                    base[x + d + 4] as f32,
                    base[x + d + 5] as f32,
                    base[x + d + 6] as f32,
                    base[x + d + 7] as f32,
                ]);
                row[x..x + 8].copy_from_slice(&(a - b).abs().to_array());
                x += 8;
            }
            while x < overlap {
                row[x] = (base[x] as f32 - base[x + d] as f32).abs();
                x += 1;
            }
        });
}
