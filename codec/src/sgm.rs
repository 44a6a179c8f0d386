use crate::{CodecError, DepthDecoder, DisparitySearch, Result};
use image::{GrayImage, RgbImage};
use log::debug;
use rayon::prelude::*;
use sirds_core::{is_empty, rgb_to_luma};
use sirds_imgproc::{invert, median_filter, normalize_to_u8};

/// Dense disparity field produced by the semi-global matcher.
#[derive(Debug, Clone)]
pub struct DisparityField {
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
    pub min_disparity: i32,
    pub max_disparity: i32,
}

impl DisparityField {
    pub fn new(width: u32, height: u32, min_d: i32, max_d: i32) -> Self {
        Self {
            data: vec![0.0; (width * height) as usize],
            width,
            height,
            min_disparity: min_d,
            max_disparity: max_d,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        let idx = (y * self.width + x) as usize;
        self.data.get(idx).copied().unwrap_or(0.0)
    }

    /// Min/max-normalized grayscale rendering of the field. A flat field
    /// renders as all zeros.
    pub fn to_image(&self) -> GrayImage {
        normalize_to_u8(&self.data, self.width as usize, self.height as usize)
            .unwrap_or_else(|_| GrayImage::new(self.width, self.height))
    }
}

/// Semi-global matcher: a SAD cost volume aggregated along eight scanline
/// directions, with a small penalty `p1` for neighboring-disparity steps and
/// a large penalty `p2` for jumps.
///
/// The cost volume holds `width * height * candidates` entries; callers
/// bound the candidate count accordingly.
pub struct SgmMatcher {
    pub min_disparity: i32,
    pub max_disparity: i32,
    pub p1: u32,
    pub p2: u32,
    pub cost_window: usize,
    pub paths: Vec<(i32, i32)>,
}

impl Default for SgmMatcher {
    fn default() -> Self {
        Self {
            min_disparity: 0,
            max_disparity: 64,
            p1: 10,
            p2: 120,
            cost_window: 3,
            // Horizontal, vertical and the four diagonals, both ways.
            paths: vec![
                (1, 0),
                (-1, 0),
                (0, 1),
                (0, -1),
                (1, 1),
                (-1, 1),
                (1, -1),
                (-1, -1),
            ],
        }
    }
}

impl SgmMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disparity_range(mut self, min: i32, max: i32) -> Self {
        self.min_disparity = min;
        self.max_disparity = max;
        self
    }

    pub fn with_penalties(mut self, p1: u32, p2: u32) -> Self {
        self.p1 = p1;
        self.p2 = p2;
        self
    }

    pub fn with_cost_window(mut self, size: usize) -> Self {
        self.cost_window = size;
        self
    }

    pub fn compute(&self, left: &GrayImage, right: &GrayImage) -> Result<DisparityField> {
        if left.dimensions() != right.dimensions() {
            return Err(CodecError::DimensionMismatch(format!(
                "left is {:?}, right is {:?}",
                left.dimensions(),
                right.dimensions()
            )));
        }
        if self.max_disparity < self.min_disparity {
            return Err(CodecError::DimensionMismatch(format!(
                "disparity range {}..={} is inverted",
                self.min_disparity, self.max_disparity
            )));
        }

        let width = left.width() as usize;
        let height = left.height() as usize;
        if width == 0 || height == 0 {
            return Ok(DisparityField::new(
                left.width(),
                left.height(),
                self.min_disparity,
                self.max_disparity,
            ));
        }
        let candidates = (self.max_disparity - self.min_disparity + 1) as usize;

        let volume = self.sad_cost_volume(left, right, candidates);
        let aggregated = self.aggregate(&volume, width, height, candidates);

        let mut field = DisparityField::new(
            left.width(),
            left.height(),
            self.min_disparity,
            self.max_disparity,
        );
        field
            .data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.iter_mut().enumerate() {
                    let base = (y * width + x) * candidates;
                    let mut best = 0usize;
                    let mut best_cost = u32::MAX;
                    for (d, &cost) in aggregated[base..base + candidates].iter().enumerate() {
                        if cost < best_cost {
                            best_cost = cost;
                            best = d;
                        }
                    }
                    *px = (self.min_disparity + best as i32) as f32;
                }
            });

        Ok(field)
    }

    fn sad_cost_volume(&self, left: &GrayImage, right: &GrayImage, candidates: usize) -> Vec<u32> {
        let width = left.width() as usize;
        let height = left.height() as usize;
        let half = (self.cost_window / 2) as i32;
        let left_data = left.as_raw();
        let right_data = right.as_raw();

        let mut volume = vec![0u32; width * height * candidates];
        volume
            .par_chunks_mut(width * candidates)
            .enumerate()
            .for_each(|(y, plane)| {
                let y = y as i32;
                if y < half || y >= height as i32 - half {
                    return;
                }
                for x in half..width as i32 - half {
                    let cell = x as usize * candidates;
                    for (d_idx, d) in (self.min_disparity..=self.max_disparity).enumerate() {
                        let mut acc = 0u32;
                        for dy in -half..=half {
                            let row_off = (y + dy) as usize * width;
                            for dx in -half..=half {
                                let lx = x + dx;
                                let rx = lx - d;
                                if rx < 0 || rx >= width as i32 {
                                    continue;
                                }
                                let l = left_data[row_off + lx as usize] as i32;
                                let r = right_data[row_off + rx as usize] as i32;
                                acc += l.abs_diff(r);
                            }
                        }
                        plane[cell + d_idx] = acc;
                    }
                }
            });

        volume
    }

    fn aggregate(&self, volume: &[u32], width: usize, height: usize, candidates: usize) -> Vec<u32> {
        let mut total = vec![0u32; volume.len()];
        // Per-direction running costs; every cell is rewritten on each sweep
        // before any successor reads it, so no clearing is needed between
        // directions.
        let mut along = vec![0u32; volume.len()];

        for &(dx, dy) in &self.paths {
            self.sweep_path(volume, &mut total, &mut along, width, height, candidates, dx, dy);
        }

        total
    }

    #[allow(clippy::too_many_arguments)]
    fn sweep_path(
        &self,
        volume: &[u32],
        total: &mut [u32],
        along: &mut [u32],
        width: usize,
        height: usize,
        candidates: usize,
        dx: i32,
        dy: i32,
    ) {
        let cols: Vec<usize> = if dx >= 0 {
            (0..width).collect()
        } else {
            (0..width).rev().collect()
        };
        let rows: Vec<usize> = if dy >= 0 {
            (0..height).collect()
        } else {
            (0..height).rev().collect()
        };

        for &y in &rows {
            for &x in &cols {
                let base = (y * width + x) * candidates;
                let px = x as i32 - dx;
                let py = y as i32 - dy;

                let in_bounds =
                    px >= 0 && px < width as i32 && py >= 0 && py < height as i32;
                if !in_bounds {
                    // Path enters the image here: seed with the raw cost.
                    for d in 0..candidates {
                        along[base + d] = volume[base + d];
                        total[base + d] = total[base + d].saturating_add(volume[base + d]);
                    }
                    continue;
                }

                let prev = (py as usize * width + px as usize) * candidates;
                let prev_min = along[prev..prev + candidates]
                    .iter()
                    .copied()
                    .min()
                    .unwrap_or(0);
                let jump = prev_min.saturating_add(self.p2);

                for d in 0..candidates {
                    let stay = along[prev + d];
                    let step_down = if d > 0 {
                        along[prev + d - 1].saturating_add(self.p1)
                    } else {
                        u32::MAX
                    };
                    let step_up = if d + 1 < candidates {
                        along[prev + d + 1].saturating_add(self.p1)
                    } else {
                        u32::MAX
                    };
                    let carried = stay.min(step_down).min(step_up).min(jump);
                    let lr = volume[base + d].saturating_add(carried - prev_min);
                    along[base + d] = lr;
                    total[base + d] = total[base + d].saturating_add(lr);
                }
            }
        }
    }
}

/// Dense-aggregation decoder: same contract as the block-matching decoder,
/// routed through [`SgmMatcher`] with the stereogram matched against itself.
///
/// The candidate count is rounded up to a multiple of 16 and the cost window
/// forced odd and >= 3. This matcher's polarity is opposite to block
/// matching, so the normalized field is bit-inverted on the way out.
pub struct SemiGlobalDecoder {
    pub eye_sep: i32,
    pub max_depth: i32,
    pub window_size: usize,
}

impl Default for SemiGlobalDecoder {
    fn default() -> Self {
        Self {
            eye_sep: 130,
            max_depth: 50,
            window_size: 7,
        }
    }
}

impl SemiGlobalDecoder {
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

impl DepthDecoder for SemiGlobalDecoder {
    fn decode(&self, stereogram: &RgbImage) -> Result<GrayImage> {
        if is_empty(stereogram) {
            return Err(CodecError::EmptyStereogram);
        }

        let gray = rgb_to_luma(stereogram);
        let search = DisparitySearch::from_params(self.eye_sep, self.max_depth);
        let rounded = search.count().max(1).div_ceil(16) * 16;
        let window = (self.window_size | 1).max(3);
        debug!(
            "semi-global decode {}x{}, {} candidates from {}, window {}",
            gray.width(),
            gray.height(),
            rounded,
            search.min,
            window
        );

        let matcher = SgmMatcher::new()
            .with_disparity_range(search.min, search.min + rounded as i32 - 1)
            .with_cost_window(window);
        let field = matcher.compute(&gray, &gray)?;

        let cleaned = median_filter(&field.to_image(), 5);
        Ok(invert(&cleaned))
    }
}
