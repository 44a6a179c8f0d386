use crate::scanline::RowLinks;
use crate::{CodecError, EyeSeparation, Result};
use image::{GrayImage, RgbImage};
use log::debug;
use rayon::prelude::*;
use sirds_core::is_empty;

/// Eye-convergence constant for the perspective projection.
const MU: f64 = 1.0 / 3.0;

/// How the texture encoder turns a depth sample into a separation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Flat linear disparity, no occlusion test. Legacy simplified form.
    Linear,
    /// Perspective foreshortening plus hidden-surface removal: pairs whose
    /// viewing ray is blocked by nearer geometry are never linked.
    PerspectiveWithOcclusion,
}

/// Texture-tiled stereogram encoder.
///
/// The pattern image repeats across the output via modulo indexing; it may
/// be any size. The default projection performs hidden-surface removal —
/// without it, stereograms of occluding geometry let the background bleed
/// through the foreground.
pub struct TextureEncoder {
    pub params: EyeSeparation,
    pub projection: Projection,
}

impl Default for TextureEncoder {
    fn default() -> Self {
        Self {
            params: EyeSeparation::default(),
            projection: Projection::PerspectiveWithOcclusion,
        }
    }
}

impl TextureEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: EyeSeparation) -> Self {
        self.params = params;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn encode(&self, depth: &GrayImage, pattern: &RgbImage) -> Result<RgbImage> {
        if is_empty(depth) {
            return Err(CodecError::MissingInput("depth map"));
        }
        if is_empty(pattern) {
            return Err(CodecError::MissingInput("pattern image"));
        }

        let width = depth.width() as usize;
        let height = depth.height() as usize;
        let tex_w = pattern.width() as usize;
        let tex_h = pattern.height() as usize;
        let params = self.params;
        let projection = self.projection;
        debug!(
            "texture encode {}x{} ({:?}, eye_sep {})",
            width, height, projection, params.eye_sep
        );

        let depth_data = depth.as_raw();
        let pattern_data = pattern.as_raw();
        let mut out = RgbImage::new(depth.width(), depth.height());

        out.par_chunks_mut(width * 3)
            .enumerate()
            .for_each_init(
                || RowLinks::new(width),
                |links, (y, row)| {
                    links.reset();
                    let depth_row = &depth_data[y * width..(y + 1) * width];

                    match projection {
                        Projection::Linear => link_row_linear(links, depth_row, params),
                        Projection::PerspectiveWithOcclusion => {
                            link_row_perspective(links, depth_row, params.eye_sep)
                        }
                    }

                    // Tile the pattern at the class root, not at x, so fused
                    // columns repeat the same texture pixel.
                    let pat_y = y % tex_h;
                    for x in 0..width {
                        let pat_x = links.find(x) % tex_w;
                        let src = (pat_y * tex_w + pat_x) * 3;
                        row[x * 3..x * 3 + 3].copy_from_slice(&pattern_data[src..src + 3]);
                    }
                },
            );

        Ok(out)
    }
}

fn link_row_linear(links: &mut RowLinks, depth_row: &[u8], params: EyeSeparation) {
    let width = depth_row.len() as i32;
    for (x, &z) in depth_row.iter().enumerate() {
        let separation = params.linear_separation(z);
        let left = x as i32 - separation / 2;
        let right = left + separation;
        if left >= 0 && right < width {
            links.union(left as usize, right as usize);
        }
    }
}

fn link_row_perspective(links: &mut RowLinks, depth_row: &[u8], eye_sep: i32) {
    let width = depth_row.len() as i32;
    for (x, &z) in depth_row.iter().enumerate() {
        let z = z as f64 / 255.0;
        let separation = ((1.0 - MU * z) * eye_sep as f64 / (2.0 - MU * z)).round() as i32;
        let left = x as i32 - separation / 2;
        let right = left + separation;
        if left >= 0 && right < width && ray_visible(depth_row, x, z, eye_sep) {
            links.union(left as usize, right as usize);
        }
    }
}

/// Walk outward from `x`, comparing the depth implied by the viewing ray at
/// offset `t` against the sampled surface. Any nearer sample occludes the
/// ray. The walk ends once the ray depth reaches the far plane (`z_t >= 1`)
/// or leaves the scanline.
fn ray_visible(depth_row: &[u8], x: usize, z: f64, eye_sep: i32) -> bool {
    let width = depth_row.len() as i32;
    let mut t = 1i32;
    loop {
        let zt = z + 2.0 * (2.0 - MU * z) * t as f64 / (MU * eye_sep as f64);

        let left = x as i32 - t;
        if left >= 0 && depth_row[left as usize] as f64 / 255.0 > zt {
            return false;
        }
        let right = x as i32 + t;
        if right < width && depth_row[right as usize] as f64 / 255.0 > zt {
            return false;
        }

        if zt >= 1.0 || t >= width {
            return true;
        }
        t += 1;
    }
}
