use crate::scanline::RowLinks;
use crate::{CodecError, EyeSeparation, Result};
use image::{GrayImage, RgbImage};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use sirds_core::is_empty;

/// Random-dot stereogram encoder.
///
/// Every encode call draws a fresh noise base — repeated encodes of the same
/// depth map intentionally produce different dot patterns. Threading a seed
/// through makes the output reproducible; seeded rows draw from independent
/// per-row streams so the parallel schedule cannot perturb the result.
pub struct RandomDotEncoder {
    pub params: EyeSeparation,
    pub seed: Option<u64>,
}

impl Default for RandomDotEncoder {
    fn default() -> Self {
        Self {
            params: EyeSeparation::default(),
            seed: None,
        }
    }
}

impl RandomDotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: EyeSeparation) -> Self {
        self.params = params;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Synthesize a stereogram of the depth map's exact dimensions.
    ///
    /// Per scanline: link every column pair `(x - s/2, x + s/2)` whose linear
    /// separation `s` derives from the depth sample, then paint each column
    /// with the noise color of its class root.
    pub fn encode(&self, depth: &GrayImage) -> Result<RgbImage> {
        if is_empty(depth) {
            return Err(CodecError::MissingInput("depth map"));
        }

        let width = depth.width() as usize;
        let height = depth.height() as usize;
        let params = self.params;
        let seed = self.seed;
        debug!(
            "random-dot encode {}x{} (eye_sep {}, focal_len {})",
            width, height, params.eye_sep, params.focal_len
        );

        let depth_data = depth.as_raw();
        let mut out = RgbImage::new(depth.width(), depth.height());

        out.par_chunks_mut(width * 3)
            .enumerate()
            .for_each_init(
                || RowLinks::new(width),
                |links, (y, row)| {
                    links.reset();
                    let noise = noise_row(width, seed, y);
                    let depth_row = &depth_data[y * width..(y + 1) * width];

                    for x in 0..width {
                        let separation = params.linear_separation(depth_row[x]);
                        let left = x as i32 - separation / 2;
                        let right = x as i32 + separation / 2;
                        if left >= 0 && right < width as i32 {
                            let left = left as usize;
                            // No-op when the class already resolves at or
                            // below the left column.
                            if links.find(right as usize) > left {
                                links.union(left, right as usize);
                            }
                        }
                    }

                    for x in 0..width {
                        let root = links.find(x);
                        row[x * 3..x * 3 + 3].copy_from_slice(&noise[root]);
                    }
                },
            );

        Ok(out)
    }
}

/// Standalone image of independent random RGB triples, one per pixel.
pub fn random_dot_base(width: u32, height: u32) -> RgbImage {
    let mut rng = rand::thread_rng();
    let mut img = RgbImage::new(width, height);
    for px in img.iter_mut() {
        *px = rng.gen();
    }
    img
}

fn noise_row(width: usize, seed: Option<u64>, y: usize) -> Vec<[u8; 3]> {
    match seed {
        Some(s) => {
            let stream = s ^ (y as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            fill_noise(&mut StdRng::seed_from_u64(stream), width)
        }
        None => fill_noise(&mut rand::thread_rng(), width),
    }
}

fn fill_noise(rng: &mut impl Rng, width: usize) -> Vec<[u8; 3]> {
    (0..width).map(|_| rng.gen()).collect()
}
