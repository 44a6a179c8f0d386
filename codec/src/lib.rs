//! Autostereogram codec
//!
//! Forward transform: a grayscale depth map (255 = nearest) becomes a
//! "magic-eye" stereogram, either from per-call random noise or from a tiled
//! pattern image with hidden-surface removal. Inverse transform: an existing
//! stereogram is searched for its repeating-pattern disparity and an
//! approximate depth map is recovered.
//!
//! All transforms are pure pixel-grid-in/pixel-grid-out functions; callers
//! own loading and persisting the rasters.

use image::{GrayImage, RgbImage};
use log::warn;

pub mod block_match;
pub mod random_dot;
pub mod scanline;
pub mod sgm;
pub mod texture;

pub use block_match::*;
pub use random_dot::*;
pub use scanline::*;
pub use sgm::*;
pub use texture::*;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    #[error("Stereogram is empty or unreadable")]
    EmptyStereogram,

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Disparity-controlling parameters, passed by value into every encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeSeparation {
    /// Maximum horizontal disparity in pixels; models the distance between
    /// the viewer's eyes.
    pub eye_sep: i32,
    /// How many pixels of shift the nearest plane (depth 255) earns.
    pub focal_len: i32,
}

impl Default for EyeSeparation {
    fn default() -> Self {
        Self {
            eye_sep: 130,
            focal_len: 30,
        }
    }
}

impl EyeSeparation {
    pub fn new(eye_sep: i32, focal_len: i32) -> Self {
        Self { eye_sep, focal_len }
    }

    /// Linear separation for a depth sample: `eye_sep - z * focal_len / 255`.
    ///
    /// Integer floor division, matching the legacy semantics exactly.
    pub fn linear_separation(&self, z: u8) -> i32 {
        self.eye_sep - (z as i32 * self.focal_len / 255)
    }
}

/// Decoder search window over candidate disparities.
///
/// Both decoders scan `[max(1, eye_sep - max_depth), eye_sep]`. Degenerate
/// parameter combinations clamp rather than error: the lower bound stays at
/// least 1, the upper bound fits the `u8` best-disparity store, and the
/// depth-scaling divisor never collapses to zero.
#[derive(Debug, Clone, Copy)]
pub struct DisparitySearch {
    pub min: i32,
    pub max: i32,
}

impl DisparitySearch {
    pub fn from_params(eye_sep: i32, max_depth: i32) -> Self {
        if eye_sep - max_depth < 1 {
            warn!(
                "disparity search floor clamped to 1 (eye_sep {} - max_depth {})",
                eye_sep, max_depth
            );
        }
        if eye_sep > u8::MAX as i32 {
            warn!("eye_sep {} exceeds the 255-pixel search ceiling", eye_sep);
        }
        Self {
            min: (eye_sep - max_depth).max(1),
            max: eye_sep.min(u8::MAX as i32),
        }
    }

    /// Number of candidate disparities; 0 when the window is inverted.
    pub fn count(&self) -> usize {
        (self.max - self.min + 1).max(0) as usize
    }

    /// Scaling divisor for disparity-to-depth mapping, clamped to >= 1.
    pub fn span(&self) -> i32 {
        (self.max - self.min).max(1)
    }

    /// Map a winning disparity to a depth sample: nearer surfaces repeat at
    /// shorter periods, so small disparities earn large depth values. A
    /// disparity of 0 means "no match found" and stays at depth 0.
    pub fn depth_value(&self, d: u8) -> u8 {
        if d == 0 {
            return 0;
        }
        (255 - (d as i32 - self.min) * 255 / self.span()).clamp(0, 255) as u8
    }
}

/// Depth estimation strategy over a stereogram. Picking an implementation is
/// a caller decision, never an internal heuristic.
pub trait DepthDecoder {
    fn decode(&self, stereogram: &RgbImage) -> Result<GrayImage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_separation_floor_division() {
        let params = EyeSeparation::new(130, 30);
        // depth 0 -> full eye separation, exactly.
        assert_eq!(params.linear_separation(0), 130);
        // depth 255 -> eye_sep - focal_len, exactly.
        assert_eq!(params.linear_separation(255), 100);
        // 100 * 30 / 255 = 11.76.. truncates to 11, never rounds to 12.
        assert_eq!(params.linear_separation(100), 119);
    }

    #[test]
    fn test_search_window_defaults() {
        let search = DisparitySearch::from_params(130, 50);
        assert_eq!(search.min, 80);
        assert_eq!(search.max, 130);
        assert_eq!(search.count(), 51);
    }

    #[test]
    fn test_search_window_clamps_degenerate_range() {
        let search = DisparitySearch::from_params(10, 50);
        assert_eq!(search.min, 1);
        assert_eq!(search.max, 10);
        assert!(search.span() >= 1);

        let inverted = DisparitySearch::from_params(0, 0);
        assert_eq!(inverted.count(), 0);
        assert!(inverted.span() >= 1);
    }

    #[test]
    fn test_depth_value_endpoints() {
        let search = DisparitySearch::from_params(130, 50);
        assert_eq!(search.depth_value(0), 0);
        assert_eq!(search.depth_value(80), 255);
        assert_eq!(search.depth_value(130), 0);
    }
}
