//! Image-processing primitives for the stereogram codec
//!
//! Box blur over floating-point cost planes, median filtering, histogram
//! equalization and min/max normalization. All routines operate on in-memory
//! pixel grids and are row-parallel where that pays off.

pub mod blur;
pub mod histogram;
pub mod median;

pub use blur::*;
pub use histogram::*;
pub use median::*;

pub type Result<T> = std::result::Result<T, ImgprocError>;

#[derive(Debug, thiserror::Error)]
pub enum ImgprocError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Algorithm error: {0}")]
    AlgorithmError(String),
}

pub fn validate_plane_size(len: usize, width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ImgprocError::DimensionMismatch(
            "plane dimensions must be non-zero".into(),
        ));
    }
    if len != width * height {
        return Err(ImgprocError::DimensionMismatch(format!(
            "plane of {len} samples cannot be {width}x{height}"
        )));
    }
    Ok(())
}
