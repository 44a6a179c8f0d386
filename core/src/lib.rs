pub mod image;
pub mod runtime;

pub use image::*;
pub use runtime::*;
