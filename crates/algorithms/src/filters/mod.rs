//! Smoothing filters and automatic thresholding
//!
//! - **Gaussian blur**: separable smoothing with odd kernel sizes
//! - **Otsu**: global threshold minimising intra-class variance

mod gaussian;
mod otsu;

pub use gaussian::{gaussian_blur, gaussian_kernel, GaussianBlur, GaussianParams};
pub use otsu::{otsu_binarize, otsu_threshold, Otsu};
