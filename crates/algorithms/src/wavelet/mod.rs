//! Wavelet-domain features
//!
//! - **filters**: Haar and Daubechies decomposition filters
//! - **swt**: multi-level 2-D stationary wavelet transform
//! - **dct**: orthonormal 8x8 block DCT-II
//! - **extractor**: SWT detail planes summarized by block DC coefficients

mod dct;
mod extractor;
mod filters;
mod swt;

pub use dct::{block_dc, block_dct2, Dct8, BLOCK};
pub use extractor::{swt_dct_features, SwtDctExtractor, SwtDctParams, COEFFS_PER_PLANE};
pub use filters::Wavelet;
pub use swt::{check_swt_shape, swt2, DetailBands, Swt2};
