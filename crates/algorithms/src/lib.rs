//! # cellfeat algorithms
//!
//! ROI isolation and feature extraction for microscopic cell images.
//!
//! ## Available Algorithm Categories
//!
//! - **filters**: Gaussian smoothing, Otsu thresholding
//! - **morphology**: Erosion, dilation, opening
//! - **preprocess**: Channel split, ROI builder, intensity normalization
//! - **texture**: GLCM and Haralick features
//! - **intensity**: First-order statistics and mass displacement
//! - **wavelet**: Stationary wavelet transform, block DCT, SWT-DCT features
//! - **pipeline**: Preprocessing state and extractor concatenation
//! - **config**: TOML pipeline configuration

pub(crate) mod maybe_rayon;

pub mod batch;
pub mod config;
pub mod filters;
pub mod intensity;
pub mod morphology;
pub mod pipeline;
pub mod preprocess;
pub mod texture;
pub mod wavelet;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::ExecutionMode;
    pub use crate::config::PipelineConfig;
    pub use crate::filters::{gaussian_blur, otsu_binarize, otsu_threshold, GaussianParams};
    pub use crate::intensity::{mass_displacement, IntensityExtractor};
    pub use crate::morphology::{dilate, erode, opening, StructuringElement};
    pub use crate::pipeline::{
        FeaturePipeline, NormalizeSource, PreprocessParams, PreprocessState, Preprocessor,
    };
    pub use crate::preprocess::{
        build_roi, build_roi_batch, extract_channel, normalize_batch, split_batch, Channel,
        ChannelOrder, NormalizationPolicy, NormalizeParams, RoiParams, RoiSource, SplitParams,
        WorkingChannel,
    };
    pub use crate::texture::{haralick, HaralickExtractor, HaralickParams};
    pub use crate::wavelet::{swt2, swt_dct_features, SwtDctExtractor, SwtDctParams, Wavelet};
    pub use cellfeat_core::prelude::*;
}
