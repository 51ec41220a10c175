//! Texture features
//!
//! - **GLCM**: symmetric gray-level co-occurrence matrices in four directions
//! - **Haralick**: 13 statistics per matrix, 52 per distance

mod glcm;
mod haralick;

pub use glcm::{Direction, Glcm, DIRECTIONS};
pub use haralick::{
    haralick, haralick_features, HaralickExtractor, HaralickParams, HARALICK_FEATURES,
    HARALICK_NAMES,
};
