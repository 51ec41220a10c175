//! Intensity statistics and centroid displacement
//!
//! - **moments**: raw moments, binary and intensity-weighted centroids
//! - **measure**: per-image mean/std/min/max plus mass displacement

mod measure;
mod moments;

pub use measure::{intensity_features, IntensityExtractor};
pub use moments::{binary_centroid, gray_centroid, mass_displacement, Centroid, Moments};
