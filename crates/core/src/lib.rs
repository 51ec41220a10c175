//! # cellfeat core
//!
//! Core types, traits and I/O for cell-image feature extraction.
//!
//! This crate provides:
//! - `Image<T>`: generic single-channel image grid
//! - `MultiChannelImage`: interleaved 8-bit channels as decoded from files
//! - `Mask`: validated two-level region-of-interest mask
//! - `FeatureExtractor`: the fit/transform contract every extractor follows
//! - I/O for image files, feature tables and dataset manifests

pub mod error;
pub mod features;
pub mod image;
pub mod io;

pub use error::{Error, Result};
pub use features::{hstack, stack_rows, FeatureMatrix};
pub use crate::image::{GrayImage, Image, Mask, MultiChannelImage, PixelElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::features::{hstack, FeatureMatrix};
    pub use crate::image::{GrayImage, Image, Mask, MultiChannelImage, PixelElement};
    pub use crate::{Algorithm, FeatureExtractor};
}

/// Core trait for single-image operations.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

/// Uniform contract of every feature extractor: ordered single-channel
/// images in, a `(n_images, n_features)` matrix out.
///
/// `n_features` depends only on construction parameters, so every image in
/// a batch yields an equal-length row. Extractors that need corpus-wide
/// setup (codebooks, learned bases) do it in `fit`; the rest keep the
/// default no-op.
pub trait FeatureExtractor: Send + Sync {
    /// Short identifier used in logs and column headers
    fn name(&self) -> &'static str;

    /// Number of columns `transform` produces
    fn n_features(&self) -> usize;

    /// Column names, `name_0 .. name_{n-1}` unless overridden
    fn feature_names(&self) -> Vec<String> {
        (0..self.n_features())
            .map(|i| format!("{}_{}", self.name(), i))
            .collect()
    }

    /// Corpus-wide setup
    fn fit(&mut self, images: &[GrayImage], labels: Option<&[usize]>) -> Result<()> {
        if let Some(labels) = labels {
            if labels.len() != images.len() {
                return Err(Error::LengthMismatch {
                    what: "labels",
                    expected: images.len(),
                    actual: labels.len(),
                });
            }
        }
        Ok(())
    }

    /// Extract one feature row per image, in input order
    fn transform(&self, images: &[GrayImage]) -> Result<FeatureMatrix>;

    /// `fit` followed by `transform` on the same images
    fn fit_transform(
        &mut self,
        images: &[GrayImage],
        labels: Option<&[usize]>,
    ) -> Result<FeatureMatrix> {
        self.fit(images, labels)?;
        self.transform(images)
    }
}
