//! Morphological opening (erosion followed by dilation)
//!
//! Removes small bright features (noise, spikes) while preserving
//! the overall shape and size of larger bright regions.

use cellfeat_core::{Algorithm, Error, GrayImage, Result};

use super::dilate::dilate;
use super::element::StructuringElement;
use super::erode::erode;

/// Parameters for morphological opening
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Erosion and dilation pass count
    pub iterations: usize,
}

impl Default for OpeningParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::default(),
            iterations: 1,
        }
    }
}

/// Opening algorithm
#[derive(Debug, Clone, Default)]
pub struct Opening;

impl Algorithm for Opening {
    type Input = GrayImage;
    type Output = GrayImage;
    type Params = OpeningParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Opening"
    }

    fn description(&self) -> &'static str {
        "Morphological opening (erosion then dilation) to remove small bright features"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        opening(&input, &params.element, params.iterations)
    }
}

/// Perform morphological opening on an 8-bit image
///
/// With `iterations = n` the image is eroded `n` times and then dilated
/// `n` times, so features that do not survive `n` erosions are removed.
///
/// # Arguments
/// * `image` - Input image
/// * `element` - Structuring element defining the neighborhood shape
/// * `iterations` - Pass count for each of the two phases
pub fn opening(
    image: &GrayImage,
    element: &StructuringElement,
    iterations: usize,
) -> Result<GrayImage> {
    let eroded = erode(image, element, iterations)?;
    dilate(&eroded, element, iterations)
}
