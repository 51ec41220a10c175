//! Morphological erosion (minimum filter)
//!
//! Replaces each pixel with the minimum value in its structuring element
//! neighborhood. Shrinks bright regions and enlarges dark regions.

use crate::maybe_rayon::*;
use cellfeat_core::{Algorithm, Error, GrayImage, Image, Result};
use ndarray::Array2;

use super::element::StructuringElement;

/// Parameters for morphological erosion
#[derive(Debug, Clone, PartialEq)]
pub struct ErodeParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Number of successive passes (0 leaves the image unchanged)
    pub iterations: usize,
}

impl Default for ErodeParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::default(),
            iterations: 1,
        }
    }
}

/// Erosion algorithm
#[derive(Debug, Clone, Default)]
pub struct Erode;

impl Algorithm for Erode {
    type Input = GrayImage;
    type Output = GrayImage;
    type Params = ErodeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Erode"
    }

    fn description(&self) -> &'static str {
        "Morphological erosion (minimum filter over structuring element)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        erode(&input, &params.element, params.iterations)
    }
}

/// Perform morphological erosion on an 8-bit image
///
/// Each output pixel is the minimum value within the structuring element
/// neighborhood. Neighbors falling outside the image are ignored, so the
/// border is not eaten away by the edge.
///
/// # Arguments
/// * `image` - Input image
/// * `element` - Structuring element defining the neighborhood shape
/// * `iterations` - Number of passes
pub fn erode(
    image: &GrayImage,
    element: &StructuringElement,
    iterations: usize,
) -> Result<GrayImage> {
    element.validate()?;
    let offsets = element.offsets();

    let mut current = image.clone();
    for _ in 0..iterations {
        current = extremum_pass(&current, &offsets, u8::MAX, |a, b| a.min(b))?;
    }
    Ok(current)
}

/// One pass of a min/max filter over `offsets`, skipping out-of-image cells.
///
/// `identity` is the value a pixel keeps when no neighbor is in bounds.
pub(super) fn extremum_pass<F>(
    image: &GrayImage,
    offsets: &[(isize, isize)],
    identity: u8,
    pick: F,
) -> Result<GrayImage>
where
    F: Fn(u8, u8) -> u8 + Sync + Send,
{
    let (rows, cols) = image.shape();
    let src = image.data();

    let output_data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![identity; cols];
            let r = row as isize;

            for (col, out) in row_data.iter_mut().enumerate() {
                let c = col as isize;
                let mut acc = identity;
                for &(dr, dc) in offsets {
                    let nr = r + dr;
                    let nc = c + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    acc = pick(acc, src[(nr as usize, nc as usize)]);
                }
                *out = acc;
            }

            row_data
        })
        .collect();

    let data =
        Array2::from_shape_vec((rows, cols), output_data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(Image::from_array(data))
}
