//! Morphological dilation (maximum filter)
//!
//! Replaces each pixel with the maximum value in its structuring element
//! neighborhood. Expands bright regions and shrinks dark regions.

use cellfeat_core::{Algorithm, Error, GrayImage, Result};

use super::element::StructuringElement;
use super::erode::extremum_pass;

/// Parameters for morphological dilation
#[derive(Debug, Clone, PartialEq)]
pub struct DilateParams {
    /// Structuring element shape
    pub element: StructuringElement,
    /// Number of successive passes (0 leaves the image unchanged)
    pub iterations: usize,
}

impl Default for DilateParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::default(),
            iterations: 1,
        }
    }
}

/// Dilation algorithm
#[derive(Debug, Clone, Default)]
pub struct Dilate;

impl Algorithm for Dilate {
    type Input = GrayImage;
    type Output = GrayImage;
    type Params = DilateParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dilate"
    }

    fn description(&self) -> &'static str {
        "Morphological dilation (maximum filter over structuring element)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dilate(&input, &params.element, params.iterations)
    }
}

/// Perform morphological dilation on an 8-bit image
///
/// Each output pixel is the maximum value within the structuring element
/// neighborhood. Neighbors falling outside the image are ignored.
///
/// The element is used as given, not reflected through its anchor, so an
/// asymmetric element looks at the same neighbors erosion does.
///
/// # Arguments
/// * `image` - Input image
/// * `element` - Structuring element defining the neighborhood shape
/// * `iterations` - Number of passes
pub fn dilate(
    image: &GrayImage,
    element: &StructuringElement,
    iterations: usize,
) -> Result<GrayImage> {
    element.validate()?;
    let offsets = element.offsets();

    let mut current = image.clone();
    for _ in 0..iterations {
        current = extremum_pass(&current, &offsets, u8::MIN, |a, b| a.max(b))?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellfeat_core::Image;

    #[test]
    fn test_dilate_uniform() {
        let img: GrayImage = Image::filled(7, 7, 5);
        let result = dilate(&img, &StructuringElement::square(3), 1).unwrap();
        assert!(result.data().iter().all(|&v| v == 5));
    }

    #[test]
    fn test_dilate_picks_maximum() {
        let mut img: GrayImage = Image::filled(7, 7, 3);
        img.set(3, 4, 20).unwrap();

        let result = dilate(&img, &StructuringElement::square(3), 1).unwrap();
        assert_eq!(result.get(3, 3).unwrap(), 20);
        assert_eq!(result.get(3, 1).unwrap(), 3);
    }

    #[test]
    fn test_dilate_grows_point() {
        let mut img: GrayImage = Image::new(9, 9);
        img.set(4, 4, 255).unwrap();

        let once = dilate(&img, &StructuringElement::square(3), 1).unwrap();
        assert_eq!(once.data().iter().filter(|&&v| v == 255).count(), 9);

        let thrice = dilate(&img, &StructuringElement::square(3), 3).unwrap();
        assert_eq!(thrice.data().iter().filter(|&&v| v == 255).count(), 49);
    }

    #[test]
    fn test_dilate_clipped_at_border() {
        let mut img: GrayImage = Image::new(5, 5);
        img.set(0, 0, 255).unwrap();
        let result = dilate(&img, &StructuringElement::square(3), 1).unwrap();
        assert_eq!(result.data().iter().filter(|&&v| v == 255).count(), 4);
    }

    #[test]
    fn test_dilate_asymmetric_element() {
        // Anchor at column 1 of a 1x2 element: neighbors are (0,-1) and (0,0)
        let se = StructuringElement::Rect { width: 2, height: 1 };
        let mut img: GrayImage = Image::new(1, 5);
        img.set(0, 2, 255).unwrap();
        let result = dilate(&img, &se, 1).unwrap();
        assert_eq!(result.get(0, 1).unwrap(), 0);
        assert_eq!(result.get(0, 2).unwrap(), 255);
        assert_eq!(result.get(0, 3).unwrap(), 255);
    }

    #[test]
    fn test_dilate_zero_iterations_identity() {
        let mut img: GrayImage = Image::new(5, 5);
        img.set(2, 2, 9).unwrap();
        let result = dilate(&img, &StructuringElement::Disk(1), 0).unwrap();
        assert_eq!(result, img);
    }
}
