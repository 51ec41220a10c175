//! Two-level foreground/background masks

use crate::error::{Error, Result};
use crate::image::GrayImage;

/// Stored value of foreground pixels
pub const FOREGROUND: u8 = 255;
/// Stored value of background pixels
pub const BACKGROUND: u8 = 0;

/// A binary region-of-interest mask.
///
/// Always stored as [`BACKGROUND`]/[`FOREGROUND`]. Construction from an
/// arbitrary image validates that it carries at most two distinct levels.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    /// Build a mask from a two-level image.
    ///
    /// With two distinct levels the lower one becomes background and the
    /// higher one foreground. A single-level image becomes all background
    /// when that level is zero and all foreground otherwise. More than two
    /// levels is a [`Error::Shape`] error.
    pub fn from_image(image: &GrayImage) -> Result<Self> {
        let levels = distinct_levels(image);
        let foreground_from = match levels.as_slice() {
            [] => u16::MAX,
            [only] if *only == 0 => u16::MAX,
            [_only] => 0,
            [_low, high] => *high as u16,
            more => {
                return Err(Error::Shape(format!(
                    "mask must have at most two distinct values, found {}",
                    more.len()
                )))
            }
        };

        Ok(Self {
            image: image.map(|v| {
                if v as u16 >= foreground_from {
                    FOREGROUND
                } else {
                    BACKGROUND
                }
            }),
        })
    }

    /// Wrap an image already known to hold only 0 / 255.
    pub(crate) fn from_binary_unchecked(image: GrayImage) -> Self {
        Self { image }
    }

    /// Build a mask from a predicate evaluated at every pixel.
    pub fn from_fn<F: Fn(usize, usize) -> bool>(rows: usize, cols: usize, f: F) -> Self {
        let data = ndarray::Array2::from_shape_fn((rows, cols), |(r, c)| {
            if f(r, c) {
                FOREGROUND
            } else {
                BACKGROUND
            }
        });
        Self::from_binary_unchecked(GrayImage::from_array(data))
    }

    /// Binarize: pixels strictly greater than `threshold` become foreground.
    pub fn from_threshold(image: &GrayImage, threshold: u8) -> Self {
        Self::from_binary_unchecked(image.map(|v| {
            if v > threshold {
                FOREGROUND
            } else {
                BACKGROUND
            }
        }))
    }

    /// Fail unless both foreground and background are present.
    pub fn require_two_levels(&self) -> Result<()> {
        let fg = self.foreground_count();
        if fg == 0 || fg == self.image.len() {
            return Err(Error::Shape(
                "mask is not binary: only one distinct value present".into(),
            ));
        }
        Ok(())
    }

    /// The mask as a 0/255 image
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Consume the mask, returning the 0/255 image
    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.image.shape()
    }

    /// Whether (row, col) belongs to the region of interest
    pub fn is_foreground(&self, row: usize, col: usize) -> bool {
        self.image.data()[(row, col)] != BACKGROUND
    }

    /// Number of foreground pixels
    pub fn foreground_count(&self) -> usize {
        self.image.data().iter().filter(|&&v| v != BACKGROUND).count()
    }
}

/// Sorted distinct values of an 8-bit image
pub fn distinct_levels(image: &GrayImage) -> Vec<u8> {
    let mut seen = [false; 256];
    for &v in image.data().iter() {
        seen[v as usize] = true;
    }
    (0..=255u8).filter(|&v| seen[v as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;

    #[test]
    fn test_two_levels_mapped() {
        let img = Image::from_vec(vec![3, 7, 7, 3], 2, 2).unwrap();
        let mask = Mask::from_image(&img).unwrap();
        assert_eq!(mask.image().data().as_slice().unwrap(), &[0, 255, 255, 0]);
        assert_eq!(mask.foreground_count(), 2);
        assert!(mask.require_two_levels().is_ok());
    }

    #[test]
    fn test_three_levels_rejected() {
        let img = Image::from_vec(vec![0, 1, 2, 0], 2, 2).unwrap();
        assert!(matches!(Mask::from_image(&img), Err(Error::Shape(_))));
    }

    #[test]
    fn test_single_level() {
        let zeros: GrayImage = Image::new(2, 2);
        let m = Mask::from_image(&zeros).unwrap();
        assert_eq!(m.foreground_count(), 0);
        assert!(m.require_two_levels().is_err());

        let ones: GrayImage = Image::filled(2, 2, 9);
        let m = Mask::from_image(&ones).unwrap();
        assert_eq!(m.foreground_count(), 4);
        assert!(m.require_two_levels().is_err());
    }

    #[test]
    fn test_from_threshold() {
        let img = Image::from_vec(vec![10, 50, 51, 200], 2, 2).unwrap();
        let m = Mask::from_threshold(&img, 50);
        assert_eq!(m.image().data().as_slice().unwrap(), &[0, 0, 255, 255]);
    }

    #[test]
    fn test_distinct_levels() {
        let img = Image::from_vec(vec![5, 1, 5, 9], 2, 2).unwrap();
        assert_eq!(distinct_levels(&img), vec![1, 5, 9]);
    }
}
