//! Region-of-interest isolation
//!
//! The mask-source plane is smoothed, thresholded with Otsu's method and
//! cleaned with an opening followed by a dilation. The resulting mask is
//! applied to the working plane, zeroing everything outside it.

use cellfeat_core::{Algorithm, Error, GrayImage, Mask, Result};
use tracing::{debug, trace};

use crate::batch::{ensure_paired, ExecutionMode};
use crate::filters::{gaussian_blur, otsu_binarize, GaussianParams};
use crate::morphology::{dilate, opening, StructuringElement};

/// Parameters for the ROI builder
#[derive(Debug, Clone, PartialEq)]
pub struct RoiParams {
    /// Smoothing applied to the mask source before thresholding
    pub blur: GaussianParams,
    /// Kernel shared by the opening and the dilation
    pub element: StructuringElement,
    /// Opening passes (noise removal)
    pub open_iterations: usize,
    /// Dilation passes (boundary recovery)
    pub dilate_iterations: usize,
}

impl Default for RoiParams {
    fn default() -> Self {
        Self {
            blur: GaussianParams::default(),
            element: StructuringElement::default(),
            open_iterations: 2,
            dilate_iterations: 3,
        }
    }
}

impl RoiParams {
    /// Validate kernel sizes and the structuring element
    pub fn validate(&self) -> Result<()> {
        self.blur.validate()?;
        self.element.validate()
    }
}

/// ROI builder algorithm over one (working, mask source) pair
#[derive(Debug, Clone, Default)]
pub struct RoiBuilder;

impl Algorithm for RoiBuilder {
    type Input = (GrayImage, GrayImage);
    type Output = (Mask, GrayImage);
    type Params = RoiParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "RoiBuilder"
    }

    fn description(&self) -> &'static str {
        "Otsu mask with morphological cleanup, applied to the working image"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        params.validate()?;
        build_roi(&input.0, &input.1, &params)
    }
}

/// Masks and masked working images of a batch, in input order
#[derive(Debug, Clone, Default)]
pub struct RoiBatch {
    pub masks: Vec<Mask>,
    pub masked: Vec<GrayImage>,
}

/// Open then dilate a mask. Zero iterations of both leaves it unchanged.
pub fn refine_mask(
    mask: &Mask,
    element: &StructuringElement,
    open_iterations: usize,
    dilate_iterations: usize,
) -> Result<Mask> {
    let opened = opening(mask.image(), element, open_iterations)?;
    let grown = dilate(&opened, element, dilate_iterations)?;
    // Morphology on a 0/255 image stays 0/255
    Ok(Mask::from_threshold(&grown, 0))
}

/// Derive the mask from `mask_source` and apply it to `working`
///
/// # Arguments
/// * `working` - Image whose ROI pixels are kept
/// * `mask_source` - Image thresholded into the mask
/// * `params` - Blur, kernel and iteration settings
pub fn build_roi(
    working: &GrayImage,
    mask_source: &GrayImage,
    params: &RoiParams,
) -> Result<(Mask, GrayImage)> {
    working.ensure_same_shape(mask_source)?;

    let blurred = gaussian_blur(mask_source, &params.blur)?;
    let (binary, threshold) = otsu_binarize(&blurred);
    trace!("Otsu threshold {}", threshold);

    let mask = refine_mask(
        &binary,
        &params.element,
        params.open_iterations,
        params.dilate_iterations,
    )?;
    let masked = working.masked(&mask)?;
    Ok((mask, masked))
}

/// Build the ROI of every pair in a batch
pub fn build_roi_batch(
    working: &[GrayImage],
    mask_source: &[GrayImage],
    params: &RoiParams,
    mode: ExecutionMode,
) -> Result<RoiBatch> {
    ensure_paired("mask_source", working.len(), mask_source.len())?;
    params.validate()?;

    debug!("Building ROI masks for {} images", working.len());
    let pairs = mode.try_map(working.len(), |i| {
        build_roi(&working[i], &mask_source[i], params)
    })?;
    let (masks, masked) = pairs.into_iter().unzip();
    Ok(RoiBatch { masks, masked })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellfeat_core::image::distinct_levels;
    use cellfeat_core::Image;

    /// Bright disk of radius `radius` centered in a dark field, plus one speck
    fn cell(size: usize, radius: f64) -> GrayImage {
        let center = (size as f64 - 1.0) / 2.0;
        let mut img = Image::filled(size, size, 15u8);
        for r in 0..size {
            for c in 0..size {
                let d = ((r as f64 - center).powi(2) + (c as f64 - center).powi(2)).sqrt();
                if d <= radius {
                    img.set(r, c, 210).unwrap();
                }
            }
        }
        img
    }

    #[test]
    fn test_roi_finds_cell() {
        let mask_src = cell(32, 8.0);
        let working: GrayImage = Image::filled(32, 32, 77);
        let (mask, masked) = build_roi(&working, &mask_src, &RoiParams::default()).unwrap();

        assert_eq!(distinct_levels(mask.image()), vec![0, 255]);
        assert!(mask.is_foreground(16, 16));
        assert!(!mask.is_foreground(0, 0));
        assert_eq!(masked.get(16, 16).unwrap(), 77);
        assert_eq!(masked.get(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_dilation_grows_beyond_cell() {
        let mask_src = cell(40, 6.0);
        let working: GrayImage = Image::filled(40, 40, 1);
        let raw = Mask::from_threshold(&mask_src, 100).foreground_count();
        let (mask, _) = build_roi(&working, &mask_src, &RoiParams::default()).unwrap();
        assert!(mask.foreground_count() > raw);
    }

    #[test]
    fn test_refine_zero_iterations_idempotent() {
        let mask_src = cell(24, 5.0);
        let working: GrayImage = Image::filled(24, 24, 9);
        let (mask, _) = build_roi(&working, &mask_src, &RoiParams::default()).unwrap();
        let again = refine_mask(&mask, &StructuringElement::default(), 0, 0).unwrap();
        assert_eq!(again, mask);
    }

    #[test]
    fn test_speck_removed() {
        let mut mask_src = cell(32, 7.0);
        mask_src.set(1, 30, 255).unwrap();
        let working: GrayImage = Image::filled(32, 32, 50);
        let params = RoiParams {
            dilate_iterations: 0,
            ..Default::default()
        };
        let (mask, _) = build_roi(&working, &mask_src, &params).unwrap();
        assert!(!mask.is_foreground(1, 30));
    }

    #[test]
    fn test_shape_mismatch() {
        let a: GrayImage = Image::new(8, 8);
        let b: GrayImage = Image::new(8, 9);
        assert!(matches!(
            build_roi(&a, &b, &RoiParams::default()),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_batch_length_mismatch() {
        let working = vec![Image::new(4, 4), Image::new(4, 4)];
        let source = vec![Image::new(4, 4)];
        let result = build_roi_batch(&working, &source, &RoiParams::default(), ExecutionMode::Sequential);
        assert!(matches!(result, Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn test_even_blur_kernel_rejected() {
        let working = vec![Image::new(4, 4)];
        let source = vec![Image::new(4, 4)];
        let params = RoiParams {
            blur: GaussianParams::square(4),
            ..Default::default()
        };
        let result = build_roi_batch(&working, &source, &params, ExecutionMode::Parallel);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_batch_order() {
        let sources = vec![cell(20, 3.0), cell(20, 7.0)];
        let working = vec![Image::filled(20, 20, 5u8), Image::filled(20, 20, 6u8)];
        let batch =
            build_roi_batch(&working, &sources, &RoiParams::default(), ExecutionMode::Parallel)
                .unwrap();
        assert_eq!(batch.masks.len(), 2);
        assert!(batch.masks[0].foreground_count() < batch.masks[1].foreground_count());
        assert_eq!(batch.masked[1].get(10, 10).unwrap(), 6);
    }
}
