//! Intensity normalization to the full 8-bit range
//!
//! All policies end in a linear min-max rescale onto [0, 255]. They differ
//! in which pixels set the range:
//! - `whole`: every pixel of the image
//! - `roi`: only the ROI pixels; the same linear map is then applied to the
//!   whole image, saturating at the range ends
//! - `roi_on_whole`: the image is first clipped to `mean ± k·std` of its ROI,
//!   then rescaled as in `whole`

use std::fmt;
use std::str::FromStr;

use cellfeat_core::image::PixelElement;
use cellfeat_core::{Error, GrayImage, Mask, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::batch::{ensure_paired, ExecutionMode};

/// Which pixels determine the rescale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationPolicy {
    #[default]
    Whole,
    Roi,
    RoiOnWhole,
}

impl fmt::Display for NormalizationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NormalizationPolicy::Whole => "whole",
            NormalizationPolicy::Roi => "roi",
            NormalizationPolicy::RoiOnWhole => "roi_on_whole",
        };
        f.write_str(s)
    }
}

impl FromStr for NormalizationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "whole" => Ok(NormalizationPolicy::Whole),
            "roi" => Ok(NormalizationPolicy::Roi),
            "roi_on_whole" => Ok(NormalizationPolicy::RoiOnWhole),
            _ => Err(Error::config(
                "policy",
                s,
                "expected one of whole, roi, roi_on_whole",
            )),
        }
    }
}

/// Parameters for normalization
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeParams {
    pub policy: NormalizationPolicy,
    /// Clip half-width in standard deviations (`roi_on_whole` only)
    pub offset: f64,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            policy: NormalizationPolicy::Whole,
            offset: 2.5,
        }
    }
}

impl NormalizeParams {
    pub fn validate(&self) -> Result<()> {
        if !self.offset.is_finite() || self.offset < 0.0 {
            return Err(Error::config(
                "offset",
                self.offset,
                "offset must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Where the ROI of each image comes from
#[derive(Debug, Clone, Copy)]
pub enum RoiSource<'a> {
    /// Explicit two-level masks
    Masks(&'a [Mask]),
    /// Previously masked images; their nonzero pixels form the ROI
    Masked(&'a [GrayImage]),
}

impl<'a> RoiSource<'a> {
    fn len(&self) -> usize {
        match self {
            RoiSource::Masks(m) => m.len(),
            RoiSource::Masked(m) => m.len(),
        }
    }
}

/// Borrowed ROI of a single image
#[derive(Debug, Clone, Copy)]
pub enum RoiRef<'a> {
    Mask(&'a Mask),
    Masked(&'a GrayImage),
}

/// Linear map `v -> v * scale + shift` sending [min, max] onto [0, 255].
///
/// A flat range gets scale 0 and maps everything to 0.
fn minmax_map(min: f64, max: f64) -> (f64, f64) {
    let scale = if max - min > f64::EPSILON {
        255.0 / (max - min)
    } else {
        0.0
    };
    (scale, -min * scale)
}

fn apply_map(image: &GrayImage, scale: f64, shift: f64) -> GrayImage {
    image.map(|v| u8::from_f64_saturating(v as f64 * scale + shift))
}

/// Min-max rescale using the range of the pixels selected by `mask`
/// (all pixels when `None`). The map is applied to every pixel.
pub fn minmax_rescale(image: &GrayImage, mask: Option<&Mask>) -> Result<GrayImage> {
    if image.is_empty() {
        return Ok(image.clone());
    }
    let stats = image.statistics(mask)?;
    let (scale, shift) = minmax_map(stats.min, stats.max);
    Ok(apply_map(image, scale, shift))
}

/// Clip to `[mean - k·std, mean + k·std]`, truncating the bounds to 8 bits
pub fn clip_around_mean(image: &GrayImage, mean: f64, std_dev: f64, offset: f64) -> GrayImage {
    let lo = mean - offset * std_dev;
    let hi = mean + offset * std_dev;
    // `as u8` truncates toward zero and saturates
    image.map(|v| (v as f64).clamp(lo, hi) as u8)
}

fn roi_mask(roi: RoiRef<'_>) -> Result<Mask> {
    match roi {
        RoiRef::Mask(m) => {
            m.require_two_levels()?;
            Ok(m.clone())
        }
        RoiRef::Masked(img) => Ok(Mask::from_threshold(img, 0)),
    }
}

/// Normalize one image under `params`
pub fn normalize_image(
    image: &GrayImage,
    params: &NormalizeParams,
    roi: Option<RoiRef<'_>>,
) -> Result<GrayImage> {
    match params.policy {
        NormalizationPolicy::Whole => minmax_rescale(image, None),
        NormalizationPolicy::Roi => {
            let mask = roi_mask(require_roi(roi, params.policy)?)?;
            minmax_rescale(image, Some(&mask))
        }
        NormalizationPolicy::RoiOnWhole => {
            params.validate()?;
            let roi = require_roi(roi, params.policy)?;
            let stats = match roi {
                RoiRef::Mask(m) => {
                    m.require_two_levels()?;
                    image.statistics(Some(m))?
                }
                RoiRef::Masked(masked) => {
                    image.ensure_same_shape(masked)?;
                    masked.statistics(Some(&Mask::from_threshold(masked, 0)))?
                }
            };
            let clipped = clip_around_mean(image, stats.mean, stats.std_dev, params.offset);
            minmax_rescale(&clipped, None)
        }
    }
}

fn require_roi(roi: Option<RoiRef<'_>>, policy: NormalizationPolicy) -> Result<RoiRef<'_>> {
    roi.ok_or_else(|| {
        Error::config(
            "masks",
            "none",
            format!("policy {} requires masks or masked images", policy),
        )
    })
}

/// Normalize every image of a batch, in input order
pub fn normalize_batch(
    images: &[GrayImage],
    params: &NormalizeParams,
    roi: Option<RoiSource<'_>>,
    mode: ExecutionMode,
) -> Result<Vec<GrayImage>> {
    params.validate()?;
    if let Some(source) = &roi {
        ensure_paired("masks", images.len(), source.len())?;
    }

    debug!(
        "Normalizing {} images (policy={}, offset={})",
        images.len(),
        params.policy,
        params.offset
    );
    mode.try_map(images.len(), |i| {
        let roi = roi.map(|source| match source {
            RoiSource::Masks(m) => RoiRef::Mask(&m[i]),
            RoiSource::Masked(m) => RoiRef::Masked(&m[i]),
        });
        normalize_image(&images[i], params, roi)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellfeat_core::Image;

    fn ramp(rows: usize, cols: usize, lo: u8, step: u8) -> GrayImage {
        let data = (0..rows * cols)
            .map(|i| lo.saturating_add((i as u8).saturating_mul(step)))
            .collect();
        Image::from_vec(data, rows, cols).unwrap()
    }

    fn whole() -> NormalizeParams {
        NormalizeParams::default()
    }

    #[test]
    fn test_whole_stretches_range() {
        let img = ramp(2, 3, 50, 10); // 50..100
        let out = normalize_image(&img, &whole(), None).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 0);
        assert_eq!(out.get(1, 2).unwrap(), 255);
        assert_eq!(out.get(0, 1).unwrap(), 51);
    }

    #[test]
    fn test_whole_idempotent() {
        let img = ramp(4, 4, 20, 7);
        let once = normalize_image(&img, &whole(), None).unwrap();
        let twice = normalize_image(&once, &whole(), None).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_flat_image_maps_to_zero() {
        let img: GrayImage = Image::filled(3, 3, 140);
        let out = normalize_image(&img, &whole(), None).unwrap();
        assert!(out.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_roi_policy_uses_roi_range() {
        // ROI holds 100 and 150; background 10 and 200 saturate
        let img = Image::from_vec(vec![10, 100, 150, 200], 2, 2).unwrap();
        let mask = Mask::from_fn(2, 2, |r, c| (r + c) == 1);
        let params = NormalizeParams {
            policy: NormalizationPolicy::Roi,
            ..Default::default()
        };
        let out = normalize_image(&img, &params, Some(RoiRef::Mask(&mask))).unwrap();
        assert_eq!(out.data().iter().copied().collect::<Vec<_>>(), vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_roi_policy_requires_binary_mask() {
        let img: GrayImage = Image::filled(2, 2, 5);
        let mask = Mask::from_fn(2, 2, |_, _| true);
        let params = NormalizeParams {
            policy: NormalizationPolicy::Roi,
            ..Default::default()
        };
        assert!(matches!(
            normalize_image(&img, &params, Some(RoiRef::Mask(&mask))),
            Err(Error::Shape(_))
        ));
        assert!(matches!(
            normalize_image(&img, &params, None),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_roi_on_whole_zero_offset() {
        let img = ramp(3, 3, 0, 20);
        let mask = Mask::from_fn(3, 3, |r, _| r == 0); // 0, 20, 40
        let params = NormalizeParams {
            policy: NormalizationPolicy::RoiOnWhole,
            offset: 0.0,
        };
        let out = normalize_image(&img, &params, Some(RoiRef::Mask(&mask))).unwrap();
        assert!(out.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_roi_on_whole_clips_outliers() {
        // ROI is a tight cluster around 100; the 250 outlier gets clipped
        let mut img: GrayImage = Image::filled(4, 4, 100);
        img.set(0, 0, 98).unwrap();
        img.set(0, 1, 102).unwrap();
        img.set(3, 3, 250).unwrap();
        let mask = Mask::from_fn(4, 4, |r, _| r < 2);
        let params = NormalizeParams {
            policy: NormalizationPolicy::RoiOnWhole,
            offset: 1.0,
        };
        let out = normalize_image(&img, &params, Some(RoiRef::Mask(&mask))).unwrap();
        assert_eq!(out.get(3, 3).unwrap(), 255);
        assert_eq!(out.get(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_roi_on_whole_from_masked_images() {
        let img = ramp(3, 3, 10, 10);
        let mask = Mask::from_fn(3, 3, |r, _| r == 1);
        let masked = img.masked(&mask).unwrap();
        let params = NormalizeParams {
            policy: NormalizationPolicy::RoiOnWhole,
            offset: 1.0,
        };
        let from_mask = normalize_image(&img, &params, Some(RoiRef::Mask(&mask))).unwrap();
        let from_masked = normalize_image(&img, &params, Some(RoiRef::Masked(&masked))).unwrap();
        assert_eq!(from_mask, from_masked);
    }

    #[test]
    fn test_empty_roi_is_degenerate() {
        let img: GrayImage = Image::filled(3, 3, 9);
        let masked: GrayImage = Image::new(3, 3);
        let params = NormalizeParams {
            policy: NormalizationPolicy::RoiOnWhole,
            ..Default::default()
        };
        assert!(matches!(
            normalize_image(&img, &params, Some(RoiRef::Masked(&masked))),
            Err(Error::DegenerateRegion(_))
        ));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("ROI".parse::<NormalizationPolicy>().unwrap(), NormalizationPolicy::Roi);
        assert_eq!(
            "ROI_on_whole".parse::<NormalizationPolicy>().unwrap(),
            NormalizationPolicy::RoiOnWhole
        );
        assert!(matches!(
            "global".parse::<NormalizationPolicy>(),
            Err(Error::Config { name: "policy", .. })
        ));
    }

    #[test]
    fn test_batch_length_mismatch() {
        let images = vec![Image::new(2, 2), Image::new(2, 2)];
        let masks = vec![Mask::from_fn(2, 2, |r, _| r == 0)];
        let params = NormalizeParams {
            policy: NormalizationPolicy::Roi,
            ..Default::default()
        };
        let result = normalize_batch(
            &images,
            &params,
            Some(RoiSource::Masks(&masks)),
            ExecutionMode::Sequential,
        );
        assert!(matches!(result, Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn test_negative_offset_rejected() {
        let params = NormalizeParams {
            policy: NormalizationPolicy::RoiOnWhole,
            offset: -1.0,
        };
        let result = normalize_batch(&[], &params, None, ExecutionMode::Sequential);
        assert!(matches!(result, Err(Error::Config { name: "offset", .. })));
    }
}
