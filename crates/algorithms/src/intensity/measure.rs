//! First-order intensity statistics and mass displacement
//!
//! Without masks each image yields mean, standard deviation, minimum and
//! maximum over all pixels. With masks the statistics cover the ROI only
//! and a fifth column holds the mass displacement.

use cellfeat_core::{stack_rows, Error, FeatureExtractor, FeatureMatrix, GrayImage, Mask, Result};
use tracing::debug;

use super::moments::mass_displacement;
use crate::batch::{ensure_paired, ExecutionMode};

const BASE_NAMES: [&str; 4] = [
    "intensity_mean",
    "intensity_std",
    "intensity_min",
    "intensity_max",
];

/// Intensity statistics of one image, optionally restricted to `mask`
pub fn intensity_features(image: &GrayImage, mask: Option<&Mask>) -> Result<Vec<f64>> {
    let stats = image.statistics(mask)?;
    let mut row = vec![stats.mean, stats.std_dev, stats.min, stats.max];
    if let Some(m) = mask {
        row.push(mass_displacement(image, m)?);
    }
    Ok(row)
}

fn check_mask(mask: &Mask) -> Result<()> {
    if mask.foreground_count() == 0 {
        return Err(Error::DegenerateRegion(
            "mask selects no foreground pixels".into(),
        ));
    }
    mask.require_two_levels()
}

/// Intensity / mass displacement extractor
#[derive(Debug, Clone, Default)]
pub struct IntensityExtractor {
    masks: Option<Vec<Mask>>,
    mode: ExecutionMode,
}

impl IntensityExtractor {
    /// Extractor over whole images (4 columns)
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor over the ROI of each image (5 columns).
    ///
    /// An empty mask is a [`Error::DegenerateRegion`]; a mask covering the
    /// whole image is a [`Error::Shape`] error.
    pub fn with_masks(masks: Vec<Mask>) -> Result<Self> {
        for (i, m) in masks.iter().enumerate() {
            check_mask(m).map_err(|e| e.at_image(i))?;
        }
        Ok(Self {
            masks: Some(masks),
            mode: ExecutionMode::default(),
        })
    }

    /// Set how the per-image map runs
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn masks(&self) -> Option<&[Mask]> {
        self.masks.as_deref()
    }
}

impl FeatureExtractor for IntensityExtractor {
    fn name(&self) -> &'static str {
        "intensity"
    }

    fn n_features(&self) -> usize {
        if self.masks.is_some() {
            5
        } else {
            4
        }
    }

    fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BASE_NAMES.iter().map(|s| s.to_string()).collect();
        if self.masks.is_some() {
            names.push("mass_displacement".to_string());
        }
        names
    }

    fn fit(&mut self, images: &[GrayImage], labels: Option<&[usize]>) -> Result<()> {
        if let Some(labels) = labels {
            ensure_paired("labels", images.len(), labels.len())?;
        }
        if let Some(masks) = &self.masks {
            ensure_paired("masks", images.len(), masks.len())?;
        }
        Ok(())
    }

    fn transform(&self, images: &[GrayImage]) -> Result<FeatureMatrix> {
        let masks = self.masks.as_deref();
        if let Some(m) = masks {
            ensure_paired("masks", images.len(), m.len())?;
        }
        debug!(
            "Intensity: {} images, masked={}",
            images.len(),
            masks.is_some()
        );

        let rows = self.mode.try_map(images.len(), |i| {
            intensity_features(&images[i], masks.map(|m| &m[i]))
        })?;
        stack_rows(rows, self.n_features())
    }
}
