//! Otsu's automatic global threshold
//!
//! Picks the split of the 256-bin histogram that maximises between-class
//! variance, which is the same as minimising the weighted intra-class
//! variance. Ties keep the lowest threshold.

use cellfeat_core::{Algorithm, Error, GrayImage, Mask, Result};

/// Otsu binarization algorithm
#[derive(Debug, Clone, Default)]
pub struct Otsu;

impl Algorithm for Otsu {
    type Input = GrayImage;
    type Output = Mask;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Otsu"
    }

    fn description(&self) -> &'static str {
        "Automatic global threshold minimising intra-class variance"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        Ok(otsu_binarize(&input).0)
    }
}

/// Compute the Otsu threshold of an 8-bit image.
///
/// Pixels `> threshold` form the upper class. A constant image yields its
/// own value, so binarizing it produces an all-background mask.
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for &v in image.data().iter() {
        histogram[v as usize] += 1;
    }

    let total = image.len() as f64;
    if total == 0.0 {
        return 0;
    }

    let mut sum_all = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_all += i as f64 * count as f64;
    }

    let mut sum_b = 0.0;
    let mut weight_b = 0.0;
    let mut max_variance = 0.0;
    let mut threshold = 0u8;
    let mut found = false;

    for (i, &count) in histogram.iter().enumerate() {
        weight_b += count as f64;
        sum_b += i as f64 * count as f64;
        if weight_b == 0.0 {
            continue;
        }

        let weight_f = total - weight_b;
        if weight_f == 0.0 {
            break;
        }

        let mean_b = sum_b / weight_b;
        let mean_f = (sum_all - sum_b) / weight_f;
        let between = weight_b * weight_f * (mean_b - mean_f) * (mean_b - mean_f);

        if !found || between > max_variance {
            max_variance = between;
            threshold = i as u8;
            found = true;
        }
    }

    if !found {
        // Single populated bin: everything sits at or below it
        return image.data().iter().copied().max().unwrap_or(0);
    }
    threshold
}

/// Threshold with Otsu's method, returning the mask and the chosen level.
pub fn otsu_binarize(image: &GrayImage) -> (Mask, u8) {
    let t = otsu_threshold(image);
    (Mask::from_threshold(image, t), t)
}
