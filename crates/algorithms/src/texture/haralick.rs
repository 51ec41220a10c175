//! Haralick texture features
//!
//! Thirteen statistics of a normalized GLCM (Haralick, Shanmugam and
//! Dinstein, 1973). The fourteenth, the maximal correlation coefficient,
//! is not computed: it needs an eigen-decomposition that is numerically
//! unstable on sparse matrices.
//!
//! For every distance the four directional matrices each contribute 13
//! values, giving `52 * distances.len()` features per image.

use cellfeat_core::image::distinct_levels;
use cellfeat_core::{stack_rows, Error, FeatureExtractor, FeatureMatrix, GrayImage, Result};
use ndarray::Array2;
use tracing::debug;

use super::glcm::{Glcm, DIRECTIONS};
use crate::batch::ExecutionMode;

/// Number of statistics computed per matrix
pub const HARALICK_FEATURES: usize = 13;

/// Statistic names, in output order
pub const HARALICK_NAMES: [&str; HARALICK_FEATURES] = [
    "angular_second_moment",
    "contrast",
    "correlation",
    "variance",
    "inverse_difference_moment",
    "sum_average",
    "sum_variance",
    "sum_entropy",
    "entropy",
    "difference_variance",
    "difference_entropy",
    "info_measure_correlation_1",
    "info_measure_correlation_2",
];

/// Parameters for Haralick extraction
#[derive(Debug, Clone, PartialEq)]
pub struct HaralickParams {
    /// Pixel distances, each producing 52 features
    pub distances: Vec<usize>,
    /// Drop pairs involving zero (background) pixels
    pub ignore_zeros: bool,
}

impl Default for HaralickParams {
    fn default() -> Self {
        Self {
            distances: vec![1],
            ignore_zeros: true,
        }
    }
}

impl HaralickParams {
    pub fn validate(&self) -> Result<()> {
        if self.distances.is_empty() {
            return Err(Error::config(
                "distances",
                "[]",
                "at least one distance is required",
            ));
        }
        if self.distances.contains(&0) {
            return Err(Error::config(
                "distances",
                format!("{:?}", self.distances),
                "distances must be at least 1",
            ));
        }
        Ok(())
    }

    /// Feature count per image
    pub fn n_features(&self) -> usize {
        DIRECTIONS.len() * HARALICK_FEATURES * self.distances.len()
    }
}

/// `-sum p log2 p`, treating `0 log 0` as 0
fn entropy<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> f64 {
    -values
        .into_iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.log2())
        .sum::<f64>()
}

/// The 13 statistics of a normalized co-occurrence matrix
pub fn haralick_features(p: &Array2<f64>) -> [f64; HARALICK_FEATURES] {
    let n = p.nrows();
    let mut feats = [0.0; HARALICK_FEATURES];

    // Marginals and the sum / difference distributions
    let px = p.sum_axis(ndarray::Axis(0));
    let py = p.sum_axis(ndarray::Axis(1));
    let mut p_sum = vec![0.0; 2 * n];
    let mut p_diff = vec![0.0; n];
    let mut asm = 0.0;
    let mut idm = 0.0;
    let mut sum_ij = 0.0;

    for ((i, j), &v) in p.indexed_iter() {
        p_sum[i + j] += v;
        p_diff[i.abs_diff(j)] += v;
        asm += v * v;
        let d = i as f64 - j as f64;
        idm += v / (1.0 + d * d);
        sum_ij += (i * j) as f64 * v;
    }

    let mean_of = |dist: &[f64]| -> f64 {
        dist.iter().enumerate().map(|(k, &v)| k as f64 * v).sum()
    };
    let second_moment_of = |dist: &[f64]| -> f64 {
        dist.iter().enumerate().map(|(k, &v)| (k * k) as f64 * v).sum()
    };

    let px_slice = px.as_slice().unwrap_or(&[]);
    let py_slice = py.as_slice().unwrap_or(&[]);
    let ux = mean_of(px_slice);
    let uy = mean_of(py_slice);
    let vx = second_moment_of(px_slice) - ux * ux;
    let vy = second_moment_of(py_slice) - uy * uy;
    let sx = vx.max(0.0).sqrt();
    let sy = vy.max(0.0).sqrt();

    feats[0] = asm;
    feats[1] = second_moment_of(&p_diff);
    feats[2] = if sx == 0.0 || sy == 0.0 {
        1.0
    } else {
        (sum_ij - ux * uy) / (sx * sy)
    };
    feats[3] = vx;
    feats[4] = idm;
    feats[5] = mean_of(&p_sum);
    feats[6] = second_moment_of(&p_sum) - feats[5] * feats[5];
    feats[7] = entropy(&p_sum);
    feats[8] = entropy(p.iter());

    let diff_mean = mean_of(&p_diff);
    feats[9] = p_diff
        .iter()
        .enumerate()
        .map(|(k, &v)| (k as f64 - diff_mean).powi(2) * v)
        .sum();
    feats[10] = entropy(&p_diff);

    // Information measures of correlation
    let hx = entropy(px.iter());
    let hy = entropy(py.iter());
    let mut hxy1 = 0.0;
    let mut hxy2 = 0.0;
    for ((i, j), &v) in p.indexed_iter() {
        let q = px[i] * py[j];
        if q > 0.0 {
            hxy1 -= v * q.log2();
            hxy2 -= q * q.log2();
        }
    }
    let hxy = feats[8];
    let h_max = hx.max(hy);
    feats[11] = if h_max == 0.0 {
        hxy - hxy1
    } else {
        (hxy - hxy1) / h_max
    };
    feats[12] = (1.0 - (-2.0 * (hxy2 - hxy)).exp()).max(0.0).sqrt();

    feats
}

/// Haralick features of one image, `52 * distances.len()` values
///
/// # Errors
/// - [`Error::Domain`] if fewer than two gray levels take part in pairs,
///   or a directional matrix ends up empty
/// - [`Error::Shape`] if a distance does not fit inside the image
pub fn haralick(image: &GrayImage, params: &HaralickParams) -> Result<Vec<f64>> {
    params.validate()?;

    let levels = distinct_levels(image)
        .into_iter()
        .filter(|&v| !(params.ignore_zeros && v == 0))
        .count();
    if levels < 2 {
        return Err(Error::Domain(format!(
            "co-occurrence matrix needs at least 2 gray levels, image has {}",
            levels
        )));
    }

    let (rows, cols) = image.shape();
    let limit = rows.min(cols).saturating_sub(1);
    if let Some(&d) = params.distances.iter().find(|&&d| d > limit) {
        return Err(Error::Shape(format!(
            "distance {} exceeds {} for a {}x{} image",
            d, limit, rows, cols
        )));
    }

    let mut out = Vec::with_capacity(params.n_features());
    for &distance in &params.distances {
        for direction in DIRECTIONS {
            let glcm = Glcm::build(image, direction, distance, params.ignore_zeros);
            let p = glcm.normalized().ok_or_else(|| {
                Error::Domain(format!(
                    "no pixel pairs at distance {} along {} degrees",
                    distance,
                    direction.degrees()
                ))
            })?;
            out.extend_from_slice(&haralick_features(&p));
        }
    }
    Ok(out)
}

/// Haralick texture extractor
#[derive(Debug, Clone, Default)]
pub struct HaralickExtractor {
    params: HaralickParams,
    mode: ExecutionMode,
}

impl HaralickExtractor {
    /// Create an extractor, validating the distances eagerly
    pub fn new(params: HaralickParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            mode: ExecutionMode::default(),
        })
    }

    /// Set how the per-image map runs
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn params(&self) -> &HaralickParams {
        &self.params
    }
}

impl FeatureExtractor for HaralickExtractor {
    fn name(&self) -> &'static str {
        "haralick"
    }

    fn n_features(&self) -> usize {
        self.params.n_features()
    }

    fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features());
        for d in &self.params.distances {
            for direction in DIRECTIONS {
                for feat in HARALICK_NAMES {
                    names.push(format!("haralick_d{}_{}_{}", d, direction.degrees(), feat));
                }
            }
        }
        names
    }

    fn transform(&self, images: &[GrayImage]) -> Result<FeatureMatrix> {
        self.params.validate()?;
        debug!(
            "Haralick: {} images, distances {:?}",
            images.len(),
            self.params.distances
        );
        let rows = self
            .mode
            .try_map(images.len(), |i| haralick(&images[i], &self.params))?;
        stack_rows(rows, self.n_features())
    }
}
