//! SWT-DCT feature extractor
//!
//! Each image is decomposed with an `L`-level stationary wavelet transform.
//! Every detail plane gets an 8x8 block DCT, and the DC coefficient of each
//! block is kept. Images are 64 blocks in area, so each plane contributes
//! 64 values and an image `192 * L`.
//!
//! Planes are emitted coarsest level first, and within a level in
//! horizontal, vertical, diagonal order.

use cellfeat_core::{stack_rows, Error, FeatureExtractor, FeatureMatrix, GrayImage, Result};
use tracing::debug;

use super::dct::{block_dc, block_dct2, BLOCK};
use super::filters::Wavelet;
use super::swt::{check_swt_shape, swt2};
use crate::batch::ExecutionMode;

/// Coefficients kept per detail plane
pub const COEFFS_PER_PLANE: usize = 64;

const ORIENTATIONS: [&str; 3] = ["h", "v", "d"];

/// Parameters for SWT-DCT extraction
#[derive(Debug, Clone, PartialEq)]
pub struct SwtDctParams {
    pub wavelet: Wavelet,
    /// Decomposition levels, at least 1
    pub levels: usize,
}

impl Default for SwtDctParams {
    fn default() -> Self {
        Self {
            wavelet: Wavelet::Haar,
            levels: 1,
        }
    }
}

impl SwtDctParams {
    pub fn validate(&self) -> Result<()> {
        if self.levels == 0 {
            return Err(Error::config("levels", 0, "at least one level is required"));
        }
        Ok(())
    }

    /// Feature count per image
    pub fn n_features(&self) -> usize {
        3 * COEFFS_PER_PLANE * self.levels
    }
}

/// Check that an image yields exactly 64 blocks per plane and supports
/// the requested level count.
fn check_shape(rows: usize, cols: usize, levels: usize) -> Result<()> {
    if rows % BLOCK != 0 || cols % BLOCK != 0 {
        return Err(Error::Shape(format!(
            "{}x{} image is not a whole number of {}x{} blocks",
            rows, cols, BLOCK, BLOCK
        )));
    }
    let blocks = (rows / BLOCK) * (cols / BLOCK);
    if blocks != COEFFS_PER_PLANE {
        return Err(Error::Shape(format!(
            "{}x{} image holds {} blocks, {} are required (e.g. 64x64)",
            rows, cols, blocks, COEFFS_PER_PLANE
        )));
    }
    check_swt_shape(rows, cols, levels)
}

/// SWT-DCT features of one image, `192 * levels` values
pub fn swt_dct_features(image: &GrayImage, params: &SwtDctParams) -> Result<Vec<f64>> {
    params.validate()?;
    let (rows, cols) = image.shape();
    check_shape(rows, cols, params.levels)?;

    let plane = image.to_f64().into_array();
    let swt = swt2(&plane, params.wavelet, params.levels)?;

    let mut out = Vec::with_capacity(params.n_features());
    for bands in swt.details.iter().rev() {
        for detail in bands.planes() {
            let dc = block_dc(&block_dct2(detail)?);
            out.extend(dc.iter().copied());
        }
    }
    Ok(out)
}

/// Stationary wavelet + block DCT extractor
#[derive(Debug, Clone, Default)]
pub struct SwtDctExtractor {
    params: SwtDctParams,
    mode: ExecutionMode,
}

impl SwtDctExtractor {
    /// Create an extractor, validating the level count eagerly
    pub fn new(params: SwtDctParams) -> Result<Self> {
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

    pub fn params(&self) -> &SwtDctParams {
        &self.params
    }
}

impl FeatureExtractor for SwtDctExtractor {
    fn name(&self) -> &'static str {
        "swt_dct"
    }

    fn n_features(&self) -> usize {
        self.params.n_features()
    }

    fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features());
        for level in (1..=self.params.levels).rev() {
            for o in ORIENTATIONS {
                for k in 0..COEFFS_PER_PLANE {
                    names.push(format!("swt_l{}_{}_{}", level, o, k));
                }
            }
        }
        names
    }

    fn transform(&self, images: &[GrayImage]) -> Result<FeatureMatrix> {
        self.params.validate()?;
        debug!(
            "SWT-DCT: {} images, wavelet={}, levels={}",
            images.len(),
            self.params.wavelet,
            self.params.levels
        );
        let rows = self
            .mode
            .try_map(images.len(), |i| swt_dct_features(&images[i], &self.params))?;
        stack_rows(rows, self.n_features())
    }
}
