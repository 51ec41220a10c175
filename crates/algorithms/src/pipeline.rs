//! Preprocessing and feature pipelines
//!
//! [`Preprocessor`] runs split, ROI and normalization over a batch and
//! returns every intermediate as one immutable [`PreprocessState`].
//! [`FeaturePipeline`] runs a list of extractors over the same images and
//! concatenates their matrices column-wise.

use std::fmt;
use std::time::Instant;

use cellfeat_core::{
    hstack, Error, FeatureExtractor, FeatureMatrix, GrayImage, Mask, MultiChannelImage, Result,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::batch::{ensure_paired, ExecutionMode};
use crate::preprocess::{
    build_roi_batch, normalize_batch, split_batch, NormalizationPolicy, NormalizeParams,
    RoiParams, RoiSource, SplitParams,
};

/// Which images the normalizer rescales
///
/// Every policy maps a zero background back to zero, so `Masked` hands
/// the extractors background-free images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeSource {
    /// The unmasked working images
    Working,
    /// The working images with the background zeroed
    #[default]
    Masked,
}

/// Parameters for all preprocessing stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreprocessParams {
    pub split: SplitParams,
    pub roi: RoiParams,
    pub normalize: NormalizeParams,
    pub source: NormalizeSource,
}

impl PreprocessParams {
    pub fn validate(&self) -> Result<()> {
        self.roi.validate()?;
        self.normalize.validate()
    }
}

/// Every intermediate of a preprocessing run, indexed like the input batch
#[derive(Debug, Clone, Default)]
pub struct PreprocessState {
    pub working: Vec<GrayImage>,
    pub mask_source: Vec<GrayImage>,
    pub masks: Vec<Mask>,
    pub masked: Vec<GrayImage>,
    pub normalized: Vec<GrayImage>,
}

impl PreprocessState {
    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }
}

/// Split -> ROI -> normalize over a batch of three-channel images.
///
/// `PreprocessState::normalized` is the input the feature extractors take.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    params: PreprocessParams,
    mode: ExecutionMode,
}

impl Preprocessor {
    pub fn new(params: PreprocessParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            mode: ExecutionMode::default(),
        })
    }

    /// Set how the per-image maps run
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn params(&self) -> &PreprocessParams {
        &self.params
    }

    /// Run every stage over `images`
    pub fn run(&self, images: &[MultiChannelImage]) -> Result<PreprocessState> {
        let start = Instant::now();
        let split = split_batch(images, &self.params.split, self.mode)?;
        let state = self.run_split(split.working, split.mask_source)?;
        debug!(
            "Preprocessed {} images in {:.1} ms",
            state.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(state)
    }

    /// Run the ROI and normalization stages on already split planes
    pub fn run_split(
        &self,
        working: Vec<GrayImage>,
        mask_source: Vec<GrayImage>,
    ) -> Result<PreprocessState> {
        ensure_paired("mask_source", working.len(), mask_source.len())?;
        let roi = build_roi_batch(&working, &mask_source, &self.params.roi, self.mode)?;

        let source = match self.params.source {
            NormalizeSource::Working => &working,
            NormalizeSource::Masked => &roi.masked,
        };
        let roi_source = match self.params.normalize.policy {
            NormalizationPolicy::Whole => None,
            NormalizationPolicy::Roi | NormalizationPolicy::RoiOnWhole => {
                Some(RoiSource::Masks(&roi.masks))
            }
        };
        let normalized = normalize_batch(source, &self.params.normalize, roi_source, self.mode)?;

        Ok(PreprocessState {
            working,
            mask_source,
            masks: roi.masks,
            masked: roi.masked,
            normalized,
        })
    }
}

/// Ordered list of extractors whose outputs are concatenated column-wise
#[derive(Default)]
pub struct FeaturePipeline {
    extractors: Vec<Box<dyn FeatureExtractor>>,
}

impl fmt::Debug for FeaturePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.extractors.iter().map(|e| e.name()).collect();
        f.debug_struct("FeaturePipeline")
            .field("extractors", &names)
            .finish()
    }
}

impl FeaturePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an extractor
    pub fn with<E: FeatureExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn push(&mut self, extractor: Box<dyn FeatureExtractor>) {
        self.extractors.push(extractor);
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    pub fn extractors(&self) -> &[Box<dyn FeatureExtractor>] {
        &self.extractors
    }
}

impl FeatureExtractor for FeaturePipeline {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn n_features(&self) -> usize {
        self.extractors.iter().map(|e| e.n_features()).sum()
    }

    fn feature_names(&self) -> Vec<String> {
        self.extractors
            .iter()
            .flat_map(|e| e.feature_names())
            .collect()
    }

    fn fit(&mut self, images: &[GrayImage], labels: Option<&[usize]>) -> Result<()> {
        for extractor in &mut self.extractors {
            extractor.fit(images, labels)?;
        }
        Ok(())
    }

    fn transform(&self, images: &[GrayImage]) -> Result<FeatureMatrix> {
        if self.extractors.is_empty() {
            return Ok(Array2::zeros((images.len(), 0)));
        }

        let mut blocks = Vec::with_capacity(self.extractors.len());
        for extractor in &self.extractors {
            let start = Instant::now();
            let block = extractor.transform(images)?;
            if block.ncols() != extractor.n_features() {
                return Err(Error::LengthMismatch {
                    what: "feature columns",
                    expected: extractor.n_features(),
                    actual: block.ncols(),
                });
            }
            debug!(
                "{}: {} x {} in {:.1} ms",
                extractor.name(),
                block.nrows(),
                block.ncols(),
                start.elapsed().as_secs_f64() * 1000.0
            );
            blocks.push(block);
        }
        hstack(&blocks)
    }
}
