//! Pipeline configuration
//!
//! One TOML document configures every stage. All sections are optional and
//! fall back to the defaults below:
//!
//! ```toml
//! [split]
//! working = "green"        # r, g, b or luminance
//! mask_channel = "red"
//! order = "rgb"            # or "bgr"
//!
//! [roi]
//! blur_kernel = [5, 5]     # width, height; positive and odd
//! morph_kernel = [3, 3]
//! open_iterations = 2
//! dilate_iterations = 3
//!
//! [normalize]
//! policy = "whole"         # whole, roi, roi_on_whole
//! offset = 2.5
//! source = "masked"        # or "working"
//!
//! [features.haralick]
//! enabled = true
//! distances = [1]
//! ignore_zeros = true
//!
//! [features.intensity]
//! enabled = true
//! use_masks = true
//!
//! [features.swt_dct]
//! enabled = true
//! wavelet = "haar"
//! levels = 1
//!
//! [execution]
//! parallel = true
//! threads = 0              # 0 uses the global pool
//! ```

use std::path::Path;

use cellfeat_core::{Error, Mask, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::batch::ExecutionMode;
use crate::filters::GaussianParams;
use crate::intensity::IntensityExtractor;
use crate::morphology::StructuringElement;
use crate::pipeline::{FeaturePipeline, NormalizeSource, PreprocessParams};
use crate::preprocess::{ChannelOrder, NormalizeParams, RoiParams, SplitParams};
use crate::texture::{HaralickExtractor, HaralickParams};
use crate::wavelet::{SwtDctExtractor, SwtDctParams};

/// Channel split section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitSection {
    pub working: String,
    pub mask_channel: String,
    pub order: ChannelOrder,
}

impl Default for SplitSection {
    fn default() -> Self {
        Self {
            working: "green".into(),
            mask_channel: "red".into(),
            order: ChannelOrder::Rgb,
        }
    }
}

/// ROI builder section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiSection {
    pub blur_kernel: [usize; 2],
    pub morph_kernel: [usize; 2],
    pub open_iterations: usize,
    pub dilate_iterations: usize,
}

impl Default for RoiSection {
    fn default() -> Self {
        Self {
            blur_kernel: [5, 5],
            morph_kernel: [3, 3],
            open_iterations: 2,
            dilate_iterations: 3,
        }
    }
}

/// Normalizer section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeSection {
    pub policy: String,
    pub offset: f64,
    pub source: NormalizeSource,
}

impl Default for NormalizeSection {
    fn default() -> Self {
        Self {
            policy: "whole".into(),
            offset: 2.5,
            source: NormalizeSource::Masked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaralickSection {
    pub enabled: bool,
    pub distances: Vec<usize>,
    pub ignore_zeros: bool,
}

impl Default for HaralickSection {
    fn default() -> Self {
        Self {
            enabled: true,
            distances: vec![1],
            ignore_zeros: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensitySection {
    pub enabled: bool,
    /// Restrict statistics to the ROI and add mass displacement
    pub use_masks: bool,
}

impl Default for IntensitySection {
    fn default() -> Self {
        Self {
            enabled: true,
            use_masks: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwtDctSection {
    pub enabled: bool,
    pub wavelet: String,
    pub levels: usize,
}

impl Default for SwtDctSection {
    fn default() -> Self {
        Self {
            enabled: true,
            wavelet: "haar".into(),
            levels: 1,
        }
    }
}

/// Extractor sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesSection {
    pub haralick: HaralickSection,
    pub intensity: IntensitySection,
    pub swt_dct: SwtDctSection,
}

/// Batch execution section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    pub parallel: bool,
    pub threads: usize,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: 0,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub split: SplitSection,
    pub roi: RoiSection,
    pub normalize: NormalizeSection,
    pub features: FeaturesSection,
    pub execution: ExecutionSection,
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(s)
            .map_err(|e| Error::config("config", "<toml>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading pipeline config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&text)
            .map_err(|e| Error::config("config", path.display(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Other(e.to_string()))
    }

    /// Check every section, failing on the first invalid value
    pub fn validate(&self) -> Result<()> {
        self.preprocess_params()?.validate()?;
        if self.features.haralick.enabled {
            self.haralick_params().validate()?;
        }
        if self.features.swt_dct.enabled {
            self.swt_dct_params()?.validate()?;
        }
        self.execution_mode()?;
        Ok(())
    }

    pub fn split_params(&self) -> Result<SplitParams> {
        Ok(SplitParams {
            working: self.split.working.parse()?,
            mask_channel: self.split.mask_channel.parse()?,
            order: self.split.order,
        })
    }

    pub fn roi_params(&self) -> RoiParams {
        let [bw, bh] = self.roi.blur_kernel;
        let [mw, mh] = self.roi.morph_kernel;
        RoiParams {
            blur: GaussianParams {
                width: bw,
                height: bh,
                ..Default::default()
            },
            element: StructuringElement::Rect {
                width: mw,
                height: mh,
            },
            open_iterations: self.roi.open_iterations,
            dilate_iterations: self.roi.dilate_iterations,
        }
    }

    pub fn normalize_params(&self) -> Result<NormalizeParams> {
        Ok(NormalizeParams {
            policy: self.normalize.policy.parse()?,
            offset: self.normalize.offset,
        })
    }

    pub fn preprocess_params(&self) -> Result<PreprocessParams> {
        Ok(PreprocessParams {
            split: self.split_params()?,
            roi: self.roi_params(),
            normalize: self.normalize_params()?,
            source: self.normalize.source,
        })
    }

    pub fn haralick_params(&self) -> HaralickParams {
        HaralickParams {
            distances: self.features.haralick.distances.clone(),
            ignore_zeros: self.features.haralick.ignore_zeros,
        }
    }

    pub fn swt_dct_params(&self) -> Result<SwtDctParams> {
        Ok(SwtDctParams {
            wavelet: self.features.swt_dct.wavelet.parse()?,
            levels: self.features.swt_dct.levels,
        })
    }

    pub fn execution_mode(&self) -> Result<ExecutionMode> {
        let e = &self.execution;
        match (e.parallel, e.threads) {
            (false, 0) => Ok(ExecutionMode::Sequential),
            (false, n) => Err(Error::config(
                "threads",
                n,
                "a thread count needs parallel = true",
            )),
            (true, 0) => Ok(ExecutionMode::Parallel),
            (true, n) => Ok(ExecutionMode::ParallelWith(n)),
        }
    }

    /// Build the enabled extractors in fixed order: Haralick, intensity,
    /// SWT-DCT. `masks` feed the intensity extractor when `use_masks` is set,
    /// and are then required.
    pub fn build_pipeline(&self, masks: Option<&[Mask]>) -> Result<FeaturePipeline> {
        let mode = self.execution_mode()?;
        let mut pipeline = FeaturePipeline::new();

        if self.features.haralick.enabled {
            pipeline = pipeline.with(HaralickExtractor::new(self.haralick_params())?.with_mode(mode));
        }
        if self.features.intensity.enabled {
            let extractor = match (self.features.intensity.use_masks, masks) {
                (true, Some(m)) => IntensityExtractor::with_masks(m.to_vec())?,
                (true, None) => {
                    return Err(Error::config(
                        "use_masks",
                        true,
                        "intensity over the ROI needs masks",
                    ))
                }
                (false, _) => IntensityExtractor::new(),
            };
            pipeline = pipeline.with(extractor.with_mode(mode));
        }
        if self.features.swt_dct.enabled {
            pipeline = pipeline.with(SwtDctExtractor::new(self.swt_dct_params()?)?.with_mode(mode));
        }

        debug!("Built pipeline with {} extractors", pipeline.len());
        Ok(pipeline)
    }
}
