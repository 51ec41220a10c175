//! Image preprocessing: channel split, ROI isolation, normalization
//!
//! - **split**: working / mask-source planes from three-channel images
//! - **roi**: Otsu mask with morphological cleanup, applied to the working plane
//! - **normalize**: min-max rescaling under the `whole`, `roi` and
//!   `roi_on_whole` policies

mod normalize;
mod roi;
mod split;

pub use normalize::{
    clip_around_mean, minmax_rescale, normalize_batch, normalize_image, NormalizationPolicy,
    NormalizeParams, RoiRef, RoiSource,
};
pub use roi::{build_roi, build_roi_batch, refine_mask, RoiBatch, RoiBuilder, RoiParams};
pub use split::{
    extract_channel, luminance, split_batch, split_channels, Channel, ChannelOrder,
    ChannelSplitter, SplitBatch, SplitParams, WorkingChannel,
};
