//! Channel selection for three-channel cell images
//!
//! A cell image carries its contour in one channel and the signal of
//! interest in another. Splitting yields the working image (one channel or
//! a luminance blend) and the mask-source image the ROI builder thresholds.

use std::fmt;
use std::str::FromStr;

use cellfeat_core::{Algorithm, Error, GrayImage, Image, MultiChannelImage, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::batch::ExecutionMode;

/// A color channel by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        f.write_str(s)
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "r" | "red" => Ok(Channel::Red),
            "g" | "green" => Ok(Channel::Green),
            "b" | "blue" => Ok(Channel::Blue),
            _ => Err(Error::config("channel", s, "expected one of R, G, B")),
        }
    }
}

/// Storage order of the three channels in a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Red, green, blue (as decoded from image files)
    #[default]
    Rgb,
    /// Blue, green, red
    Bgr,
}

impl ChannelOrder {
    /// Storage index of `channel` under this order
    pub fn index(self, channel: Channel) -> usize {
        match (self, channel) {
            (_, Channel::Green) => 1,
            (ChannelOrder::Rgb, Channel::Red) | (ChannelOrder::Bgr, Channel::Blue) => 0,
            (ChannelOrder::Rgb, Channel::Blue) | (ChannelOrder::Bgr, Channel::Red) => 2,
        }
    }
}

/// Source of the working image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingChannel {
    /// One channel taken as is
    Channel(Channel),
    /// Luminance blend of all three channels
    Luminance,
}

impl Default for WorkingChannel {
    fn default() -> Self {
        WorkingChannel::Channel(Channel::Green)
    }
}

impl FromStr for WorkingChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gray" | "grey" | "luminance" => Ok(WorkingChannel::Luminance),
            other => other
                .parse::<Channel>()
                .map(WorkingChannel::Channel)
                .map_err(|_| {
                    Error::config("working", s, "expected R, G, B or luminance")
                }),
        }
    }
}

/// Parameters for channel splitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitParams {
    /// Where the working image comes from
    pub working: WorkingChannel,
    /// Channel thresholded into the ROI mask
    pub mask_channel: Channel,
    /// Channel layout of the input buffers
    pub order: ChannelOrder,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            working: WorkingChannel::default(),
            mask_channel: Channel::Red,
            order: ChannelOrder::Rgb,
        }
    }
}

/// Channel splitter algorithm
#[derive(Debug, Clone, Default)]
pub struct ChannelSplitter;

impl Algorithm for ChannelSplitter {
    type Input = MultiChannelImage;
    type Output = (GrayImage, GrayImage);
    type Params = SplitParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ChannelSplitter"
    }

    fn description(&self) -> &'static str {
        "Split a three-channel image into working and mask-source planes"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        split_channels(&input, &params)
    }
}

/// Working and mask-source images of a batch, in input order
#[derive(Debug, Clone, Default)]
pub struct SplitBatch {
    pub working: Vec<GrayImage>,
    pub mask_source: Vec<GrayImage>,
}

fn require_three_channels(image: &MultiChannelImage) -> Result<()> {
    if image.channels() != 3 {
        return Err(Error::Shape(format!(
            "expected a 3-channel image, got {} channel(s)",
            image.channels()
        )));
    }
    Ok(())
}

/// Split one image into (working, mask source)
pub fn split_channels(
    image: &MultiChannelImage,
    params: &SplitParams,
) -> Result<(GrayImage, GrayImage)> {
    require_three_channels(image)?;

    let working = match params.working {
        WorkingChannel::Channel(ch) => image.channel(params.order.index(ch))?,
        WorkingChannel::Luminance => luminance(image, params.order)?,
    };
    let mask_source = image.channel(params.order.index(params.mask_channel))?;
    Ok((working, mask_source))
}

/// Split every image of a batch
pub fn split_batch(
    images: &[MultiChannelImage],
    params: &SplitParams,
    mode: ExecutionMode,
) -> Result<SplitBatch> {
    debug!(
        "Splitting {} images (working={:?}, mask={})",
        images.len(),
        params.working,
        params.mask_channel
    );
    let pairs = mode.try_map(images.len(), |i| split_channels(&images[i], params))?;
    let (working, mask_source) = pairs.into_iter().unzip();
    Ok(SplitBatch {
        working,
        mask_source,
    })
}

/// Take one named channel from each three-channel image
pub fn extract_channel(
    images: &[MultiChannelImage],
    channel: Channel,
    order: ChannelOrder,
) -> Result<Vec<GrayImage>> {
    images
        .iter()
        .enumerate()
        .map(|(i, img)| {
            require_three_channels(img)
                .and_then(|_| img.channel(order.index(channel)))
                .map_err(|e| e.at_image(i))
        })
        .collect()
}

/// Luminance `Y = 0.299 R + 0.587 G + 0.114 B`, rounded to nearest
pub fn luminance(image: &MultiChannelImage, order: ChannelOrder) -> Result<GrayImage> {
    require_three_channels(image)?;
    let data = image.data();
    let (ri, gi, bi) = (
        order.index(Channel::Red),
        order.index(Channel::Green),
        order.index(Channel::Blue),
    );
    let out = Array2::from_shape_fn(image.shape(), |(r, c)| {
        let y = 0.299 * data[(r, c, ri)] as f64
            + 0.587 * data[(r, c, gi)] as f64
            + 0.114 * data[(r, c, bi)] as f64;
        y.round().min(255.0) as u8
    });
    Ok(Image::from_array(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn rgb(rows: usize, cols: usize, r: u8, g: u8, b: u8) -> MultiChannelImage {
        let mut data = Array3::<u8>::zeros((rows, cols, 3));
        for row in 0..rows {
            for col in 0..cols {
                data[(row, col, 0)] = r;
                data[(row, col, 1)] = g;
                data[(row, col, 2)] = b;
            }
        }
        MultiChannelImage::from_array(data)
    }

    #[test]
    fn test_default_split_green_red() {
        let img = rgb(4, 5, 200, 100, 7);
        let (working, mask_src) = split_channels(&img, &SplitParams::default()).unwrap();
        assert_eq!(working.shape(), (4, 5));
        assert!(working.data().iter().all(|&v| v == 100));
        assert!(mask_src.data().iter().all(|&v| v == 200));
    }

    #[test]
    fn test_bgr_order() {
        // Stored as B, G, R
        let img = rgb(2, 2, 9, 50, 180);
        let params = SplitParams {
            order: ChannelOrder::Bgr,
            ..Default::default()
        };
        let (_, mask_src) = split_channels(&img, &params).unwrap();
        assert!(mask_src.data().iter().all(|&v| v == 180));
    }

    #[test]
    fn test_luminance() {
        let img = rgb(3, 3, 255, 255, 255);
        let gray = luminance(&img, ChannelOrder::Rgb).unwrap();
        assert!(gray.data().iter().all(|&v| v == 255));

        let img = rgb(1, 1, 100, 0, 0);
        // 29.9 rounds to 30
        assert_eq!(luminance(&img, ChannelOrder::Rgb).unwrap().get(0, 0).unwrap(), 30);
        assert_eq!(luminance(&img, ChannelOrder::Bgr).unwrap().get(0, 0).unwrap(), 11);
    }

    #[test]
    fn test_wrong_channel_count() {
        let img = MultiChannelImage::new(4, 4, 1);
        assert!(matches!(
            split_channels(&img, &SplitParams::default()),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_split_batch_attributes_index() {
        let images = vec![
            rgb(2, 2, 1, 2, 3),
            rgb(2, 2, 4, 5, 6),
            MultiChannelImage::new(2, 2, 4),
        ];
        let err = split_batch(&images, &SplitParams::default(), ExecutionMode::Sequential)
            .unwrap_err();
        assert_eq!(err.image_index(), Some(2));

        let batch =
            split_batch(&images[..2], &SplitParams::default(), ExecutionMode::Parallel).unwrap();
        assert_eq!(batch.working.len(), 2);
        assert_eq!(batch.working[1].get(0, 0).unwrap(), 5);
        assert_eq!(batch.mask_source[1].get(0, 0).unwrap(), 4);
    }

    #[test]
    fn test_extract_channel() {
        let images = vec![rgb(2, 3, 10, 20, 30), rgb(2, 3, 40, 50, 60)];
        let blues = extract_channel(&images, Channel::Blue, ChannelOrder::Rgb).unwrap();
        assert_eq!(blues.len(), 2);
        assert_eq!(blues[1].get(1, 2).unwrap(), 60);
    }

    #[test]
    fn test_parse_channels() {
        assert_eq!("R".parse::<Channel>().unwrap(), Channel::Red);
        assert_eq!("green".parse::<Channel>().unwrap(), Channel::Green);
        assert!("x".parse::<Channel>().is_err());
        assert_eq!(
            "gray".parse::<WorkingChannel>().unwrap(),
            WorkingChannel::Luminance
        );
        assert_eq!(
            "G".parse::<WorkingChannel>().unwrap(),
            WorkingChannel::Channel(Channel::Green)
        );
    }
}
