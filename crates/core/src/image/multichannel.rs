//! Interleaved multi-channel 8-bit images

use crate::error::{Error, Result};
use crate::image::GrayImage;
use ndarray::{s, Array3};

/// An 8-bit image with one or more channels, stored as (row, col, channel).
#[derive(Debug, Clone, PartialEq)]
pub struct MultiChannelImage {
    data: Array3<u8>,
}

impl MultiChannelImage {
    /// Create a new image filled with zeros
    pub fn new(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            data: Array3::zeros((rows, cols, channels)),
        }
    }

    /// Create an image from an ndarray in (row, col, channel) layout
    pub fn from_array(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// Create an image from interleaved row-major samples
    pub fn from_vec(data: Vec<u8>, rows: usize, cols: usize, channels: usize) -> Result<Self> {
        let array = Array3::from_shape_vec((rows, cols, channels), data)
            .map_err(|e| Error::Shape(e.to_string()))?;
        Ok(Self { data: array })
    }

    /// Stack single-channel planes of equal shape into one image
    pub fn from_planes(planes: &[&GrayImage]) -> Result<Self> {
        let first = planes
            .first()
            .ok_or_else(|| Error::Shape("at least one plane required".into()))?;
        let (rows, cols) = first.shape();
        let mut data = Array3::zeros((rows, cols, planes.len()));
        for (c, plane) in planes.iter().enumerate() {
            first.ensure_same_shape(plane)?;
            data.slice_mut(s![.., .., c]).assign(plane.data());
        }
        Ok(Self { data })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array3<u8> {
        &self.data
    }

    /// Copy out one channel as a grayscale image
    pub fn channel(&self, index: usize) -> Result<GrayImage> {
        if index >= self.channels() {
            return Err(Error::Shape(format!(
                "channel {} requested from a {}-channel image",
                index,
                self.channels()
            )));
        }
        Ok(GrayImage::from_array(
            self.data.slice(s![.., .., index]).to_owned(),
        ))
    }
}
