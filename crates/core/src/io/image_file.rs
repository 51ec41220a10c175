//! Image file reading/writing through the `image` crate
//!
//! Color files decode to 3-channel RGB; alpha is dropped and grayscale
//! files are expanded so every decoded image has the same channel count.

use crate::error::{Error, Result};
use crate::image::{GrayImage, MultiChannelImage};
use std::path::Path;

/// Read an image file as 3-channel RGB
pub fn read_color_image<P: AsRef<Path>>(path: P) -> Result<MultiChannelImage> {
    let decoded = ::image::open(path.as_ref())?;
    rgb_to_multichannel(decoded.to_rgb8())
}

/// Decode an in-memory encoded image (PNG, JPEG, TIFF, BMP) as 3-channel RGB
pub fn decode_color_image(bytes: &[u8]) -> Result<MultiChannelImage> {
    let decoded = ::image::load_from_memory(bytes)?;
    rgb_to_multichannel(decoded.to_rgb8())
}

/// Read an image file as 8-bit grayscale
pub fn read_gray_image<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    let luma = ::image::open(path.as_ref())?.to_luma8();
    let (width, height) = luma.dimensions();
    GrayImage::from_vec(luma.into_raw(), height as usize, width as usize)
}

/// Write an 8-bit grayscale image; the format follows the file extension
pub fn write_gray_image<P: AsRef<Path>>(image: &GrayImage, path: P) -> Result<()> {
    let (rows, cols) = image.shape();
    let raw: Vec<u8> = image.data().iter().copied().collect();
    let buffer = ::image::GrayImage::from_raw(cols as u32, rows as u32, raw)
        .ok_or_else(|| Error::Shape(format!("cannot encode {}x{} buffer", rows, cols)))?;
    buffer.save(path.as_ref())?;
    Ok(())
}

fn rgb_to_multichannel(rgb: ::image::RgbImage) -> Result<MultiChannelImage> {
    let (width, height) = rgb.dimensions();
    MultiChannelImage::from_vec(rgb.into_raw(), height as usize, width as usize, 3)
}
