//! Image data structures

mod element;
mod grid;
mod mask;
mod multichannel;

pub use element::PixelElement;
pub use grid::{GrayImage, Image, ImageStatistics};
pub use mask::{distinct_levels, Mask, BACKGROUND, FOREGROUND};
pub use multichannel::MultiChannelImage;
