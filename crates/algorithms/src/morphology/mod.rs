//! Mathematical morphology on 8-bit images
//!
//! The operations the ROI builder needs to clean a thresholded mask:
//! - **Erosion**: minimum filter (shrinks bright regions)
//! - **Dilation**: maximum filter (expands bright regions)
//! - **Opening**: erosion then dilation (removes small bright features)
//!
//! Each takes an iteration count; zero iterations is the identity.

mod dilate;
mod element;
mod erode;
mod opening;

pub use dilate::{dilate, Dilate, DilateParams};
pub use element::StructuringElement;
pub use erode::{erode, Erode, ErodeParams};
pub use opening::{opening, Opening, OpeningParams};
