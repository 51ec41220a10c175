//! Raw image moments and centroids

use cellfeat_core::{Error, GrayImage, Mask, Result};

/// Zeroth and first order raw moments
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    /// Sum of column index times weight
    pub m10: f64,
    /// Sum of row index times weight
    pub m01: f64,
}

/// A center of mass in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub row: f64,
    pub col: f64,
}

impl Centroid {
    pub fn distance(&self, other: &Centroid) -> f64 {
        (self.row - other.row).hypot(self.col - other.col)
    }
}

impl Moments {
    /// Moments of `image`. With `binary`, every nonzero pixel weighs 1;
    /// otherwise pixels weigh their intensity.
    pub fn of(image: &GrayImage, binary: bool) -> Self {
        let mut m = Moments::default();
        for ((row, col), &v) in image.data().indexed_iter() {
            if v == 0 {
                continue;
            }
            let w = if binary { 1.0 } else { v as f64 };
            m.m00 += w;
            m.m10 += w * col as f64;
            m.m01 += w * row as f64;
        }
        m
    }

    /// `(m10 / m00, m01 / m00)`, or [`Error::DegenerateRegion`] when the
    /// total weight is zero.
    pub fn centroid(&self) -> Result<Centroid> {
        if self.m00 <= 0.0 {
            return Err(Error::DegenerateRegion(
                "centroid of a region with zero mass".into(),
            ));
        }
        Ok(Centroid {
            row: self.m01 / self.m00,
            col: self.m10 / self.m00,
        })
    }
}

/// Center of the nonzero pixels, each weighing 1
pub fn binary_centroid(image: &GrayImage) -> Result<Centroid> {
    Moments::of(image, true).centroid()
}

/// Intensity-weighted center of mass
pub fn gray_centroid(image: &GrayImage) -> Result<Centroid> {
    Moments::of(image, false).centroid()
}

/// Distance between the binary and intensity-weighted centroids of the
/// masked image (pixels outside `mask` zeroed first).
pub fn mass_displacement(image: &GrayImage, mask: &Mask) -> Result<f64> {
    let roi = image.masked(mask)?;
    let binary = binary_centroid(&roi)?;
    let gray = gray_centroid(&roi)?;
    Ok(binary.distance(&gray))
}
