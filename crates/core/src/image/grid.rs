//! Main single-channel image type

use crate::error::{Error, Result};
use crate::image::{Mask, PixelElement};
use ndarray::Array2;

/// A single-channel 2D image grid.
///
/// `Image<T>` stores samples of type `T` in row-major order `(row, col)`.
/// Stages produce new images rather than mutating their inputs.
///
/// # Example
///
/// ```ignore
/// use cellfeat_core::Image;
///
/// let mut img: Image<u8> = Image::new(64, 64);
/// img.set(10, 20, 200)?;
/// let value = img.get(10, 20)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T: PixelElement> {
    /// Pixel data stored in row-major order (row, col)
    data: Array2<T>,
}

/// 8-bit grayscale image, the unit every extractor consumes
pub type GrayImage = Image<u8>;

impl<T: PixelElement> Image<T> {
    /// Create a new image filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Create a new image filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Create an image from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::Shape(format!(
                "{} samples cannot fill a {}x{} image",
                data.len(),
                rows,
                cols
            )));
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Shape(e.to_string()))?;

        Ok(Self { data: array })
    }

    /// Create an image from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self { data }
    }

    /// Apply `f` to every pixel, producing a new image of another element type
    pub fn map<U: PixelElement, F: Fn(T) -> U>(&self, f: F) -> Image<U> {
        Image {
            data: self.data.mapv(f),
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of pixels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image has no pixels
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data.get((row, col)).copied().ok_or_else(|| {
            Error::Shape(format!(
                "index ({}, {}) out of bounds for {}x{} image",
                row,
                col,
                self.rows(),
                self.cols()
            ))
        })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::Shape(format!(
                "index ({}, {}) out of bounds for {}x{} image",
                row,
                col,
                self.rows(),
                self.cols()
            )));
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    /// Consume the image and return the underlying array
    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    /// Convert every sample to f64
    pub fn to_f64(&self) -> Image<f64> {
        self.map(|v| v.to_f64())
    }

    /// Fail with [`Error::SizeMismatch`] unless `other` has the same shape.
    pub fn ensure_same_shape<U: PixelElement>(&self, other: &Image<U>) -> Result<()> {
        let (er, ec) = self.shape();
        let (ar, ac) = other.shape();
        if er != ar || ec != ac {
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }
        Ok(())
    }

    /// Copy of this image with every background pixel of `mask` set to zero.
    pub fn masked(&self, mask: &Mask) -> Result<Self> {
        self.ensure_same_shape(mask.image())?;
        let mut out = self.clone();
        ndarray::Zip::from(out.data_mut())
            .and(mask.image().data())
            .for_each(|v, &m| {
                if m == 0 {
                    *v = T::zero();
                }
            });
        Ok(out)
    }

    // Statistics

    /// First-order statistics over the pixels selected by `mask`
    /// (all pixels when `mask` is `None`).
    ///
    /// Standard deviation is the population form (divides by N).
    pub fn statistics(&self, mask: Option<&Mask>) -> Result<ImageStatistics> {
        if let Some(m) = mask {
            self.ensure_same_shape(m.image())?;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for ((row, col), &value) in self.data.indexed_iter() {
            if let Some(m) = mask {
                if !m.is_foreground(row, col) {
                    continue;
                }
            }
            let v = value.to_f64();
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        if count == 0 {
            return Err(Error::DegenerateRegion(
                "no pixels selected for statistics".into(),
            ));
        }

        let mean = sum / count as f64;
        let mut sq = 0.0;
        for ((row, col), &value) in self.data.indexed_iter() {
            if let Some(m) = mask {
                if !m.is_foreground(row, col) {
                    continue;
                }
            }
            let d = value.to_f64() - mean;
            sq += d * d;
        }

        Ok(ImageStatistics {
            count,
            mean,
            std_dev: (sq / count as f64).sqrt(),
            min,
            max,
        })
    }
}

/// First-order statistics of a pixel set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStatistics {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_creation() {
        let img: Image<u8> = Image::new(100, 200);
        assert_eq!(img.rows(), 100);
        assert_eq!(img.cols(), 200);
        assert_eq!(img.shape(), (100, 200));
    }

    #[test]
    fn test_image_access() {
        let mut img: Image<f64> = Image::new(10, 10);
        img.set(5, 5, 42.5).unwrap();
        assert_eq!(img.get(5, 5).unwrap(), 42.5);
        assert!(img.get(10, 0).is_err());
        assert!(img.set(0, 10, 1.0).is_err());
    }

    #[test]
    fn test_from_vec_wrong_len() {
        let result = Image::<u8>::from_vec(vec![0; 5], 2, 3);
        assert!(matches!(result, Err(Error::Shape(_))));
    }

    #[test]
    fn test_statistics_whole() {
        let mut img: Image<u8> = Image::new(10, 10);
        for i in 0..10 {
            for j in 0..10 {
                img.set(i, j, (i * 10 + j) as u8).unwrap();
            }
        }

        let stats = img.statistics(None).unwrap();
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 99.0);
        assert_eq!(stats.count, 100);
        assert!((stats.mean - 49.5).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_masked() {
        let mut img: Image<u8> = Image::filled(4, 4, 10);
        img.set(0, 0, 30).unwrap();
        let mut m: Image<u8> = Image::new(4, 4);
        m.set(0, 0, 255).unwrap();
        m.set(0, 1, 255).unwrap();
        let mask = Mask::from_image(&m).unwrap();

        let stats = img.statistics(Some(&mask)).unwrap();
        assert_eq!(stats.count, 2);
        assert!((stats.mean - 20.0).abs() < 1e-12);
        assert!((stats.std_dev - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_empty_region() {
        let img: Image<u8> = Image::filled(3, 3, 7);
        let mask = Mask::from_image(&Image::new(3, 3)).unwrap();
        let result = img.statistics(Some(&mask));
        assert!(matches!(result, Err(Error::DegenerateRegion(_))));
    }

    #[test]
    fn test_masked_zeroes_background() {
        let img: Image<u8> = Image::filled(2, 2, 9);
        let mut m: Image<u8> = Image::new(2, 2);
        m.set(1, 1, 1).unwrap();
        let mask = Mask::from_image(&m).unwrap();
        let out = img.masked(&mask).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 0);
        assert_eq!(out.get(1, 1).unwrap(), 9);
        // Input untouched
        assert_eq!(img.get(0, 0).unwrap(), 9);
    }

    #[test]
    fn test_masked_shape_mismatch() {
        let img: Image<u8> = Image::filled(2, 2, 9);
        let mask = Mask::from_image(&Image::new(3, 3)).unwrap();
        assert!(matches!(img.masked(&mask), Err(Error::SizeMismatch { .. })));
    }
}
