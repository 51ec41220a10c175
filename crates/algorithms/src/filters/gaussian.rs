//! Gaussian smoothing for 8-bit images
//!
//! The kernel is applied as two 1-D passes (rows then columns). Borders
//! mirror without repeating the edge pixel (`dcb|abcd|cba`).

use cellfeat_core::image::PixelElement;
use cellfeat_core::{Algorithm, Error, GrayImage, Image, Result};
use ndarray::Array2;

/// Parameters for Gaussian blur
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianParams {
    /// Kernel width (columns), positive and odd
    pub width: usize,
    /// Kernel height (rows), positive and odd
    pub height: usize,
    /// Horizontal sigma; derived from `width` when `None`
    pub sigma_x: Option<f64>,
    /// Vertical sigma; derived from `height` when `None`
    pub sigma_y: Option<f64>,
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            sigma_x: None,
            sigma_y: None,
        }
    }
}

impl GaussianParams {
    /// Square kernel with derived sigma
    pub fn square(size: usize) -> Self {
        Self {
            width: size,
            height: size,
            ..Default::default()
        }
    }

    /// Validate the kernel size, returning an error for even or zero sizes
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [("kernel_width", self.width), ("kernel_height", self.height)] {
            if size == 0 || size % 2 == 0 {
                return Err(Error::config(
                    name,
                    size,
                    "Gaussian kernel size must be a positive odd integer",
                ));
            }
        }
        for (name, sigma) in [("sigma_x", self.sigma_x), ("sigma_y", self.sigma_y)] {
            if let Some(s) = sigma {
                if !s.is_finite() || s < 0.0 {
                    return Err(Error::config(name, s, "sigma must be finite and non-negative"));
                }
            }
        }
        Ok(())
    }
}

/// Gaussian blur algorithm
#[derive(Debug, Clone, Default)]
pub struct GaussianBlur;

impl Algorithm for GaussianBlur {
    type Input = GrayImage;
    type Output = GrayImage;
    type Params = GaussianParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "GaussianBlur"
    }

    fn description(&self) -> &'static str {
        "Separable Gaussian smoothing with reflected borders"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        gaussian_blur(&input, &params)
    }
}

/// Normalized 1-D Gaussian kernel of odd length `size`.
///
/// Without an explicit positive sigma, sizes up to 7 use the fixed binomial
/// kernels and larger sizes use `sigma = 0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: usize, sigma: Option<f64>) -> Vec<f64> {
    let explicit = sigma.filter(|s| *s > 0.0);
    if explicit.is_none() {
        match size {
            1 => return vec![1.0],
            3 => return vec![0.25, 0.5, 0.25],
            5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
            7 => {
                return vec![
                    0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
                ]
            }
            _ => {}
        }
    }

    let sigma = explicit.unwrap_or(0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8);
    let half = (size / 2) as f64;
    let scale = -0.5 / (sigma * sigma);
    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - half;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Smooth an 8-bit image with a Gaussian kernel
///
/// # Arguments
/// * `image` - Input image
/// * `params` - Kernel size and optional sigmas
pub fn gaussian_blur(image: &GrayImage, params: &GaussianParams) -> Result<GrayImage> {
    params.validate()?;

    let (rows, cols) = image.shape();
    if rows == 0 || cols == 0 {
        return Ok(image.clone());
    }

    let kx = gaussian_kernel(params.width, params.sigma_x);
    let ky = gaussian_kernel(params.height, params.sigma_y.or(params.sigma_x));
    let hx = (kx.len() / 2) as isize;
    let hy = (ky.len() / 2) as isize;
    let src = image.data();

    // Row pass
    let mut tmp = Array2::<f64>::zeros((rows, cols));
    for row in 0..rows {
        for col in 0..cols {
            let mut acc = 0.0;
            for (k, &w) in kx.iter().enumerate() {
                let c = reflect101(col as isize + k as isize - hx, cols);
                acc += w * src[(row, c)] as f64;
            }
            tmp[(row, col)] = acc;
        }
    }

    // Column pass
    let mut out = Array2::<u8>::zeros((rows, cols));
    for row in 0..rows {
        for col in 0..cols {
            let mut acc = 0.0;
            for (k, &w) in ky.iter().enumerate() {
                let r = reflect101(row as isize + k as isize - hy, rows);
                acc += w * tmp[(r, col)];
            }
            out[(row, col)] = u8::from_f64_saturating(acc);
        }
    }

    Ok(Image::from_array(out))
}

/// Mirror an out-of-range index back into `0..n` without repeating the edge.
fn reflect101(mut i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * (n - 1) - i;
        } else {
            return i as usize;
        }
    }
}
