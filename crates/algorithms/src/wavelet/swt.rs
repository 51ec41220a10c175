//! 2-D stationary (undecimated) wavelet transform
//!
//! A-trous algorithm: level `j` filters the previous approximation with the
//! decomposition filters upsampled by `2^j` (zeros inserted between taps)
//! and never downsamples, so every subband keeps the input size. Borders
//! wrap around (periodic extension).

use cellfeat_core::{Error, Result};
use ndarray::{Array2, Axis, Zip};

use super::filters::Wavelet;

/// The three detail planes of one level
#[derive(Debug, Clone, PartialEq)]
pub struct DetailBands {
    /// High-pass down the columns, low-pass along the rows
    pub horizontal: Array2<f64>,
    /// Low-pass down the columns, high-pass along the rows
    pub vertical: Array2<f64>,
    /// High-pass in both directions
    pub diagonal: Array2<f64>,
}

impl DetailBands {
    /// Planes in (horizontal, vertical, diagonal) order
    pub fn planes(&self) -> [&Array2<f64>; 3] {
        [&self.horizontal, &self.vertical, &self.diagonal]
    }
}

/// Result of a multi-level decomposition
#[derive(Debug, Clone, PartialEq)]
pub struct Swt2 {
    /// Approximation after the last level
    pub approximation: Array2<f64>,
    /// Detail bands, `details[0]` being the finest level
    pub details: Vec<DetailBands>,
}

impl Swt2 {
    pub fn levels(&self) -> usize {
        self.details.len()
    }
}

/// Check that `levels` decompositions fit a `rows x cols` input
pub fn check_swt_shape(rows: usize, cols: usize, levels: usize) -> Result<()> {
    if levels == 0 {
        return Err(Error::config("levels", 0, "at least one level is required"));
    }
    let step = 1usize
        .checked_shl(levels as u32)
        .ok_or_else(|| Error::config("levels", levels, "level count too large"))?;
    if rows == 0 || cols == 0 || rows % step != 0 || cols % step != 0 {
        return Err(Error::Shape(format!(
            "{}x{} image is not divisible by 2^{} = {} for a {}-level SWT",
            rows, cols, levels, step, levels
        )));
    }
    Ok(())
}

/// Circular convolution of every lane along `axis` with `filter`
/// upsampled by `step`, centered on the upsampled support:
/// `out[n] = sum_k f[k] * x[(n + len * step / 2 - k * step) mod N]`.
fn convolve_axis(data: &Array2<f64>, filter: &[f64], step: usize, axis: Axis) -> Array2<f64> {
    let n = data.len_of(axis);
    let center = (filter.len() * step / 2) % n;
    let mut out = Array2::<f64>::zeros(data.raw_dim());
    Zip::from(out.lanes_mut(axis))
        .and(data.lanes(axis))
        .for_each(|mut o, x| {
            for i in 0..n {
                let mut acc = 0.0;
                for (k, &f) in filter.iter().enumerate() {
                    let shift = (k * step) % n;
                    let idx = (i + center + n - shift) % n;
                    acc += f * x[idx];
                }
                o[i] = acc;
            }
        });
    out
}

/// Decompose `image` into `levels` levels of stationary wavelet subbands.
///
/// # Errors
/// [`Error::Config`] for zero levels, [`Error::Shape`] when either side is
/// not a multiple of `2^levels`.
pub fn swt2(image: &Array2<f64>, wavelet: Wavelet, levels: usize) -> Result<Swt2> {
    let (rows, cols) = image.dim();
    check_swt_shape(rows, cols, levels)?;

    let lo = wavelet.dec_lo();
    let hi = wavelet.dec_hi();
    let mut approx = image.clone();
    let mut details = Vec::with_capacity(levels);

    for level in 0..levels {
        let step = 1 << level;
        // Along the rows (axis 1) first
        let low = convolve_axis(&approx, lo, step, Axis(1));
        let high = convolve_axis(&approx, &hi, step, Axis(1));

        let next = convolve_axis(&low, lo, step, Axis(0));
        details.push(DetailBands {
            horizontal: convolve_axis(&low, &hi, step, Axis(0)),
            vertical: convolve_axis(&high, lo, step, Axis(0)),
            diagonal: convolve_axis(&high, &hi, step, Axis(0)),
        });
        approx = next;
    }

    Ok(Swt2 {
        approximation: approx,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(a: &Array2<f64>) -> f64 {
        a.iter().map(|v| v * v).sum()
    }

    fn pattern(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| ((r * 7 + c * 13) % 17) as f64)
    }

    #[test]
    fn test_constant_has_no_detail() {
        let img = Array2::from_elem((16, 16), 42.0);
        for w in [Wavelet::Haar, Wavelet::Db2, Wavelet::Db4] {
            let out = swt2(&img, w, 2).unwrap();
            for bands in &out.details {
                for plane in bands.planes() {
                    assert!(plane.iter().all(|v| v.abs() < 1e-9), "{}", w);
                }
            }
            // Each level scales a constant by sum(lo)^2 = 2
            assert!((out.approximation[(3, 5)] - 42.0 * 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_undecimated_shapes() {
        let img = pattern(16, 24);
        let out = swt2(&img, Wavelet::Db2, 3).unwrap();
        assert_eq!(out.levels(), 3);
        for bands in &out.details {
            for plane in bands.planes() {
                assert_eq!(plane.dim(), (16, 24));
            }
        }
    }

    #[test]
    fn test_haar_energy_identity() {
        // One undecimated orthonormal level multiplies total energy by 4
        let img = pattern(8, 8);
        let out = swt2(&img, Wavelet::Haar, 1).unwrap();
        let total = energy(&out.approximation)
            + out.details[0].planes().iter().map(|p| energy(p)).sum::<f64>();
        assert!((total - 4.0 * energy(&img)).abs() < 1e-6);
    }

    #[test]
    fn test_haar_horizontal_edge() {
        // Rows 0..4 dark, 4..8 bright: a horizontal edge shows up in the
        // horizontal band only
        let img = Array2::from_shape_fn((8, 8), |(r, _)| if r < 4 { 0.0 } else { 10.0 });
        let out = swt2(&img, Wavelet::Haar, 1).unwrap();
        let d = &out.details[0];
        assert!(d.horizontal.iter().any(|v| v.abs() > 1.0));
        assert!(d.vertical.iter().all(|v| v.abs() < 1e-12));
        assert!(d.diagonal.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_filter_phase() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let mut x = Array2::<f64>::zeros((1, 8));
        x[(0, 2)] = 1.0;

        // Level 1: taps land on x[n + 1] and x[n]
        let lo = convolve_axis(&x, Wavelet::Haar.dec_lo(), 1, Axis(1));
        let nonzero: Vec<usize> = (0..8).filter(|&i| lo[(0, i)].abs() > 1e-12).collect();
        assert_eq!(nonzero, vec![1, 2]);
        let hi = convolve_axis(&x, &Wavelet::Haar.dec_hi(), 1, Axis(1));
        assert!((hi[(0, 1)] + h).abs() < 1e-12);
        assert!((hi[(0, 2)] - h).abs() < 1e-12);

        // Level 2: taps two apart, on x[n + 2] and x[n]
        let lo2 = convolve_axis(&x, Wavelet::Haar.dec_lo(), 2, Axis(1));
        let nonzero: Vec<usize> = (0..8).filter(|&i| lo2[(0, i)].abs() > 1e-12).collect();
        assert_eq!(nonzero, vec![0, 2]);
    }

    #[test]
    fn test_shape_checks() {
        let img = pattern(12, 16);
        assert!(swt2(&img, Wavelet::Haar, 2).is_ok());
        assert!(matches!(
            swt2(&img, Wavelet::Haar, 3),
            Err(Error::Shape(_))
        ));
        assert!(matches!(
            swt2(&img, Wavelet::Haar, 0),
            Err(Error::Config { .. })
        ));
    }
}
