//! Orthonormal 8-point DCT-II and its 8x8 block form
//!
//! `X[k] = a(k) * sum_n x[n] * cos(pi * (2n + 1) * k / 16)` with
//! `a(0) = sqrt(1/8)` and `a(k) = sqrt(2/8)` otherwise. The 2-D block
//! transform applies it down the columns and then along the rows.

use cellfeat_core::{Error, Result};
use ndarray::{s, Array2, ArrayView2};

/// Block side length
pub const BLOCK: usize = 8;

/// Precomputed 8-point DCT-II basis
#[derive(Debug, Clone)]
pub struct Dct8 {
    basis: [[f64; BLOCK]; BLOCK],
}

impl Default for Dct8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Dct8 {
    pub fn new() -> Self {
        let mut basis = [[0.0; BLOCK]; BLOCK];
        let n = BLOCK as f64;
        for (k, row) in basis.iter_mut().enumerate() {
            let alpha = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            for (i, b) in row.iter_mut().enumerate() {
                *b = alpha
                    * (std::f64::consts::PI * (2 * i + 1) as f64 * k as f64 / (2.0 * n)).cos();
            }
        }
        Self { basis }
    }

    /// 1-D transform of eight samples
    pub fn forward(&self, input: &[f64; BLOCK]) -> [f64; BLOCK] {
        let mut out = [0.0; BLOCK];
        for (k, o) in out.iter_mut().enumerate() {
            *o = self.basis[k]
                .iter()
                .zip(input.iter())
                .map(|(b, x)| b * x)
                .sum();
        }
        out
    }

    /// 2-D transform of one 8x8 block
    pub fn forward_block(&self, block: ArrayView2<'_, f64>) -> Array2<f64> {
        let mut tmp = Array2::<f64>::zeros((BLOCK, BLOCK));
        // Down each column
        for c in 0..BLOCK {
            let mut col = [0.0; BLOCK];
            for (r, v) in col.iter_mut().enumerate() {
                *v = block[(r, c)];
            }
            for (r, v) in self.forward(&col).into_iter().enumerate() {
                tmp[(r, c)] = v;
            }
        }
        // Along each row
        let mut out = Array2::<f64>::zeros((BLOCK, BLOCK));
        for r in 0..BLOCK {
            let mut row = [0.0; BLOCK];
            for (c, v) in row.iter_mut().enumerate() {
                *v = tmp[(r, c)];
            }
            for (c, v) in self.forward(&row).into_iter().enumerate() {
                out[(r, c)] = v;
            }
        }
        out
    }
}

/// Transform every 8x8 block of `plane` in place of its samples.
///
/// # Errors
/// [`Error::Shape`] unless both sides are multiples of 8.
pub fn block_dct2(plane: &Array2<f64>) -> Result<Array2<f64>> {
    let (rows, cols) = plane.dim();
    if rows % BLOCK != 0 || cols % BLOCK != 0 {
        return Err(Error::Shape(format!(
            "{}x{} plane is not a whole number of {}x{} blocks",
            rows, cols, BLOCK, BLOCK
        )));
    }

    let dct = Dct8::new();
    let mut out = Array2::<f64>::zeros((rows, cols));
    for br in (0..rows).step_by(BLOCK) {
        for bc in (0..cols).step_by(BLOCK) {
            let block = plane.slice(s![br..br + BLOCK, bc..bc + BLOCK]);
            out.slice_mut(s![br..br + BLOCK, bc..bc + BLOCK])
                .assign(&dct.forward_block(block));
        }
    }
    Ok(out)
}

/// Every 8th coefficient along both axes: the DC term of each block
pub fn block_dc(coeffs: &Array2<f64>) -> Array2<f64> {
    coeffs.slice(s![..;BLOCK as isize, ..;BLOCK as isize]).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_signal() {
        let dct = Dct8::new();
        let out = dct.forward(&[3.0; BLOCK]);
        // DC = 8 * 3 / sqrt(8)
        assert!((out[0] - 24.0 / 8f64.sqrt()).abs() < 1e-12);
        assert!(out[1..].iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_orthonormal_energy() {
        let dct = Dct8::new();
        let x = [1.0, -2.0, 0.5, 4.0, 3.0, -1.0, 0.0, 2.5];
        let y = dct.forward(&x);
        let ex: f64 = x.iter().map(|v| v * v).sum();
        let ey: f64 = y.iter().map(|v| v * v).sum();
        assert!((ex - ey).abs() < 1e-10);
    }

    #[test]
    fn test_block_dc_is_scaled_mean() {
        let plane = Array2::from_shape_fn((16, 8), |(r, c)| if r < 8 { 2.0 } else { (r + c) as f64 });
        let coeffs = block_dct2(&plane).unwrap();
        let dc = block_dc(&coeffs);
        assert_eq!(dc.dim(), (2, 1));
        // Orthonormal 2-D DC is sum / 8
        assert!((dc[(0, 0)] - 16.0).abs() < 1e-10);
        let sum: f64 = plane.slice(s![8..16, ..]).sum();
        assert!((dc[(1, 0)] - sum / 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_block_independence() {
        let mut plane = Array2::<f64>::zeros((8, 16));
        plane[(3, 12)] = 5.0;
        let coeffs = block_dct2(&plane).unwrap();
        assert!(coeffs.slice(s![.., ..8]).iter().all(|v| *v == 0.0));
        assert!(coeffs.slice(s![.., 8..]).iter().any(|v| *v != 0.0));
    }

    #[test]
    fn test_non_block_shape() {
        let plane = Array2::<f64>::zeros((12, 8));
        assert!(matches!(block_dct2(&plane), Err(Error::Shape(_))));
    }
}
