//! Feature matrices: one row per image, one column per feature

use crate::error::{Error, Result};
use ndarray::{concatenate, Array2, Axis};

/// Feature matrix of shape (n_images, n_features)
pub type FeatureMatrix = Array2<f64>;

/// Stack equal-length per-image feature vectors into a matrix.
///
/// `n_features` fixes the column count so that an empty batch still
/// yields a `(0, n_features)` matrix.
pub fn stack_rows(rows: Vec<Vec<f64>>, n_features: usize) -> Result<FeatureMatrix> {
    let n = rows.len();
    let mut flat = Vec::with_capacity(n * n_features);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != n_features {
            return Err(Error::Shape(format!(
                "feature vector {} has length {}, expected {}",
                i,
                row.len(),
                n_features
            )));
        }
        flat.extend(row);
    }
    Array2::from_shape_vec((n, n_features), flat).map_err(|e| Error::Other(e.to_string()))
}

/// Concatenate feature matrices column-wise (same images, more features).
pub fn hstack(blocks: &[FeatureMatrix]) -> Result<FeatureMatrix> {
    let Some(first) = blocks.first() else {
        return Ok(Array2::zeros((0, 0)));
    };
    for block in &blocks[1..] {
        if block.nrows() != first.nrows() {
            return Err(Error::LengthMismatch {
                what: "feature block rows",
                expected: first.nrows(),
                actual: block.nrows(),
            });
        }
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    concatenate(Axis(1), &views).map_err(|e| Error::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_rows() {
        let m = stack_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m[(1, 0)], 3.0);
    }

    #[test]
    fn test_stack_rows_empty_batch() {
        let m = stack_rows(Vec::new(), 52).unwrap();
        assert_eq!(m.shape(), &[0, 52]);
    }

    #[test]
    fn test_stack_rows_ragged() {
        assert!(stack_rows(vec![vec![1.0], vec![1.0, 2.0]], 1).is_err());
    }

    #[test]
    fn test_hstack() {
        let a = Array2::from_elem((3, 2), 1.0);
        let b = Array2::from_elem((3, 4), 2.0);
        let m = hstack(&[a, b]).unwrap();
        assert_eq!(m.shape(), &[3, 6]);
        assert_eq!(m[(2, 5)], 2.0);
    }

    #[test]
    fn test_hstack_row_mismatch() {
        let a = Array2::from_elem((3, 2), 1.0);
        let b = Array2::from_elem((2, 2), 1.0);
        assert!(matches!(hstack(&[a, b]), Err(Error::LengthMismatch { .. })));
    }
}
