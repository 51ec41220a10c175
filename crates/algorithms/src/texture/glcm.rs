//! Gray-Level Co-occurrence Matrix (GLCM)
//!
//! A GLCM counts how often gray level `i` sits next to gray level `j` at a
//! given distance along one direction. Matrices here are symmetric (each
//! pair counts in both orders) and indexed directly by gray value, so an
//! image with maximum value `m` yields an `(m + 1) x (m + 1)` matrix.

use cellfeat_core::GrayImage;
use ndarray::Array2;

/// One of the four canonical co-occurrence directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Left to right
    Deg0,
    /// Bottom left to top right
    Deg45,
    /// Bottom to top
    Deg90,
    /// Bottom right to top left
    Deg135,
}

/// All directions, in feature order
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Deg0,
    Direction::Deg45,
    Direction::Deg90,
    Direction::Deg135,
];

impl Direction {
    /// (row, col) step for a pixel pair `distance` apart
    pub fn offset(self, distance: usize) -> (isize, isize) {
        let d = distance as isize;
        match self {
            Direction::Deg0 => (0, d),
            Direction::Deg45 => (-d, d),
            Direction::Deg90 => (-d, 0),
            Direction::Deg135 => (-d, -d),
        }
    }

    /// Angle in degrees, used in column names
    pub fn degrees(self) -> u32 {
        match self {
            Direction::Deg0 => 0,
            Direction::Deg45 => 45,
            Direction::Deg90 => 90,
            Direction::Deg135 => 135,
        }
    }
}

/// Raw symmetric co-occurrence counts
#[derive(Debug, Clone, PartialEq)]
pub struct Glcm {
    counts: Array2<f64>,
    total: f64,
}

impl Glcm {
    /// Count co-occurrences of `image` along `direction` at `distance`.
    ///
    /// With `ignore_zeros`, every pair involving a zero pixel is dropped.
    pub fn build(
        image: &GrayImage,
        direction: Direction,
        distance: usize,
        ignore_zeros: bool,
    ) -> Self {
        let levels = image.data().iter().copied().max().map_or(1, |m| m as usize + 1);
        let mut counts = Array2::<f64>::zeros((levels, levels));
        let mut total = 0.0;

        let (rows, cols) = image.shape();
        let (dr, dc) = direction.offset(distance);
        let src = image.data();

        for r1 in 0..rows as isize {
            let r2 = r1 + dr;
            if r2 < 0 || r2 >= rows as isize {
                continue;
            }
            for c1 in 0..cols as isize {
                let c2 = c1 + dc;
                if c2 < 0 || c2 >= cols as isize {
                    continue;
                }
                let i = src[(r1 as usize, c1 as usize)] as usize;
                let j = src[(r2 as usize, c2 as usize)] as usize;
                if ignore_zeros && (i == 0 || j == 0) {
                    continue;
                }
                counts[(i, j)] += 1.0;
                counts[(j, i)] += 1.0; // Symmetric
                total += 2.0;
            }
        }

        Self { counts, total }
    }

    /// Matrix side length (maximum gray value + 1)
    pub fn levels(&self) -> usize {
        self.counts.nrows()
    }

    /// Sum of all counts
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Raw counts
    pub fn counts(&self) -> &Array2<f64> {
        &self.counts
    }

    /// Joint probabilities (entries sum to 1), or `None` for an empty matrix
    pub fn normalized(&self) -> Option<Array2<f64>> {
        if self.total <= 0.0 {
            return None;
        }
        Some(&self.counts / self.total)
    }
}
