//! Structuring element definitions for morphological operations
//!
//! A structuring element defines the neighborhood shape used in
//! erosion, dilation, and opening. The anchor sits at the element center
//! (`size / 2` along each axis).

use cellfeat_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Shape of a structuring element for morphological operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuringElement {
    /// Full rectangle of `width` columns by `height` rows
    Rect { width: usize, height: usize },
    /// Cross (plus-shaped) element of given radius
    Cross(usize),
    /// Disk element of given radius
    Disk(usize),
    /// User-provided boolean mask (rows of equal length)
    Custom(Vec<Vec<bool>>),
}

impl Default for StructuringElement {
    fn default() -> Self {
        StructuringElement::Rect {
            width: 3,
            height: 3,
        }
    }
}

impl StructuringElement {
    /// Square element of the given side length
    pub fn square(size: usize) -> Self {
        StructuringElement::Rect {
            width: size,
            height: size,
        }
    }

    /// Validate the structuring element, returning an error for invalid configurations
    pub fn validate(&self) -> Result<()> {
        match self {
            StructuringElement::Rect { width, height } => {
                if *width == 0 || *height == 0 {
                    return Err(Error::config(
                        "morph_kernel",
                        format!("{}x{}", width, height),
                        "structuring element sides must be at least 1",
                    ));
                }
                Ok(())
            }
            StructuringElement::Cross(r) | StructuringElement::Disk(r) => {
                if *r == 0 {
                    return Err(Error::config(
                        "radius",
                        0,
                        "structuring element radius must be at least 1",
                    ));
                }
                Ok(())
            }
            StructuringElement::Custom(mask) => {
                if mask.is_empty() || mask[0].is_empty() {
                    return Err(Error::config(
                        "custom_mask",
                        "empty",
                        "custom mask must not be empty",
                    ));
                }
                let width = mask[0].len();
                for row in mask {
                    if row.len() != width {
                        return Err(Error::config(
                            "custom_mask",
                            format!("row length {}", row.len()),
                            format!("custom mask rows must all have length {}", width),
                        ));
                    }
                }
                if !mask.iter().flatten().any(|&a| a) {
                    return Err(Error::config(
                        "custom_mask",
                        "all false",
                        "custom mask needs at least one active cell",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Compute (dr, dc) offsets relative to the anchor for all active cells
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        match self {
            StructuringElement::Rect { width, height } => {
                let ar = (*height / 2) as isize;
                let ac = (*width / 2) as isize;
                let mut offsets = Vec::with_capacity(width * height);
                for r in 0..*height as isize {
                    for c in 0..*width as isize {
                        offsets.push((r - ar, c - ac));
                    }
                }
                offsets
            }
            StructuringElement::Disk(r) => {
                let r = *r as isize;
                let limit = (r * r) as f64;
                let mut offsets = Vec::new();
                for dr in -r..=r {
                    for dc in -r..=r {
                        if ((dr * dr + dc * dc) as f64) <= limit {
                            offsets.push((dr, dc));
                        }
                    }
                }
                offsets
            }
            StructuringElement::Cross(r) => {
                let r = *r as isize;
                let mut offsets = Vec::new();
                for d in -r..=r {
                    offsets.push((d, 0)); // vertical arm
                    if d != 0 {
                        offsets.push((0, d)); // horizontal arm (skip center duplicate)
                    }
                }
                offsets
            }
            StructuringElement::Custom(mask) => {
                let ar = (mask.len() / 2) as isize;
                let ac = (mask.first().map_or(0, Vec::len) / 2) as isize;
                let mut offsets = Vec::new();
                for (r, row) in mask.iter().enumerate() {
                    for (c, &active) in row.iter().enumerate() {
                        if active {
                            offsets.push((r as isize - ar, c as isize - ac));
                        }
                    }
                }
                offsets
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_offsets() {
        let se = StructuringElement::square(3);
        let offsets = se.offsets();
        assert_eq!(offsets.len(), 9);
        assert!(offsets.contains(&(0, 0)));
        assert!(offsets.contains(&(-1, -1)));
        assert!(offsets.contains(&(1, 1)));
    }

    #[test]
    fn test_rect_even_anchor() {
        // 2 wide: anchor at column 1, so offsets -1..=0
        let se = StructuringElement::Rect { width: 2, height: 1 };
        let offsets = se.offsets();
        assert_eq!(offsets, vec![(0, -1), (0, 0)]);
    }

    #[test]
    fn test_cross_offsets() {
        let se = StructuringElement::Cross(1);
        let offsets = se.offsets();
        assert_eq!(offsets.len(), 5);
        assert!(offsets.contains(&(0, 0)));
        assert!(offsets.contains(&(-1, 0)));
        assert!(offsets.contains(&(0, 1)));
        assert!(!offsets.contains(&(-1, -1)));
    }

    #[test]
    fn test_disk_offsets() {
        // Diagonals are sqrt(2) > 1.0
        let se = StructuringElement::Disk(1);
        assert_eq!(se.offsets().len(), 5);
        assert_eq!(StructuringElement::Disk(2).offsets().len(), 13);
    }

    #[test]
    fn test_custom_offsets() {
        let mask = vec![
            vec![true, false, false],
            vec![true, false, false],
            vec![true, true, true],
        ];
        let se = StructuringElement::Custom(mask);
        let offsets = se.offsets();
        assert_eq!(offsets.len(), 5);
        assert!(offsets.contains(&(-1, -1)));
        assert!(offsets.contains(&(1, 1)));
    }

    #[test]
    fn test_validate() {
        assert!(StructuringElement::Rect { width: 0, height: 3 }.validate().is_err());
        assert!(StructuringElement::Cross(0).validate().is_err());
        assert!(StructuringElement::Disk(0).validate().is_err());
        assert!(StructuringElement::Custom(vec![vec![true], vec![true, false]])
            .validate()
            .is_err());
        assert!(StructuringElement::Custom(vec![vec![false]]).validate().is_err());
        assert!(StructuringElement::default().validate().is_ok());
    }

    #[test]
    fn test_default() {
        assert_eq!(StructuringElement::default(), StructuringElement::square(3));
    }
}
