//! Pixel element trait for generic image samples

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in an image pixel.
///
/// Images hold 8-bit samples as decoded, and `f64` planes once a
/// transform needs real arithmetic.
pub trait PixelElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Convert self to f64
    fn to_f64(self) -> f64 {
        NumCast::from(self).unwrap_or(f64::NAN)
    }

    /// Convert from f64, rounding to nearest and saturating for integer types
    fn from_f64_saturating(value: f64) -> Self;
}

impl PixelElement for u8 {
    fn from_f64_saturating(value: f64) -> Self {
        if value.is_nan() {
            return 0;
        }
        // `as` saturates at the type bounds
        value.round() as u8
    }
}

impl PixelElement for f64 {
    fn from_f64_saturating(value: f64) -> Self {
        value
    }
}
