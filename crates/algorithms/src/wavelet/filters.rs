//! Orthogonal wavelet filter banks
//!
//! Decomposition filters of the Haar and Daubechies families. The high-pass
//! filter is the quadrature mirror of the low-pass one:
//! `hi[k] = (-1)^(k+1) * lo[N-1-k]`.

use std::fmt;
use std::str::FromStr;

use cellfeat_core::{Error, Result};
use serde::{Deserialize, Serialize};

const HAAR: [f64; 2] = [
    std::f64::consts::FRAC_1_SQRT_2,
    std::f64::consts::FRAC_1_SQRT_2,
];

const DB2: [f64; 4] = [
    -0.12940952255092145,
    0.22414386804185735,
    0.836516303737469,
    0.48296291314469025,
];

const DB3: [f64; 6] = [
    0.035226291882100656,
    -0.08544127388224149,
    -0.13501102001039084,
    0.4598775021193313,
    0.8068915093133388,
    0.3326705529509569,
];

const DB4: [f64; 8] = [
    -0.010597401784997278,
    0.032883011666982945,
    0.030841381835986965,
    -0.18703481171888114,
    -0.02798376941698385,
    0.6308807679295904,
    0.7148465705525415,
    0.23037781330885523,
];

/// Supported wavelet families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wavelet {
    #[default]
    Haar,
    Db2,
    Db3,
    Db4,
}

impl Wavelet {
    /// Decomposition low-pass filter
    pub fn dec_lo(self) -> &'static [f64] {
        match self {
            Wavelet::Haar => &HAAR,
            Wavelet::Db2 => &DB2,
            Wavelet::Db3 => &DB3,
            Wavelet::Db4 => &DB4,
        }
    }

    /// Decomposition high-pass filter
    pub fn dec_hi(self) -> Vec<f64> {
        let lo = self.dec_lo();
        let n = lo.len();
        (0..n)
            .map(|k| {
                let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
                sign * lo[n - 1 - k]
            })
            .collect()
    }

    /// Filter length
    pub fn filter_len(self) -> usize {
        self.dec_lo().len()
    }
}

impl fmt::Display for Wavelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Wavelet::Haar => "haar",
            Wavelet::Db2 => "db2",
            Wavelet::Db3 => "db3",
            Wavelet::Db4 => "db4",
        };
        f.write_str(s)
    }
}

impl FromStr for Wavelet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "haar" | "db1" => Ok(Wavelet::Haar),
            "db2" => Ok(Wavelet::Db2),
            "db3" => Ok(Wavelet::Db3),
            "db4" => Ok(Wavelet::Db4),
            _ => Err(Error::config(
                "wavelet",
                s,
                "supported wavelets are haar, db2, db3, db4",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Wavelet; 4] = [Wavelet::Haar, Wavelet::Db2, Wavelet::Db3, Wavelet::Db4];

    #[test]
    fn test_lowpass_normalization() {
        for w in ALL {
            let lo = w.dec_lo();
            let sum: f64 = lo.iter().sum();
            let energy: f64 = lo.iter().map(|v| v * v).sum();
            assert!((sum - 2f64.sqrt()).abs() < 1e-9, "{} sum {}", w, sum);
            assert!((energy - 1.0).abs() < 1e-9, "{} energy {}", w, energy);
        }
    }

    #[test]
    fn test_highpass_zero_mean_orthogonal() {
        for w in ALL {
            let lo = w.dec_lo();
            let hi = w.dec_hi();
            assert_eq!(hi.len(), lo.len());
            let sum: f64 = hi.iter().sum();
            let dot: f64 = lo.iter().zip(&hi).map(|(a, b)| a * b).sum();
            assert!(sum.abs() < 1e-9, "{} hi sum {}", w, sum);
            assert!(dot.abs() < 1e-9, "{} lo.hi {}", w, dot);
        }
    }

    #[test]
    fn test_haar_hi() {
        let hi = Wavelet::Haar.dec_hi();
        assert!((hi[0] + std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-15);
        assert!((hi[1] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-15);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Haar".parse::<Wavelet>().unwrap(), Wavelet::Haar);
        assert_eq!("db1".parse::<Wavelet>().unwrap(), Wavelet::Haar);
        assert_eq!("DB4".parse::<Wavelet>().unwrap(), Wavelet::Db4);
        assert!(matches!(
            "sym5".parse::<Wavelet>(),
            Err(Error::Config { name: "wavelet", .. })
        ));
        assert_eq!(Wavelet::Db3.to_string(), "db3");
    }
}
