use serde::{Deserialize, Serialize};

use common::{Error, Result};

pub const DEFAULT_BB_PERIOD: usize = 20;
pub const DEFAULT_BB_STD_DEV: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    /// Band width relative to the middle band. Zero when the middle is zero.
    pub fn width(&self) -> f64 {
        if self.middle == 0.0 {
            return 0.0;
        }
        (self.upper - self.lower) / self.middle
    }
}

/// Bollinger Bands over the last `period` values of the passed slice.
///
/// Middle band = mean of the window.
/// Upper/lower = middle ± `std_dev` × population standard deviation.
///
/// Callers wanting bands as of an earlier point must pre-slice.
/// Needs at least `period + 2` values.
pub fn bollinger_bands(series: &[f64], period: usize, std_dev: f64) -> Result<BollingerBands> {
    if period == 0 {
        return Err(Error::InvalidParameter(
            "Bollinger period must be >= 1".into(),
        ));
    }
    Error::ensure_len(series.len(), period + 2)?;

    let window = &series[series.len() - period..];
    let n = period as f64;
    let middle = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / n;
    let sigma = variance.sqrt();

    Ok(BollingerBands {
        upper: middle + sigma * std_dev,
        middle,
        lower: middle - sigma * std_dev,
    })
}

/// Bollinger Bands with default parameters (20 SMA, 2σ).
pub fn bollinger_bands_default(series: &[f64]) -> Result<BollingerBands> {
    bollinger_bands(series, DEFAULT_BB_PERIOD, DEFAULT_BB_STD_DEV)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_collapse_on_constant_series() {
        let bb = bollinger_bands_default(&[1.0; 22]).unwrap();
        assert_eq!(bb, BollingerBands { upper: 1.0, middle: 1.0, lower: 1.0 });
        assert_eq!(bb.width(), 0.0);
    }

    #[test]
    fn bands_use_trailing_window_only() {
        let mut prices = vec![1000.0; 10];
        prices.extend([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let bb = bollinger_bands(&prices, 8, 2.0).unwrap();
        // Classic population-σ example: mean 5, σ 2
        assert!((bb.middle - 5.0).abs() < 1e-12);
        assert!((bb.upper - 9.0).abs() < 1e-12);
        assert!((bb.lower - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bands_require_period_plus_two() {
        assert!(matches!(
            bollinger_bands_default(&[1.0; 21]),
            Err(Error::InsufficientData { required: 22, actual: 21 })
        ));
    }

    #[test]
    fn bands_are_ordered() {
        let prices: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 1.3).cos() * 4.0).collect();
        let bb = bollinger_bands_default(&prices).unwrap();
        assert!(bb.upper > bb.middle);
        assert!(bb.middle > bb.lower);
        assert!(bb.width() > 0.0);
    }

    #[test]
    fn zero_period_rejected() {
        assert!(matches!(
            bollinger_bands(&[1.0; 5], 0, 2.0),
            Err(Error::InvalidParameter(_))
        ));
    }
}
