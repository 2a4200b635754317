use serde::{Deserialize, Serialize};

use common::{Error, Result};

use super::ema::{ema_last, smooth};

pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;
pub const MACD_SIGNAL_PERIOD: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD (Moving Average Convergence/Divergence) over the full series.
///
/// MACD line = last EMA(12) − last EMA(26).
/// Signal = EMA(9) taken over the one-element series `[macd]`, which is its
/// own seed, so the signal equals the MACD line and the histogram is always 0.
/// Needs at least 27 values.
pub fn macd(series: &[f64]) -> Result<MacdResult> {
    Error::ensure_len(series.len(), MACD_SLOW_PERIOD + 1)?;

    let macd_line = ema_last(series, MACD_FAST_PERIOD)? - ema_last(series, MACD_SLOW_PERIOD)?;
    let signal = smooth(&[macd_line], MACD_SIGNAL_PERIOD)[0];

    Ok(MacdResult {
        macd: macd_line,
        signal,
        histogram: macd_line - signal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending_up(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64 * 0.5).collect()
    }

    #[test]
    fn macd_errors_with_insufficient_data() {
        assert!(matches!(
            macd(&[100.0; 26]),
            Err(Error::InsufficientData { required: 27, actual: 26 })
        ));
    }

    #[test]
    fn macd_positive_on_uptrend() {
        let result = macd(&trending_up(60)).unwrap();
        assert!(result.macd > 0.0, "MACD line should be positive: {result:?}");
    }

    #[test]
    fn macd_signal_equals_line_and_histogram_is_zero() {
        let prices: Vec<f64> = (0..80).map(|i| 10.0 + (i as f64 / 3.0).sin()).collect();
        let result = macd(&prices).unwrap();
        assert_eq!(result.signal, result.macd);
        assert_eq!(result.histogram, 0.0);
    }

    #[test]
    fn macd_of_constant_series_is_zero() {
        let result = macd(&[1.0; 60]).unwrap();
        assert_eq!(result, MacdResult { macd: 0.0, signal: 0.0, histogram: 0.0 });
    }
}
