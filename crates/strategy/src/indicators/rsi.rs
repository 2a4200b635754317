use common::{Error, Result};

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Wilder step weight. Fixed at 14 whatever the seed period.
const SMOOTHING: f64 = 14.0;

/// RSI (Relative Strength Index).
///
/// Seeds average gain/loss from the first `period` changes at the *start* of
/// the series, then applies a single Wilder smoothing step with the change
/// between the last two values, however long the series is. The step always
/// weighs 13/14 old to 1/14 new, independent of `period`. A change of zero
/// counts toward gains.
///
/// Returns 100 when the smoothed average loss is zero.
/// Needs at least `period + 2` values.
pub fn rsi(series: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(Error::InvalidParameter("RSI period must be >= 1".into()));
    }
    Error::ensure_len(series.len(), period + 2)?;

    let (gains, losses) = series[..=period]
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change >= 0.0 {
                (gains + change, losses)
            } else {
                (gains, losses - change)
            }
        });

    let p = period as f64;
    let n = series.len();
    let last_change = series[n - 1] - series[n - 2];

    let avg_gain = ((gains / p) * (SMOOTHING - 1.0) + last_change.max(0.0)) / SMOOTHING;
    let avg_loss = ((losses / p) * (SMOOTHING - 1.0) + (-last_change).max(0.0)) / SMOOTHING;

    if avg_loss == 0.0 {
        return Ok(100.0);
    }

    let rs = avg_gain / avg_loss;
    Ok(100.0 - 100.0 / (1.0 + rs))
}

/// [`rsi`] with the standard 14-period lookback.
pub fn rsi_default(series: &[f64]) -> Result<f64> {
    rsi(series, DEFAULT_RSI_PERIOD)
}
