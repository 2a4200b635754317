use common::{Error, Result};

/// Exponential Moving Average over the whole series.
///
/// The first element is seeded with `series[0]` (not an SMA of the first
/// `period` values), so the output has the same length as the input and
/// depends on where the slice starts.
/// Needs at least `period + 1` values.
pub fn ema(series: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(Error::InvalidParameter("EMA period must be >= 1".into()));
    }
    Error::ensure_len(series.len(), period + 1)?;
    Ok(smooth(series, period))
}

/// Last value of [`ema`].
pub fn ema_last(series: &[f64], period: usize) -> Result<f64> {
    let line = ema(series, period)?;
    // ema() guarantees at least two elements
    Ok(line[line.len() - 1])
}

/// Unchecked EMA recurrence. An empty input yields an empty output.
pub(crate) fn smooth(series: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let Some((&first, rest)) = series.split_first() else {
        return out;
    };

    let mut prev = first;
    out.push(prev);
    for &price in rest {
        prev = (price - prev) * k + prev;
        out.push(prev);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_output_length_matches_input() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let line = ema(&prices, 9).unwrap();
        assert_eq!(line.len(), prices.len());
    }

    #[test]
    fn ema_is_seeded_with_first_price() {
        let prices = vec![10.0, 20.0, 30.0];
        let line = ema(&prices, 2).unwrap();
        assert_eq!(line[0], 10.0);
        // k = 2/3
        assert!((line[1] - (10.0 + (20.0 - 10.0) * 2.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn ema_of_constant_series_is_constant() {
        let prices = vec![42.5; 40];
        let line = ema(&prices, 21).unwrap();
        assert!(line.iter().all(|&v| v == 42.5), "EMA drifted: {line:?}");
    }

    #[test]
    fn ema_requires_period_plus_one_values() {
        let prices = vec![1.0; 9];
        assert!(matches!(
            ema(&prices, 9),
            Err(Error::InsufficientData { required: 10, actual: 9 })
        ));
        assert!(ema(&[1.0; 10], 9).is_ok());
    }

    #[test]
    fn ema_rejects_zero_period() {
        assert!(matches!(ema(&[1.0; 5], 0), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn ema_depends_on_slice_start() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let full = ema_last(&prices, 9).unwrap();
        let tail = ema_last(&prices[10..], 9).unwrap();
        assert_ne!(full, tail);
    }

    #[test]
    fn smooth_of_single_value_is_that_value() {
        assert_eq!(smooth(&[3.25], 9), vec![3.25]);
        assert!(smooth(&[], 9).is_empty());
    }
}
