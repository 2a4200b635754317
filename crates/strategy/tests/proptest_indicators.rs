use proptest::prelude::*;
use strategy::indicators::{bollinger_bands, ema, macd, rsi};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(1.0)
}

proptest! {
    /// A constant series is a fixed point of every indicator.
    #[test]
    fn constant_series_is_fixed_point(
        v in 0.0001f64..1_000_000.0f64,
        period in 1usize..40,
    ) {
        let prices = vec![v; period + 30];

        let line = ema(&prices, period).unwrap();
        prop_assert!(line.iter().all(|&x| x == v));

        let bb = bollinger_bands(&prices, period, 2.0).unwrap();
        prop_assert!(close(bb.middle, v));
        prop_assert!(close(bb.upper, v));
        prop_assert!(close(bb.lower, v));

        let value = rsi(&prices, period).unwrap();
        prop_assert!(value.is_finite());
        prop_assert_eq!(value, 100.0);
    }

    /// RSI stays inside [0, 100] and never produces NaN or infinity.
    #[test]
    fn rsi_is_bounded(
        prices in prop::collection::vec(0.0001f64..10_000.0f64, 16..200),
        period in 1usize..14,
    ) {
        let value = rsi(&prices, period).unwrap();
        prop_assert!(value.is_finite());
        prop_assert!((0.0..=100.0).contains(&value), "RSI out of range: {}", value);
    }

    /// The MACD signal line degenerates to the MACD line.
    #[test]
    fn macd_histogram_is_always_zero(
        prices in prop::collection::vec(0.0001f64..10_000.0f64, 27..200),
    ) {
        let result = macd(&prices).unwrap();
        prop_assert_eq!(result.histogram, 0.0);
        prop_assert_eq!(result.signal, result.macd);
    }

    #[test]
    fn bollinger_bands_are_ordered(
        prices in prop::collection::vec(0.0001f64..10_000.0f64, 22..120),
        multiplier in 0.1f64..4.0f64,
    ) {
        let bb = bollinger_bands(&prices, 20, multiplier).unwrap();
        prop_assert!(bb.upper >= bb.middle);
        prop_assert!(bb.middle >= bb.lower);
    }

    #[test]
    fn ema_preserves_length(
        prices in prop::collection::vec(0.0001f64..10_000.0f64, 2..200),
        period in 1usize..50,
    ) {
        prop_assume!(prices.len() > period);
        prop_assert_eq!(ema(&prices, period).unwrap().len(), prices.len());
    }
}
