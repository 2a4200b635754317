use backtest::{backtest, run_grid};
use common::TradeOutcome;
use proptest::prelude::*;
use proptest::strategy::Strategy as _;
use strategy::{GridFileConfig, Strategy, StrategyParams};

fn entry_rule() -> impl proptest::strategy::Strategy<Value = Strategy> {
    prop_oneof![
        (1usize..10, 10usize..40).prop_map(|(fast, slow)| Strategy::Ema { fast, slow }),
        (10.0f64..60.0).prop_map(|threshold| Strategy::Rsi { threshold }),
        Just(Strategy::Bollinger),
    ]
}

/// Random walk of multiplicative steps, always positive.
fn random_walk() -> impl proptest::strategy::Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.04f64..0.04f64, 51..160).prop_map(|steps| {
        steps
            .iter()
            .scan(100.0, |price, step| {
                *price *= 1.0 + step;
                Some(*price)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Aggregates are consistent with the recorded trades and never NaN.
    #[test]
    fn aggregates_match_trades(
        prices in random_walk(),
        rule in entry_rule(),
        tp in 0.5f64..10.0,
        sl in 0.5f64..10.0,
    ) {
        let times: Vec<i64> = (0..prices.len() as i64).map(|i| i * 60).collect();
        let params = StrategyParams::new(rule, tp, sl).unwrap();
        let result = backtest(&prices, &times, &params).unwrap();

        prop_assert_eq!(result.trade_count, result.trades.len());
        prop_assert!(result.win_rate_pct.is_finite());
        prop_assert!(result.avg_roi_pct.is_finite());
        prop_assert!((0.0..=100.0).contains(&result.win_rate_pct));

        let total: f64 = result.trades.iter().map(|t| t.pnl_pct).sum();
        prop_assert!((result.total_pnl_pct - total).abs() < 1e-9);

        for trade in &result.trades {
            // Every close hit one of the two exits
            prop_assert!(trade.pnl_pct >= tp || trade.pnl_pct <= -sl);
            prop_assert_eq!(trade.outcome == TradeOutcome::Win, trade.pnl_pct > 0.0);
            prop_assert!(trade.exit_time > trade.entry_time);
            prop_assert!(trade.entry_time >= 50 * 60);
            prop_assert!(result.max_drawdown_pct <= trade.pnl_pct);
        }

        // Trades never overlap
        for pair in result.trades.windows(2) {
            prop_assert!(pair[1].entry_time > pair[0].exit_time);
        }
    }

    /// Flat series never trade, whatever the parameters.
    #[test]
    fn flat_series_never_trades(
        v in 0.001f64..10_000.0,
        len in 51usize..120,
        rule in entry_rule(),
    ) {
        let prices = vec![v; len];
        let times: Vec<i64> = (0..len as i64).collect();
        let params = StrategyParams::new(rule, 3.0, 1.0).unwrap();
        let result = backtest(&prices, &times, &params).unwrap();
        prop_assert_eq!(result.trade_count, 0);
        prop_assert_eq!(result.win_rate_pct, 0.0);
        prop_assert_eq!(result.avg_roi_pct, 0.0);
    }

    /// The grid returns one ranked result per combination.
    #[test]
    fn grid_is_complete_and_ranked(prices in random_walk()) {
        let times: Vec<i64> = (0..prices.len() as i64).collect();
        let sets = GridFileConfig::default().param_sets().unwrap();
        let results = run_grid(&prices, &times, &sets).unwrap();
        prop_assert_eq!(results.len(), sets.len());
        prop_assert!(results.windows(2).all(|w| w[0].total_pnl_pct >= w[1].total_pnl_pct));
    }
}
