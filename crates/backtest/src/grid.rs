//! Parallel grid search: one independent [`backtest`] per parameter set.

use rayon::prelude::*;
use tracing::info;

use common::{Error, Result};
use strategy::StrategyParams;

use crate::engine::{backtest, BacktestResult};

/// Backtest every parameter set on rayon's current pool and rank the results.
///
/// The first failing run aborts the batch.
pub fn run_grid(
    prices: &[f64],
    timestamps: &[i64],
    param_sets: &[StrategyParams],
) -> Result<Vec<BacktestResult>> {
    info!(
        combinations = param_sets.len(),
        candles = prices.len(),
        threads = rayon::current_num_threads(),
        "Running parameter grid"
    );

    let mut results = param_sets
        .par_iter()
        .map(|params| backtest(prices, timestamps, params))
        .collect::<Result<Vec<_>>>()?;

    rank(&mut results);

    if let Some(best) = results.first() {
        info!(
            kind = %best.strategy_kind,
            entry = %best.entry_type,
            tp = best.params.take_profit_pct,
            sl = best.params.stop_loss_pct,
            total_pnl_pct = best.total_pnl_pct,
            trades = best.trade_count,
            "Best parameter set"
        );
    }
    Ok(results)
}

/// [`run_grid`] on a dedicated pool of `threads` workers.
pub fn run_grid_with_threads(
    prices: &[f64],
    timestamps: &[i64],
    param_sets: &[StrategyParams],
    threads: usize,
) -> Result<Vec<BacktestResult>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::Config(format!("failed to build grid thread pool: {e}")))?;
    pool.install(|| run_grid(prices, timestamps, param_sets))
}

/// Sort by total pnl, best first. Ties keep grid order.
pub fn rank(results: &mut [BacktestResult]) {
    results.sort_by(|a, b| b.total_pnl_pct.total_cmp(&a.total_pnl_pct));
}
