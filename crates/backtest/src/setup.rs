use serde::{Deserialize, Serialize};

use common::{Error, Result, SignalKind};
use strategy::indicators::{bollinger_bands_default, ema_last, rsi_default};
use strategy::Strategy;

use crate::engine::BacktestResult;

/// Trade setup suggested by applying the best backtested rule to the latest candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    /// `Buy` when the rule fires on the latest candle, otherwise `Neutral`.
    pub signal: SignalKind,
    pub confidence_pct: f64,
    pub current_price: f64,
    pub entry: f64,
    /// Entry distance from the current price, in percent.
    pub entry_pct: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// Evaluate the best result's rule on the full series.
///
/// EMA: fast above slow → BUY at market (70%).
/// RSI: below threshold → BUY 1% under market (80%).
/// BB: close below lower band → BUY at the lower band (75%).
pub fn current_setup(best: &BacktestResult, prices: &[f64]) -> Result<TradeSetup> {
    let current = *prices
        .last()
        .ok_or(Error::InsufficientData { required: 1, actual: 0 })?;

    let (signal, confidence_pct, entry, entry_pct) = match best.params.strategy {
        Strategy::Ema { fast, slow } => {
            if ema_last(prices, fast)? > ema_last(prices, slow)? {
                (SignalKind::Buy, 70.0, current, 0.0)
            } else {
                (SignalKind::Neutral, 0.0, current, 0.0)
            }
        }
        Strategy::Rsi { threshold } => {
            if rsi_default(prices)? < threshold {
                (SignalKind::Buy, 80.0, current * 0.99, -1.0)
            } else {
                (SignalKind::Neutral, 0.0, current, 0.0)
            }
        }
        Strategy::Bollinger => {
            let bb = bollinger_bands_default(prices)?;
            if current < bb.lower {
                let entry_pct = (bb.lower - current) / current * 100.0;
                (SignalKind::Buy, 75.0, bb.lower, entry_pct)
            } else {
                (SignalKind::Neutral, 0.0, current, 0.0)
            }
        }
    };

    Ok(TradeSetup {
        signal,
        confidence_pct,
        current_price: current,
        entry,
        entry_pct,
        take_profit: entry * (1.0 + best.params.take_profit_pct / 100.0),
        stop_loss: entry * (1.0 - best.params.stop_loss_pct / 100.0),
    })
}
