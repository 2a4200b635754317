use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use common::{Error, Result, StrategyKind, Trade, TradeOutcome};
use strategy::StrategyParams;

/// Candles before this index are never eligible for entry.
pub const WARMUP_CANDLES: usize = 50;
pub const MIN_BACKTEST_CANDLES: usize = WARMUP_CANDLES + 1;

/// Aggregated outcome of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy_kind: StrategyKind,
    pub params: StrategyParams,
    /// Human-readable entry rule, e.g. `EMA(9/21)`.
    pub entry_type: String,
    pub trade_count: usize,
    /// 0 when no trades were closed.
    pub win_rate_pct: f64,
    /// 0 when no trades were closed.
    pub avg_roi_pct: f64,
    pub total_pnl_pct: f64,
    /// Worst single trade pnl (not an equity-curve drawdown). 0 when no trades were closed.
    pub max_drawdown_pct: f64,
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    fn from_trades(params: &StrategyParams, trades: Vec<Trade>) -> Self {
        let trade_count = trades.len();
        let wins = trades
            .iter()
            .filter(|t| t.outcome == TradeOutcome::Win)
            .count();
        let total_pnl_pct: f64 = trades.iter().map(|t| t.pnl_pct).sum();

        let (win_rate_pct, avg_roi_pct, max_drawdown_pct) = if trade_count == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let worst = trades
                .iter()
                .map(|t| t.pnl_pct)
                .fold(f64::INFINITY, f64::min);
            (
                wins as f64 / trade_count as f64 * 100.0,
                total_pnl_pct / trade_count as f64,
                worst,
            )
        };

        Self {
            strategy_kind: params.kind(),
            params: *params,
            entry_type: params.to_string(),
            trade_count,
            win_rate_pct,
            avg_roi_pct,
            total_pnl_pct,
            max_drawdown_pct,
            trades,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Position {
    #[default]
    Flat,
    Long { entry_price: f64, entry_time: i64 },
}

/// State carried from one candle to the next.
#[derive(Debug, Default)]
struct Replay {
    position: Position,
    trades: Vec<Trade>,
}

impl Replay {
    /// Advance by candle `i`. Entry rules see only `prices[..i]`; exits use `prices[i]`.
    fn step(self, params: &StrategyParams, prices: &[f64], timestamps: &[i64], i: usize) -> Result<Self> {
        let current = prices[i];
        let now = timestamps[i];

        match self.position {
            Position::Flat => {
                if !params.strategy.should_enter(&prices[..i], current)? {
                    return Ok(self);
                }
                trace!(index = i, price = current, "Entry");
                Ok(Replay {
                    position: Position::Long {
                        entry_price: current,
                        entry_time: now,
                    },
                    trades: self.trades,
                })
            }
            Position::Long {
                entry_price,
                entry_time,
            } => {
                let pnl_pct = (current - entry_price) / entry_price * 100.0;
                if pnl_pct < params.take_profit_pct && pnl_pct > -params.stop_loss_pct {
                    return Ok(self);
                }

                let trade = Trade {
                    entry_price,
                    exit_price: current,
                    entry_time,
                    exit_time: now,
                    pnl_pct,
                    outcome: TradeOutcome::from_pnl(pnl_pct),
                };
                trace!(index = i, pnl_pct, outcome = %trade.outcome, "Exit");

                let mut trades = self.trades;
                trades.push(trade);
                Ok(Replay {
                    position: Position::Flat,
                    trades,
                })
            }
        }
    }
}

/// Replay `prices` under one long-only entry rule with take-profit/stop-loss exits.
///
/// At most one position is open at a time. Indicators are recomputed on the
/// full prefix at every candle from index 50 onward. A position still open
/// at the end of the series is discarded and counts toward nothing.
/// Needs at least 51 prices and one timestamp per price.
pub fn backtest(prices: &[f64], timestamps: &[i64], params: &StrategyParams) -> Result<BacktestResult> {
    Error::ensure_len(prices.len(), MIN_BACKTEST_CANDLES)?;
    Error::ensure_paired("timestamp", prices.len(), timestamps.len())?;
    params.validate()?;

    let replay = (WARMUP_CANDLES..prices.len()).try_fold(Replay::default(), |state, i| {
        state.step(params, prices, timestamps, i)
    })?;

    if let Position::Long { entry_price, .. } = replay.position {
        debug!(entry = %params, entry_price, "Discarding position still open at end of series");
    }

    let result = BacktestResult::from_trades(params, replay.trades);
    debug!(
        entry = %result.entry_type,
        tp = params.take_profit_pct,
        sl = params.stop_loss_pct,
        trades = result.trade_count,
        total_pnl_pct = result.total_pnl_pct,
        "Backtest finished"
    );
    Ok(result)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
