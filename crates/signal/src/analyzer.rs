//! Weighted heuristic signal over the latest candle.
//!
//! Each rule adds (or subtracts) points and records a reason. The signed total
//! decides the classification; its magnitude is the reported confidence.

use chrono::{DateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{Error, LevelKind, PriceLevel, Result, Signal, SignalKind};
use strategy::indicators::{
    bollinger_bands_default, ema_last, macd, rsi_default, BollingerBands, MacdResult,
};

/// Bounded by the MACD slow lookback.
pub const MIN_ANALYSIS_CANDLES: usize = 27;

const EMA_FAST_PERIOD: usize = 9;
const EMA_SLOW_PERIOD: usize = 21;

/// UTC hours (inclusive) with the deepest liquidity.
const ACTIVE_HOURS: std::ops::RangeInclusive<u32> = 13..=21;
const HIGH_VOLATILITY_WIDTH: f64 = 0.1;
const VOLATILITY_DAMPING: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    /// Percent change between the last two closes.
    pub price_change_pct: f64,
    /// Last volume over mean volume. 0 when the mean is 0.
    pub volume_spike: f64,
}

/// Indicator snapshot the signal was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub rsi: f64,
    pub macd: MacdResult,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub bollinger: BollingerBands,
    pub bb_width: f64,
    pub momentum: Momentum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub signal: Signal,
    /// Entry, take-profit and stop-loss, in that order.
    pub levels: [PriceLevel; 3],
    pub metrics: Metrics,
}

/// Running score plus the reasons that moved it.
#[derive(Debug, Default)]
struct Score {
    points: f64,
    reasons: Vec<String>,
}

impl Score {
    fn add(&mut self, points: f64, reason: &str) {
        self.points += points;
        self.reasons.push(reason.to_string());
    }

    fn into_signal(self) -> Signal {
        Signal {
            kind: SignalKind::from_confidence(self.points),
            confidence_pct: self.points.abs(),
            reasons: self.reasons,
        }
    }
}

/// Analyze the latest candle of paired close/volume/time series.
///
/// Needs at least 27 candles; volumes and timestamps must pair with prices.
pub fn analyze(prices: &[f64], volumes: &[f64], timestamps: &[i64]) -> Result<Analysis> {
    Error::ensure_len(prices.len(), MIN_ANALYSIS_CANDLES)?;
    Error::ensure_paired("volume", prices.len(), volumes.len())?;
    Error::ensure_paired("timestamp", prices.len(), timestamps.len())?;

    let metrics = compute_metrics(prices, volumes)?;
    let current = prices[prices.len() - 1];
    let hour = utc_hour(timestamps[timestamps.len() - 1])?;

    let signal = evaluate(&metrics, current, hour);
    let levels = price_levels(current, metrics.bb_width);

    debug!(
        kind = %signal.kind,
        confidence_pct = signal.confidence_pct,
        reasons = signal.reasons.len(),
        "Signal evaluated"
    );

    Ok(Analysis {
        signal,
        levels,
        metrics,
    })
}

fn compute_metrics(prices: &[f64], volumes: &[f64]) -> Result<Metrics> {
    let bollinger = bollinger_bands_default(prices)?;
    Ok(Metrics {
        rsi: rsi_default(prices)?,
        macd: macd(prices)?,
        ema_fast: ema_last(prices, EMA_FAST_PERIOD)?,
        ema_slow: ema_last(prices, EMA_SLOW_PERIOD)?,
        bb_width: bollinger.width(),
        bollinger,
        momentum: Momentum {
            price_change_pct: last_change_pct(prices),
            volume_spike: volume_spike(volumes),
        },
    })
}

fn last_change_pct(prices: &[f64]) -> f64 {
    match prices {
        [.., prev, last] if *prev != 0.0 => (last - prev) / prev * 100.0,
        _ => 0.0,
    }
}

pub(crate) fn volume_spike(volumes: &[f64]) -> f64 {
    let Some(last) = volumes.last() else {
        return 0.0;
    };
    let mean = volumes.iter().sum::<f64>() / volumes.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    last / mean
}

fn utc_hour(timestamp: i64) -> Result<u32> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|t| t.hour())
        .ok_or_else(|| Error::InvalidParameter(format!("timestamp {timestamp} is out of range")))
}

/// Apply the weighted rules in order.
fn evaluate(m: &Metrics, close: f64, hour: u32) -> Signal {
    let mut score = Score::default();
    let change = m.momentum.price_change_pct;
    let spike = m.momentum.volume_spike;

    if ACTIVE_HOURS.contains(&hour) {
        score.add(10.0, "active trading hours (13-21 UTC)");
    }

    if m.ema_fast > m.ema_slow {
        if change > 3.0 {
            score.add(30.0, "strong bullish momentum");
        } else {
            score.add(20.0, "bullish trend (EMA9 > EMA21)");
        }
    } else if change < -3.0 {
        score.add(-30.0, "strong bearish momentum");
    } else {
        score.add(-20.0, "bearish trend (EMA9 <= EMA21)");
    }

    if spike > 2.5 {
        score.add(25.0, "very high volume spike");
    } else if spike > 1.5 {
        score.add(15.0, "above-average volume");
    } else if spike < 0.5 {
        score.add(-15.0, "low volume");
    }

    if m.rsi < 30.0 && spike > 1.2 {
        score.add(35.0, "oversold with volume confirmation");
    } else if m.rsi > 70.0 && spike > 1.2 {
        score.add(-35.0, "overbought with volume confirmation");
    }

    let MacdResult {
        signal, histogram, ..
    } = m.macd;
    if histogram > 0.0 && histogram > signal {
        if change > 2.0 {
            score.add(25.0, "MACD bullish with price acceleration");
        } else {
            score.add(15.0, "MACD bullish");
        }
    } else if histogram < 0.0 && histogram < signal {
        if change < -2.0 {
            score.add(-25.0, "MACD bearish with price acceleration");
        } else {
            score.add(-15.0, "MACD bearish");
        }
    }

    if close < m.bollinger.lower && spike > 1.2 {
        score.add(30.0, "close below lower band on volume");
    } else if close > m.bollinger.upper && spike > 1.2 {
        score.add(-30.0, "close above upper band on volume");
    }

    if m.bb_width > HIGH_VOLATILITY_WIDTH {
        score.points *= VOLATILITY_DAMPING;
        score.reasons.push("high volatility, reducing confidence".to_string());
    }

    score.into_signal()
}

/// Entry below, take-profit above and stop-loss below the close, widened by volatility.
fn price_levels(current: f64, bb_width: f64) -> [PriceLevel; 3] {
    let vf = (bb_width * 10.0).max(1.0);
    [
        PriceLevel::new(LevelKind::Entry, current * (1.0 - 0.02 * vf), current, 80.0),
        PriceLevel::new(LevelKind::Tp, current * (1.0 + 0.05 * vf), current, 70.0),
        PriceLevel::new(LevelKind::Sl, current * (1.0 - 0.03 * vf), current, 60.0),
    ]
}

// ─── Tests ────────────────────────────────────────────────────────────────────
