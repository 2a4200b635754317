use serde::{Deserialize, Serialize};

use common::{Error, Result, StrategyKind};

use crate::indicators::rsi::DEFAULT_RSI_PERIOD;
use crate::indicators::{bollinger_bands_default, ema, rsi};

/// Entry rule replayed by the backtester, with the parameters its kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum Strategy {
    /// Enter when the fast EMA crosses above the slow EMA.
    Ema { fast: usize, slow: usize },
    /// Enter when RSI(14) drops below `threshold`.
    Rsi { threshold: f64 },
    /// Enter when the close is below the lower Bollinger band (20, 2σ).
    #[serde(rename = "BB")]
    Bollinger,
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Ema { .. } => StrategyKind::Ema,
            Strategy::Rsi { .. } => StrategyKind::Rsi,
            Strategy::Bollinger => StrategyKind::Bb,
        }
    }

    /// Evaluate the entry rule on the history that precedes `current`.
    ///
    /// `history` is recomputed from its first element on every call; the
    /// EMA seed depends on where the slice starts.
    pub fn should_enter(&self, history: &[f64], current: f64) -> Result<bool> {
        match *self {
            Strategy::Ema { fast, slow } => {
                let fast_line = ema(history, fast)?;
                let slow_line = ema(history, slow)?;
                // ema() needs period + 1 >= 2 values, so both lines have a previous element
                let n = history.len();
                Ok(fast_line[n - 1] > slow_line[n - 1] && fast_line[n - 2] <= slow_line[n - 2])
            }
            Strategy::Rsi { threshold } => Ok(rsi(history, DEFAULT_RSI_PERIOD)? < threshold),
            Strategy::Bollinger => Ok(current < bollinger_bands_default(history)?.lower),
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Strategy::Ema { fast, slow } => {
                if fast == 0 || slow == 0 {
                    return Err(Error::InvalidParameter(
                        "EMA periods must be >= 1".into(),
                    ));
                }
                if fast >= slow {
                    return Err(Error::InvalidParameter(format!(
                        "EMA fast period ({fast}) must be less than slow period ({slow})"
                    )));
                }
            }
            Strategy::Rsi { threshold } => {
                if !threshold.is_finite() || threshold <= 0.0 || threshold > 100.0 {
                    return Err(Error::InvalidParameter(format!(
                        "RSI threshold must be within (0, 100], got {threshold}"
                    )));
                }
            }
            Strategy::Bollinger => {}
        }
        Ok(())
    }
}

/// A complete, validated backtest parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub strategy: Strategy,
    /// Close in profit once pnl reaches this percent.
    pub take_profit_pct: f64,
    /// Close in loss once pnl falls to minus this percent.
    pub stop_loss_pct: f64,
}

impl StrategyParams {
    pub fn new(strategy: Strategy, take_profit_pct: f64, stop_loss_pct: f64) -> Result<Self> {
        let params = Self {
            strategy,
            take_profit_pct,
            stop_loss_pct,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Re-check invariants on a value built without [`StrategyParams::new`]
    /// (e.g. deserialized directly).
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("take-profit", self.take_profit_pct),
            ("stop-loss", self.stop_loss_pct),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "{name} percent must be a positive number, got {value}"
                )));
            }
        }
        self.strategy.validate()
    }
}

/// Entry label shown next to results, e.g. `EMA(9/21)`.
impl std::fmt::Display for StrategyParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.strategy {
            Strategy::Ema { fast, slow } => write!(f, "EMA({fast}/{slow})"),
            Strategy::Rsi { threshold } => write!(f, "RSI < {threshold}"),
            Strategy::Bollinger => write!(f, "BB Lower Touch"),
        }
    }
}

/// Loosely-typed parameter set as written in config files.
///
/// Example:
/// ```toml
/// [[params]]
/// kind = "EMA"
/// take_profit = 4.0
/// stop_loss = 1.5
/// ema_fast = 5
/// ema_slow = 30
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawStrategyParams {
    pub kind: StrategyKind,
    pub take_profit: f64,
    pub stop_loss: f64,
    #[serde(default)]
    pub ema_fast: Option<usize>,
    #[serde(default)]
    pub ema_slow: Option<usize>,
    #[serde(default)]
    pub rsi_threshold: Option<f64>,
}

impl TryFrom<RawStrategyParams> for StrategyParams {
    type Error = Error;

    fn try_from(raw: RawStrategyParams) -> Result<Self> {
        let strategy = match raw.kind {
            StrategyKind::Ema => match (raw.ema_fast, raw.ema_slow) {
                (Some(fast), Some(slow)) => Strategy::Ema { fast, slow },
                _ => {
                    return Err(Error::InvalidParameter(
                        "EMA strategy requires both ema_fast and ema_slow".into(),
                    ))
                }
            },
            StrategyKind::Rsi => match raw.rsi_threshold {
                Some(threshold) => Strategy::Rsi { threshold },
                None => {
                    return Err(Error::InvalidParameter(
                        "RSI strategy requires rsi_threshold".into(),
                    ))
                }
            },
            StrategyKind::Bb => Strategy::Bollinger,
        };
        StrategyParams::new(strategy, raw.take_profit, raw.stop_loss)
    }
}
