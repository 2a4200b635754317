use serde::{Deserialize, Serialize};

/// One OHLCV candle as delivered by the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time, unix seconds.
    pub time: i64,
    #[serde(default)]
    pub open: f64,
    pub close: f64,
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Chart payload, oldest candle first.
///
/// Example `chart.json`:
/// ```json
/// { "oclhv": [ { "time": 1700000000, "open": 1.0, "close": 1.01, "low": 0.99, "high": 1.02, "volume": 1200.0 } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub oclhv: Vec<Candle>,
}

impl ChartData {
    /// Parse a chart payload from JSON text.
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.oclhv.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.oclhv.iter().map(|c| c.volume).collect()
    }

    pub fn times(&self) -> Vec<i64> {
        self.oclhv.iter().map(|c| c.time).collect()
    }

    pub fn len(&self) -> usize {
        self.oclhv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oclhv.is_empty()
    }
}

/// Which entry rule a backtest replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrategyKind {
    Ema,
    Rsi,
    Bb,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Ema => write!(f, "EMA"),
            StrategyKind::Rsi => write!(f, "RSI"),
            StrategyKind::Bb => write!(f, "BB"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeOutcome {
    Win,
    Loss,
}

impl TradeOutcome {
    /// A trade is a win only when it closed strictly in profit.
    pub fn from_pnl(pnl_pct: f64) -> Self {
        if pnl_pct > 0.0 {
            TradeOutcome::Win
        } else {
            TradeOutcome::Loss
        }
    }
}

impl std::fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeOutcome::Win => write!(f, "WIN"),
            TradeOutcome::Loss => write!(f, "LOSS"),
        }
    }
}

/// A closed long position recorded during a backtest replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_price: f64,
    pub exit_price: f64,
    /// Unix seconds.
    pub entry_time: i64,
    /// Unix seconds.
    pub exit_time: i64,
    pub pnl_pct: f64,
    pub outcome: TradeOutcome,
}

/// Heuristic classification produced by the signal analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl SignalKind {
    pub const STRONG_THRESHOLD: f64 = 70.0;
    pub const THRESHOLD: f64 = 40.0;

    /// Classify a signed confidence score.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= Self::STRONG_THRESHOLD {
            SignalKind::StrongBuy
        } else if confidence >= Self::THRESHOLD {
            SignalKind::Buy
        } else if confidence <= -Self::STRONG_THRESHOLD {
            SignalKind::StrongSell
        } else if confidence <= -Self::THRESHOLD {
            SignalKind::Sell
        } else {
            SignalKind::Neutral
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::StrongBuy => write!(f, "STRONG BUY"),
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Neutral => write!(f, "NEUTRAL"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::StrongSell => write!(f, "STRONG SELL"),
        }
    }
}

/// Classification plus the reasons that produced it, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    /// Absolute value of the signed score. Not clamped to 100.
    pub confidence_pct: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LevelKind {
    Entry,
    Tp,
    Sl,
}

/// Suggested price level relative to the current close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub kind: LevelKind,
    pub price: f64,
    pub confidence_pct: f64,
    /// Signed distance from the current close, in percent.
    pub offset_pct: f64,
}

impl PriceLevel {
    pub fn new(kind: LevelKind, price: f64, current: f64, confidence_pct: f64) -> Self {
        Self {
            kind,
            price,
            confidence_pct,
            offset_pct: (price - current) / current * 100.0,
        }
    }
}
