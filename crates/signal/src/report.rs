use serde::{Deserialize, Serialize};

use common::{Error, Result};
use strategy::indicators::{bollinger_bands_default, ema_last, macd, rsi_default, BollingerBands};

use crate::analyzer::{volume_spike, MIN_ANALYSIS_CANDLES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn from_rsi(rsi: f64) -> Self {
        if rsi > 70.0 {
            RsiZone::Overbought
        } else if rsi < 30.0 {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

/// Plain indicator readout for the latest candle, no scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    pub price: f64,
    pub ema9: f64,
    pub ema21: f64,
    /// Bullish when the close is above EMA21.
    pub trend: Trend,
    pub rsi: f64,
    pub rsi_zone: RsiZone,
    pub macd_histogram: f64,
    pub bollinger: BollingerBands,
    /// Last volume as a percent of mean volume. 0 when the mean is 0.
    pub volume_ratio_pct: f64,
}

pub fn summarize(prices: &[f64], volumes: &[f64]) -> Result<TechnicalSummary> {
    Error::ensure_len(prices.len(), MIN_ANALYSIS_CANDLES)?;
    Error::ensure_paired("volume", prices.len(), volumes.len())?;

    let price = prices[prices.len() - 1];
    let ema21 = ema_last(prices, 21)?;
    let rsi = rsi_default(prices)?;

    Ok(TechnicalSummary {
        price,
        ema9: ema_last(prices, 9)?,
        ema21,
        trend: if price > ema21 {
            Trend::Bullish
        } else {
            Trend::Bearish
        },
        rsi,
        rsi_zone: RsiZone::from_rsi(rsi),
        macd_histogram: macd(prices)?.histogram,
        bollinger: bollinger_bands_default(prices)?,
        volume_ratio_pct: volume_spike(volumes) * 100.0,
    })
}
