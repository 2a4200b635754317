use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use common::{Error, Result};

use crate::params::{RawStrategyParams, Strategy, StrategyParams};

/// Parameter grid file (TOML).
///
/// Example `config/grid.toml`:
/// ```toml
/// [ema]
/// pairs = [[7, 21], [9, 21], [12, 26]]
/// take_profit = [3.0, 5.0, 7.0]
/// stop_loss = [1.0, 2.0, 3.0]
///
/// [rsi]
/// thresholds = [25.0, 30.0]
/// take_profit = [5.0, 7.0, 10.0]
/// stop_loss = [2.0, 3.0]
///
/// [bb]
/// take_profit = [3.0, 5.0, 7.0]
/// stop_loss = [1.0, 2.0, 3.0]
/// ```
///
/// Any section may be omitted to skip that strategy kind. Extra one-off
/// combinations go in `[[params]]` tables (see [`RawStrategyParams`]).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GridFileConfig {
    #[serde(default)]
    pub ema: Option<EmaGrid>,
    #[serde(default)]
    pub rsi: Option<RsiGrid>,
    #[serde(default)]
    pub bb: Option<BbGrid>,
    #[serde(default)]
    pub params: Vec<RawStrategyParams>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EmaGrid {
    /// `[fast, slow]` period pairs.
    pub pairs: Vec<[usize; 2]>,
    pub take_profit: Vec<f64>,
    pub stop_loss: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RsiGrid {
    pub thresholds: Vec<f64>,
    pub take_profit: Vec<f64>,
    pub stop_loss: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BbGrid {
    pub take_profit: Vec<f64>,
    pub stop_loss: Vec<f64>,
}

impl Default for GridFileConfig {
    fn default() -> Self {
        Self {
            ema: Some(EmaGrid {
                pairs: vec![[7, 21], [9, 21], [12, 26]],
                take_profit: vec![3.0, 5.0, 7.0],
                stop_loss: vec![1.0, 2.0, 3.0],
            }),
            rsi: Some(RsiGrid {
                thresholds: vec![25.0, 30.0],
                take_profit: vec![5.0, 7.0, 10.0],
                stop_loss: vec![2.0, 3.0],
            }),
            bb: Some(BbGrid {
                take_profit: vec![3.0, 5.0, 7.0],
                stop_loss: vec![1.0, 2.0, 3.0],
            }),
            params: Vec::new(),
        }
    }
}

impl GridFileConfig {
    /// Load from a TOML file. A missing file falls back to the default grid.
    pub fn load(path: &str) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                info!(path, "Loaded parameter grid");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path, "Grid config not found, using default grid");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Expand the grid into validated parameter sets, EMA first, then RSI,
    /// BB and finally the explicit `[[params]]` entries.
    pub fn param_sets(&self) -> Result<Vec<StrategyParams>> {
        let mut sets = Vec::new();

        if let Some(grid) = &self.ema {
            for &[fast, slow] in &grid.pairs {
                push_tp_sl(&mut sets, Strategy::Ema { fast, slow }, &grid.take_profit, &grid.stop_loss)?;
            }
        }
        if let Some(grid) = &self.rsi {
            for &threshold in &grid.thresholds {
                push_tp_sl(&mut sets, Strategy::Rsi { threshold }, &grid.take_profit, &grid.stop_loss)?;
            }
        }
        if let Some(grid) = &self.bb {
            push_tp_sl(&mut sets, Strategy::Bollinger, &grid.take_profit, &grid.stop_loss)?;
        }
        for raw in &self.params {
            sets.push(StrategyParams::try_from(raw.clone())?);
        }

        if sets.is_empty() {
            return Err(Error::Config("parameter grid is empty".into()));
        }
        Ok(sets)
    }
}

fn push_tp_sl(
    sets: &mut Vec<StrategyParams>,
    strategy: Strategy,
    take_profit: &[f64],
    stop_loss: &[f64],
) -> Result<()> {
    for &tp in take_profit {
        for &sl in stop_loss {
            sets.push(StrategyParams::new(strategy, tp, sl)?);
        }
    }
    Ok(())
}
