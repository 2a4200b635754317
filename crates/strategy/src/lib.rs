pub mod config;
pub mod indicators;
pub mod params;

pub use config::GridFileConfig;
pub use params::{RawStrategyParams, Strategy, StrategyParams};
