pub mod analyzer;
pub mod report;

pub use analyzer::{analyze, Analysis, Metrics, Momentum, MIN_ANALYSIS_CANDLES};
pub use report::{summarize, RsiZone, TechnicalSummary, Trend};
