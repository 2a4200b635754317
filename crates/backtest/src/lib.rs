pub mod engine;
pub mod grid;
pub mod setup;

pub use engine::{backtest, BacktestResult, MIN_BACKTEST_CANDLES, WARMUP_CANDLES};
pub use grid::{rank, run_grid, run_grid_with_threads};
pub use setup::{current_setup, TradeSetup};
