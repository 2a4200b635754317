//! Pure indicator functions over close-price series (oldest first).

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use bollinger::{bollinger_bands, bollinger_bands_default, BollingerBands};
pub use ema::{ema, ema_last};
pub use macd::{macd, MacdResult};
pub use rsi::{rsi, rsi_default};
