// Timeframe intervals
pub mod timeframe;

// OHLCV bars and column-bearing series
pub mod ohlcv;

pub use ohlcv::{OhlcvBar, OhlcvSeries};
pub use timeframe::Timeframe;
