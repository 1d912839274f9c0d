use crate::domain::market::Timeframe;
use anyhow::{Context, Result};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Process-level configuration, loaded from environment variables with
/// sensible defaults. Per-run analysis settings live in TOML run configs
/// (`application::pipeline::RunConfig`), not here.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    pub default_symbol: String,
    pub default_timeframe: Timeframe,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub rsi_period: usize,
    pub min_zone_duration: usize,
    pub hypothesis_alpha: f64,
    pub bootstrap_iterations: usize,
    pub random_seed: u64,
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {}", key)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            data_dir: PathBuf::from(
                env::var("BQUANT_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            ),
            results_dir: PathBuf::from(
                env::var("BQUANT_RESULTS_DIR").unwrap_or_else(|_| "results".to_string()),
            ),
            default_symbol: env::var("BQUANT_SYMBOL").unwrap_or_else(|_| "XAUUSD".to_string()),
            default_timeframe: parse_env("BQUANT_TIMEFRAME", Timeframe::OneHour)?,
            macd_fast_period: parse_env("BQUANT_MACD_FAST", 12)?,
            macd_slow_period: parse_env("BQUANT_MACD_SLOW", 26)?,
            macd_signal_period: parse_env("BQUANT_MACD_SIGNAL", 9)?,
            rsi_period: parse_env("BQUANT_RSI_PERIOD", 14)?,
            min_zone_duration: parse_env("BQUANT_MIN_ZONE_DURATION", 2)?,
            hypothesis_alpha: parse_env("BQUANT_ALPHA", 0.05)?,
            bootstrap_iterations: parse_env("BQUANT_BOOTSTRAP_ITERATIONS", 1000)?,
            random_seed: parse_env("BQUANT_SEED", 42)?,
        })
    }
}
