use crate::config::Config;
use crate::domain::market::Timeframe;

#[test]
fn test_defaults_without_env() {
    let config = Config::from_env().unwrap();

    assert_eq!(config.default_timeframe, Timeframe::OneHour);
    assert_eq!(config.macd_fast_period, 12);
    assert_eq!(config.macd_slow_period, 26);
    assert_eq!(config.macd_signal_period, 9);
    assert_eq!(config.min_zone_duration, 2);
    assert!((config.hypothesis_alpha - 0.05).abs() < 1e-12);
}

#[test]
fn test_env_override_and_bad_value() {
    // SAFETY: test process; no other thread reads these keys concurrently
    unsafe {
        std::env::set_var("BQUANT_RSI_PERIOD", "21");
    }
    let config = Config::from_env().unwrap();
    assert_eq!(config.rsi_period, 21);

    unsafe {
        std::env::set_var("BQUANT_RSI_PERIOD", "not-a-number");
    }
    assert!(Config::from_env().is_err());

    unsafe {
        std::env::remove_var("BQUANT_RSI_PERIOD");
    }
}
