//! CSV loading and data-quality behavior on real files.

use bquant::domain::errors::DataError;
use bquant::domain::market::Timeframe;
use bquant::domain::validation::data_quality::check_bars;
use bquant::infrastructure::loaders::{LoadOptions, load_csv};
use bquant::infrastructure::samples;
use std::path::PathBuf;

fn write_temp(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("bquant_dq_{}_{}", std::process::id(), name));
    std::fs::write(&path, content).unwrap();
    path
}

const DIRTY_CSV: &str = "time,open,high,low,close,volume\n\
    1700000000,2000,2005,1998,2003,120\n\
    1700003600,2003,2001,2010,2008,100\n\
    1700007200,2003,2010,2001,2008,130\n\
    1700014400,2008,2012,2006,2010,90\n";

#[test]
fn lenient_load_drops_bad_bars_and_counts_gaps() {
    let path = write_temp("lenient.csv", DIRTY_CSV);
    let options = LoadOptions::new("XAUUSD", Timeframe::OneHour);

    let (series, report) = load_csv(&path, &options).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(report.checked, 4);
    assert_eq!(report.dropped, 1);
    assert_eq!(series.len(), 3);
    // Dropping the bad bar opens one gap; the last row jumps another
    assert_eq!(report.gaps, 2);
    assert!(!report.is_clean());
}

#[test]
fn strict_load_fails_on_dirty_data() {
    let path = write_temp("strict.csv", DIRTY_CSV);
    let mut options = LoadOptions::new("XAUUSD", Timeframe::OneHour);
    options.strict = true;

    let err = load_csv(&path, &options).unwrap_err();
    std::fs::remove_file(&path).ok();

    assert!(matches!(err, DataError::QualityCheckFailed { issues: 1, .. }));
}

#[test]
fn strict_load_accepts_clean_data() {
    let clean = "time,open,high,low,close,volume\n\
        1700000000,2000,2005,1998,2003,120\n\
        1700003600,2003,2010,2001,2008,100\n";
    let path = write_temp("clean.csv", clean);
    let mut options = LoadOptions::new("EURUSD", Timeframe::OneHour);
    options.strict = true;

    let (series, report) = load_csv(&path, &options).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(report.is_clean());
    assert_eq!(series.symbol, "EURUSD");
    assert_eq!(series.len(), 2);
}

#[test]
fn duplicate_timestamps_are_rejected() {
    let dup = "time,open,high,low,close\n\
        1700000000,2000,2005,1998,2003\n\
        1700000000,2003,2010,2001,2008\n";
    let path = write_temp("dup.csv", dup);
    let options = LoadOptions::new("XAUUSD", Timeframe::OneHour);

    let err = load_csv(&path, &options).unwrap_err();
    std::fs::remove_file(&path).ok();

    assert!(matches!(err, DataError::NonMonotonic { .. }));
}

#[test]
fn check_bars_agrees_with_sample_data() {
    let series = samples::load("tv_xauusd_1h").unwrap();
    let (kept, report) =
        check_bars(&series.symbol, series.timeframe, series.bars.clone(), true).unwrap();

    assert_eq!(kept.len(), series.len());
    assert!(report.is_clean());
    assert_eq!(report.gaps, 0);
}
