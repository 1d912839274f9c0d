//! Save/load round trips for analysis results.

use bquant::analyze_zones;
use bquant::application::indicators::IndicatorSpec;
use bquant::domain::zones::ZoneAnalysisResult;
use bquant::infrastructure::persistence::export_features_csv;
use bquant::infrastructure::samples;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bquant_test_{}_{}", std::process::id(), name))
}

fn small_result() -> ZoneAnalysisResult {
    let series = samples::load("synthetic_cycle").unwrap();
    analyze_zones(series)
        .with_indicator(IndicatorSpec::macd(12, 26, 9))
        .with_hypothesis_tests(0.05)
        .with_bootstrap(100, 3)
        .build()
        .unwrap()
}

#[test]
fn json_roundtrip_preserves_result() {
    let result = small_result();
    let path = temp_path("roundtrip.json");

    result.save_json(&path).unwrap();
    let loaded = ZoneAnalysisResult::load_json(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.metadata.symbol, result.metadata.symbol);
    assert_eq!(loaded.metadata.detection, result.metadata.detection);
    assert_eq!(loaded.zones.len(), result.zones.len());
    assert_eq!(loaded.statistics.total_zones, result.statistics.total_zones);

    for (a, b) in loaded.zones.iter().zip(result.zones.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.start_index, b.start_index);
        assert_eq!(a.end_index, b.end_index);
        assert_eq!(a.start_time, b.start_time);

        let (fa, fb) = (a.features.as_ref().unwrap(), b.features.as_ref().unwrap());
        assert_eq!(fa.price_return, fb.price_return);
        assert_eq!(fa.price_hist_corr, fb.price_hist_corr);
        assert_eq!(fa.volume_ratio, fb.volume_ratio);
    }

    let (ha, hb) = (
        loaded.hypothesis.as_ref().unwrap(),
        result.hypothesis.as_ref().unwrap(),
    );
    assert_eq!(ha.results.len(), hb.results.len());
    for (x, y) in ha.results.iter().zip(hb.results.iter()) {
        assert_eq!(x.name, y.name);
        assert_eq!(x.p_value, y.p_value);
        assert_eq!(x.significant, y.significant);
    }
}

#[test]
fn features_csv_has_one_row_per_zone() {
    let result = small_result();
    let path = temp_path("features.csv");

    let rows = export_features_csv(&result, &path).unwrap();
    assert_eq!(rows, result.zones.len());

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("zone_id"));
    assert!(headers.iter().any(|h| h == "price_return"));
    assert!(headers.iter().any(|h| h == "divergence_count"));

    let data_rows = reader.records().count();
    std::fs::remove_file(&path).ok();
    assert_eq!(data_rows, rows);
}

#[test]
fn load_json_missing_file_is_a_read_error() {
    let err = ZoneAnalysisResult::load_json(&temp_path("missing.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}
