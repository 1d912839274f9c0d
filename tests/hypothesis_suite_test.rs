//! Statistical properties of the hypothesis suite on pipeline output.

use bquant::analyze_zones;
use bquant::application::indicators::IndicatorSpec;
use bquant::application::statistics::HypothesisTestSuite;
use bquant::infrastructure::samples;

fn analyzed_zones() -> bquant::domain::zones::ZoneAnalysisResult {
    let series = samples::load("synthetic_cycle").unwrap();
    analyze_zones(series)
        .with_indicator(IndicatorSpec::macd(12, 26, 9))
        .with_hypothesis_tests(0.05)
        .with_bootstrap(300, 11)
        .build()
        .unwrap()
}

#[test]
fn every_test_is_reported_with_valid_p_values() {
    let result = analyzed_zones();
    let report = result.hypothesis.unwrap();

    assert_eq!(report.results.len(), 8);
    for r in &report.results {
        if let Some(p) = r.p_value {
            assert!((0.0..=1.0).contains(&p), "{}: p={}", r.name, p);
            let adjusted = r.adjusted_p.expect("adjusted p present for finished test");
            assert!(adjusted + 1e-15 >= p, "{}: adjustment lowered p", r.name);
            assert!(adjusted <= 1.0);
        } else {
            // Skipped tests carry a reason and are never significant
            assert!(!r.significant);
            assert!(r.conclusion.starts_with("skipped"));
        }
    }
}

#[test]
fn significance_is_judged_on_adjusted_p() {
    let result = analyzed_zones();
    let report = result.hypothesis.unwrap();

    for r in &report.results {
        if r.significant {
            assert!(r.adjusted_p.unwrap() <= report.alpha);
        }
    }
}

#[test]
fn bootstrap_intervals_bracket_their_means() {
    let result = analyzed_zones();
    let report = result.hypothesis.unwrap();

    assert!(!report.bootstrap.is_empty());
    for ci in &report.bootstrap {
        assert!(ci.lower <= ci.upper, "{}", ci.label);
        assert_eq!(ci.confidence, 0.95);
        assert_eq!(ci.iterations, 300);
    }
}

#[test]
fn suite_is_deterministic_for_fixed_seed() {
    let series = samples::load("synthetic_cycle").unwrap();
    let run = |seed: u64| {
        let result = analyze_zones(series.clone())
            .with_indicator(IndicatorSpec::macd(12, 26, 9))
            .with_hypothesis_tests(0.05)
            .with_bootstrap(200, seed)
            .build()
            .unwrap();
        result.hypothesis.unwrap()
    };

    let a = run(5);
    let b = run(5);
    for (x, y) in a.bootstrap.iter().zip(b.bootstrap.iter()) {
        assert_eq!(x.lower, y.lower);
        assert_eq!(x.upper, y.upper);
    }
}

#[test]
fn empty_zone_list_produces_skipped_suite() {
    let report = HypothesisTestSuite::default().run(&[]);

    assert_eq!(report.results.len(), 8);
    assert!(report.results.iter().all(|r| !r.significant));
    assert!(report.bootstrap.is_empty());
}
