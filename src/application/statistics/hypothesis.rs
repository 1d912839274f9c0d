use super::bootstrap::bootstrap_mean_ci;
use super::descriptive::{excess_kurtosis, pearson, skewness};
use crate::domain::zones::models::{HypothesisReport, HypothesisTestResult};
use crate::domain::zones::{ZoneInfo, ZoneKind};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};
use tracing::info;

const DEFAULT_ALPHA: f64 = 0.05;
const MIN_SAMPLE: usize = 3;

/// The hypothesis-test battery run over extracted zone features.
///
/// All raw p-values are Holm-Bonferroni adjusted before significance is
/// judged, so a single run never reports an unadjusted discovery.
pub struct HypothesisTestSuite {
    alpha: f64,
    bootstrap_iterations: usize,
    seed: u64,
}

impl Default for HypothesisTestSuite {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            bootstrap_iterations: 1000,
            seed: 42,
        }
    }
}

impl HypothesisTestSuite {
    pub fn new(alpha: f64, bootstrap_iterations: usize, seed: u64) -> Self {
        Self {
            alpha,
            bootstrap_iterations,
            seed,
        }
    }

    pub fn run(&self, zones: &[ZoneInfo]) -> HypothesisReport {
        let bull_returns = returns_of(zones, Some(ZoneKind::Bull));
        let bear_returns = returns_of(zones, Some(ZoneKind::Bear));
        let all_returns = returns_of(zones, None);
        let bull_durations = durations_of(zones, ZoneKind::Bull);
        let bear_durations = durations_of(zones, ZoneKind::Bear);

        // Paired sample: only zones that actually carry features
        let (durations, abs_returns): (Vec<f64>, Vec<f64>) = zones
            .iter()
            .filter_map(|z| z.price_return().map(|r| (z.duration_bars as f64, r.abs())))
            .unzip();

        let mut results = vec![
            one_sample_t("bull_mean_return_nonzero", &bull_returns),
            one_sample_t("bear_mean_return_nonzero", &bear_returns),
            one_sample_t("pooled_mean_return_nonzero", &all_returns),
            welch_t(
                "bull_vs_bear_duration",
                &bull_durations,
                &bear_durations,
            ),
            mann_whitney("bull_vs_bear_return", &bull_returns, &bear_returns),
            correlation_test("duration_vs_abs_return", &durations, &abs_returns),
            long_zone_reversal(zones),
            jarque_bera("zone_return_normality", &all_returns),
        ];

        holm_adjust(&mut results, self.alpha);

        let mut bootstrap = Vec::new();
        if let Some(ci) = bootstrap_mean_ci(
            "bull_mean_return",
            &bull_returns,
            self.bootstrap_iterations,
            self.seed,
            0.95,
        ) {
            bootstrap.push(ci);
        }
        if let Some(ci) = bootstrap_mean_ci(
            "bear_mean_return",
            &bear_returns,
            self.bootstrap_iterations,
            self.seed.wrapping_add(1),
            0.95,
        ) {
            bootstrap.push(ci);
        }

        let significant = results.iter().filter(|r| r.significant).count();
        info!(
            "Hypothesis suite: {}/{} tests significant at alpha={}",
            significant,
            results.len(),
            self.alpha
        );

        HypothesisReport {
            alpha: self.alpha,
            results,
            bootstrap,
        }
    }
}

fn returns_of(zones: &[ZoneInfo], kind: Option<ZoneKind>) -> Vec<f64> {
    zones
        .iter()
        .filter(|z| kind.map(|k| z.kind == k).unwrap_or(true))
        .filter_map(|z| z.price_return())
        .collect()
}

fn durations_of(zones: &[ZoneInfo], kind: ZoneKind) -> Vec<f64> {
    zones
        .iter()
        .filter(|z| z.kind == kind)
        .map(|z| z.duration_bars as f64)
        .collect()
}

fn skipped(name: &str, sizes: Vec<usize>, why: &str) -> HypothesisTestResult {
    HypothesisTestResult {
        name: name.to_string(),
        statistic: None,
        p_value: None,
        adjusted_p: None,
        significant: false,
        sample_sizes: sizes,
        conclusion: format!("skipped: {}", why),
    }
}

fn finished(
    name: &str,
    statistic: f64,
    p_value: f64,
    sizes: Vec<usize>,
    conclusion: String,
) -> HypothesisTestResult {
    HypothesisTestResult {
        name: name.to_string(),
        statistic: Some(statistic),
        p_value: Some(p_value.clamp(0.0, 1.0)),
        adjusted_p: None,
        significant: false,
        sample_sizes: sizes,
        conclusion,
    }
}

fn mean_and_var(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

fn t_p_value(t: f64, dof: f64) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, dof).ok()?;
    Some(2.0 * (1.0 - dist.cdf(t.abs())))
}

fn normal_p_value(z: f64) -> Option<f64> {
    let dist = Normal::new(0.0, 1.0).ok()?;
    Some(2.0 * (1.0 - dist.cdf(z.abs())))
}

/// One-sample t-test of mean != 0.
fn one_sample_t(name: &str, values: &[f64]) -> HypothesisTestResult {
    let n = values.len();
    if n < MIN_SAMPLE {
        return skipped(name, vec![n], "sample too small");
    }
    let (mean, var) = mean_and_var(values);
    if var <= f64::EPSILON {
        return skipped(name, vec![n], "zero variance");
    }

    let t = mean / (var / n as f64).sqrt();
    match t_p_value(t, (n - 1) as f64) {
        Some(p) => finished(
            name,
            t,
            p,
            vec![n],
            format!("mean={:.5}, t={:.3} with {} dof", mean, t, n - 1),
        ),
        None => skipped(name, vec![n], "degenerate t distribution"),
    }
}

/// Welch two-sample t-test of equal means.
fn welch_t(name: &str, a: &[f64], b: &[f64]) -> HypothesisTestResult {
    let (n1, n2) = (a.len(), b.len());
    if n1 < MIN_SAMPLE || n2 < MIN_SAMPLE {
        return skipped(name, vec![n1, n2], "sample too small");
    }
    let (m1, v1) = mean_and_var(a);
    let (m2, v2) = mean_and_var(b);
    let se2 = v1 / n1 as f64 + v2 / n2 as f64;
    if se2 <= f64::EPSILON {
        return skipped(name, vec![n1, n2], "zero variance");
    }

    let t = (m1 - m2) / se2.sqrt();
    // Welch-Satterthwaite degrees of freedom
    let dof = se2 * se2
        / ((v1 / n1 as f64).powi(2) / (n1 as f64 - 1.0)
            + (v2 / n2 as f64).powi(2) / (n2 as f64 - 1.0));

    match t_p_value(t, dof) {
        Some(p) => finished(
            name,
            t,
            p,
            vec![n1, n2],
            format!("mean diff={:.5}, t={:.3} with {:.1} dof", m1 - m2, t, dof),
        ),
        None => skipped(name, vec![n1, n2], "degenerate t distribution"),
    }
}

/// Mann-Whitney U with normal approximation and tie correction.
fn mann_whitney(name: &str, a: &[f64], b: &[f64]) -> HypothesisTestResult {
    let (n1, n2) = (a.len(), b.len());
    if n1 < MIN_SAMPLE || n2 < MIN_SAMPLE {
        return skipped(name, vec![n1, n2], "sample too small");
    }

    // Joint average ranks
    let mut pooled: Vec<(f64, bool)> = a
        .iter()
        .map(|v| (*v, true))
        .chain(b.iter().map(|v| (*v, false)))
        .collect();
    pooled.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal));

    let total = pooled.len();
    let mut ranks = vec![0.0f64; total];
    let mut tie_term = 0.0f64;
    let mut i = 0;
    while i < total {
        let mut j = i;
        while j + 1 < total && pooled[j + 1].0 == pooled[i].0 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for r in ranks.iter_mut().take(j + 1).skip(i) {
            *r = avg_rank;
        }
        let t = (j - i + 1) as f64;
        tie_term += t * t * t - t;
        i = j + 1;
    }

    let r1: f64 = pooled
        .iter()
        .zip(ranks.iter())
        .filter(|((_, in_a), _)| *in_a)
        .map(|(_, r)| r)
        .sum();

    let (n1f, n2f, nf) = (n1 as f64, n2 as f64, total as f64);
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let mu = n1f * n2f / 2.0;
    let sigma2 = n1f * n2f / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)));
    if sigma2 <= f64::EPSILON {
        return skipped(name, vec![n1, n2], "all values tied");
    }

    let z = (u1 - mu) / sigma2.sqrt();
    match normal_p_value(z) {
        Some(p) => finished(
            name,
            z,
            p,
            vec![n1, n2],
            format!("U={:.1}, z={:.3}", u1, z),
        ),
        None => skipped(name, vec![n1, n2], "degenerate normal"),
    }
}

/// Pearson correlation with t-significance.
fn correlation_test(name: &str, x: &[f64], y: &[f64]) -> HypothesisTestResult {
    let n = x.len().min(y.len());
    if n < MIN_SAMPLE + 1 {
        return skipped(name, vec![n], "sample too small");
    }
    let Some(r) = pearson(x, y) else {
        return skipped(name, vec![n], "zero variance");
    };
    if (1.0 - r * r) <= f64::EPSILON {
        // Perfectly collinear; keep the statistic finite for serialization
        return finished(name, 1e12, 0.0, vec![n], format!("r={:.4} (collinear)", r));
    }

    let t = r * ((n as f64 - 2.0) / (1.0 - r * r)).sqrt();
    match t_p_value(t, n as f64 - 2.0) {
        Some(p) => finished(name, t, p, vec![n], format!("r={:.4}, t={:.3}", r, t)),
        None => skipped(name, vec![n], "degenerate t distribution"),
    }
}

/// Proportion z-test: is a longer-than-median zone followed by an
/// opposite-kind zone more often than chance?
fn long_zone_reversal(zones: &[ZoneInfo]) -> HypothesisTestResult {
    let name = "long_zone_reversal";
    if zones.len() < MIN_SAMPLE + 1 {
        return skipped(name, vec![zones.len()], "sample too small");
    }

    let mut durations: Vec<f64> = zones.iter().map(|z| z.duration_bars as f64).collect();
    durations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = durations[durations.len() / 2];

    let mut trials = 0usize;
    let mut reversals = 0usize;
    for pair in zones.windows(2) {
        if (pair[0].duration_bars as f64) > median {
            trials += 1;
            if pair[1].kind == pair[0].kind.opposite() {
                reversals += 1;
            }
        }
    }

    if trials < MIN_SAMPLE {
        return skipped(name, vec![trials], "too few long zones");
    }

    let p_hat = reversals as f64 / trials as f64;
    let z = (p_hat - 0.5) / (0.25 / trials as f64).sqrt();
    match normal_p_value(z) {
        Some(p) => finished(
            name,
            z,
            p,
            vec![trials],
            format!("{}/{} long zones reversed (p_hat={:.3})", reversals, trials, p_hat),
        ),
        None => skipped(name, vec![trials], "degenerate normal"),
    }
}

/// Jarque-Bera normality test.
fn jarque_bera(name: &str, values: &[f64]) -> HypothesisTestResult {
    let n = values.len();
    if n < 8 {
        return skipped(name, vec![n], "sample too small");
    }
    let s = skewness(values);
    let k = excess_kurtosis(values);
    let jb = n as f64 / 6.0 * (s * s + k * k / 4.0);

    match ChiSquared::new(2.0).ok().map(|d| 1.0 - d.cdf(jb)) {
        Some(p) => finished(
            name,
            jb,
            p,
            vec![n],
            format!("skew={:.3}, excess kurtosis={:.3}", s, k),
        ),
        None => skipped(name, vec![n], "degenerate chi-squared"),
    }
}

/// Holm-Bonferroni step-down adjustment; judges significance on the
/// adjusted p-values.
fn holm_adjust(results: &mut [HypothesisTestResult], alpha: f64) {
    let mut order: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.p_value.is_some())
        .map(|(i, _)| i)
        .collect();
    order.sort_by(|a, b| {
        results[*a]
            .p_value
            .partial_cmp(&results[*b].p_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let m = order.len();
    let mut running_max = 0.0f64;
    for (rank, idx) in order.iter().enumerate() {
        let raw = results[*idx].p_value.unwrap_or(1.0);
        let adjusted = ((m - rank) as f64 * raw).min(1.0).max(running_max);
        running_max = adjusted;
        results[*idx].adjusted_p = Some(adjusted);
        results[*idx].significant = adjusted <= alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zones::ZoneFeatures;
    use chrono::{TimeZone, Utc};

    fn zone(seq: usize, kind: ZoneKind, duration: usize, ret: f64) -> ZoneInfo {
        let t = Utc.timestamp_opt(seq as i64 * 3600, 0).unwrap();
        let start = seq * 40;
        let mut z = ZoneInfo::new(seq, kind, start, start + duration - 1, t, t);
        z.features = Some(ZoneFeatures {
            duration_bars: duration,
            price_return: ret,
            abs_return: ret.abs(),
            max_rally_pct: 0.0,
            max_drawdown_pct: 0.0,
            hist_amplitude: ret.abs() * 2.0,
            hist_peak: ret,
            price_hist_corr: None,
            swing_count: 0,
            avg_rally_pct: None,
            avg_drop_pct: None,
            largest_swing_pct: None,
            divergence_count: 0,
            volatility_score: Some(1.0),
            volume_ratio: None,
        });
        z
    }

    fn biased_zones() -> Vec<ZoneInfo> {
        // Bull zones with clearly positive returns, bear zones negative
        let mut zones = Vec::new();
        for i in 0..12 {
            let ret = 0.02 + (i % 3) as f64 * 0.005;
            zones.push(zone(i * 2, ZoneKind::Bull, 5 + i % 4, ret));
            zones.push(zone(i * 2 + 1, ZoneKind::Bear, 3 + i % 3, -ret));
        }
        zones
    }

    #[test]
    fn test_suite_reports_all_tests() {
        let report = HypothesisTestSuite::default().run(&biased_zones());
        assert_eq!(report.results.len(), 8);
        assert_eq!(report.bootstrap.len(), 2);
    }

    #[test]
    fn test_p_values_within_unit_interval() {
        let report = HypothesisTestSuite::default().run(&biased_zones());
        for r in &report.results {
            if let Some(p) = r.p_value {
                assert!((0.0..=1.0).contains(&p), "{}: p={}", r.name, p);
            }
            if let Some(ap) = r.adjusted_p {
                assert!(ap >= r.p_value.unwrap());
            }
        }
    }

    #[test]
    fn test_strong_bias_is_significant_after_adjustment() {
        let report = HypothesisTestSuite::default().run(&biased_zones());
        let bull = report
            .results
            .iter()
            .find(|r| r.name == "bull_mean_return_nonzero")
            .unwrap();
        assert!(bull.significant);
        assert!(bull.adjusted_p.unwrap() <= 0.05);
    }

    #[test]
    fn test_degenerate_samples_are_skipped_not_panicking() {
        let zones = vec![zone(0, ZoneKind::Bull, 3, 0.01)];
        let report = HypothesisTestSuite::default().run(&zones);
        assert!(report.results.iter().all(|r| !r.significant));
        assert!(report.results.iter().any(|r| r.conclusion.starts_with("skipped")));
    }

    #[test]
    fn test_mann_whitney_symmetric_under_swap() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![2.5, 3.5, 4.5, 5.5, 6.5];
        let ab = mann_whitney("x", &a, &b);
        let ba = mann_whitney("x", &b, &a);
        let p1 = ab.p_value.unwrap();
        let p2 = ba.p_value.unwrap();
        assert!((p1 - p2).abs() < 1e-9);
    }

    #[test]
    fn test_holm_never_reports_unadjusted_discovery() {
        let mut results = vec![
            finished("a", 2.0, 0.04, vec![10], String::new()),
            finished("b", 2.0, 0.04, vec![10], String::new()),
            finished("c", 2.0, 0.04, vec![10], String::new()),
        ];
        holm_adjust(&mut results, 0.05);
        // 0.04 * 3 = 0.12 > 0.05: nothing survives
        assert!(results.iter().all(|r| !r.significant));
    }
}
