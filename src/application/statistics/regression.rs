use crate::domain::errors::AnalysisError;
use crate::domain::zones::ZoneInfo;
use crate::domain::zones::models::RegressionSummary;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use tracing::info;

const MIN_ZONES: usize = 8;
const FEATURE_NAMES: [&str; 3] = ["duration_bars", "hist_amplitude", "volatility_score"];

/// OLS of zone return on shape features.
///
/// Reported R-squared is on the training set; this is a descriptive fit,
/// not a predictive model.
pub fn fit_return_model(zones: &[ZoneInfo]) -> Result<RegressionSummary, AnalysisError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut targets: Vec<f64> = Vec::new();

    for zone in zones {
        let f = zone
            .features
            .as_ref()
            .ok_or_else(|| AnalysisError::MissingFeatures {
                zone_id: zone.id.clone(),
            })?;
        rows.push(vec![
            f.duration_bars as f64,
            f.hist_amplitude,
            f.volatility_score.unwrap_or(1.0),
        ]);
        targets.push(f.price_return);
    }

    if rows.len() < MIN_ZONES {
        return Err(AnalysisError::TooFewZones {
            stage: "regression".to_string(),
            need: MIN_ZONES,
            have: rows.len(),
        });
    }

    let n = targets.len() as f64;
    let target_mean = targets.iter().sum::<f64>() / n;
    let ss_tot: f64 = targets.iter().map(|y| (y - target_mean).powi(2)).sum();
    if ss_tot <= f64::EPSILON {
        return Err(AnalysisError::Regression {
            reason: "zero variance in zone returns".to_string(),
        });
    }

    let x = DenseMatrix::from_2d_vec(&rows).map_err(|e| AnalysisError::Regression {
        reason: format!("matrix creation failed: {}", e),
    })?;

    let model = LinearRegression::fit(&x, &targets, LinearRegressionParameters::default())
        .map_err(|e| AnalysisError::Regression {
            reason: e.to_string(),
        })?;

    let predictions = model.predict(&x).map_err(|e| AnalysisError::Regression {
        reason: e.to_string(),
    })?;

    let ss_res: f64 = targets
        .iter()
        .zip(predictions.iter())
        .map(|(y, y_hat)| (y - y_hat).powi(2))
        .sum();
    let r_squared = 1.0 - ss_res / ss_tot;

    let coef_matrix = model.coefficients();
    let coefficients = FEATURE_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), *coef_matrix.get((i, 0))))
        .collect();

    info!(
        "Regression fit over {} zones: R^2 = {:.4}",
        targets.len(),
        r_squared
    );

    Ok(RegressionSummary {
        intercept: *model.intercept(),
        coefficients,
        r_squared,
        n_samples: targets.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zones::{ZoneFeatures, ZoneKind};
    use chrono::{TimeZone, Utc};

    fn zone_with(seq: usize, duration: usize, amp: f64, ret: f64) -> ZoneInfo {
        let t = Utc.timestamp_opt(seq as i64 * 3600, 0).unwrap();
        let start = seq * 50;
        let mut z = ZoneInfo::new(seq, ZoneKind::Bull, start, start + duration - 1, t, t);
        z.features = Some(ZoneFeatures {
            duration_bars: duration,
            price_return: ret,
            abs_return: ret.abs(),
            max_rally_pct: 0.0,
            max_drawdown_pct: 0.0,
            hist_amplitude: amp,
            hist_peak: amp,
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

    #[test]
    fn test_recovers_linear_relationship() {
        // return = 0.001 * duration exactly
        let zones: Vec<ZoneInfo> = (0..12)
            .map(|i| zone_with(i, 2 + i, 0.5, 0.001 * (2 + i) as f64))
            .collect();

        let summary = fit_return_model(&zones).unwrap();
        assert_eq!(summary.n_samples, 12);
        assert!(summary.r_squared > 0.999);

        let duration_coef = summary
            .coefficients
            .iter()
            .find(|(name, _)| name == "duration_bars")
            .map(|(_, c)| *c)
            .unwrap();
        assert!((duration_coef - 0.001).abs() < 1e-6);
    }

    #[test]
    fn test_too_few_zones() {
        let zones: Vec<ZoneInfo> = (0..4).map(|i| zone_with(i, 3, 0.5, 0.01)).collect();
        assert!(matches!(
            fit_return_model(&zones),
            Err(AnalysisError::TooFewZones { .. })
        ));
    }

    #[test]
    fn test_constant_target_rejected() {
        let zones: Vec<ZoneInfo> = (0..10).map(|i| zone_with(i, 2 + i, 0.5, 0.01)).collect();
        assert!(matches!(
            fit_return_model(&zones),
            Err(AnalysisError::Regression { .. })
        ));
    }
}
