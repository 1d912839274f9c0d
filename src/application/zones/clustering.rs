use crate::domain::errors::AnalysisError;
use crate::domain::zones::{ZoneInfo, models::ZoneClusteringResult};
use smartcore::cluster::kmeans::{KMeans, KMeansParameters};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::info;

/// Feature vector used for shape clustering, per zone:
/// duration, signed return, detection-column amplitude, volatility score.
fn shape_vector(zone: &ZoneInfo) -> Result<Vec<f64>, AnalysisError> {
    let f = zone
        .features
        .as_ref()
        .ok_or_else(|| AnalysisError::MissingFeatures {
            zone_id: zone.id.clone(),
        })?;
    Ok(vec![
        f.duration_bars as f64,
        f.price_return,
        f.hist_amplitude,
        f.volatility_score.unwrap_or(1.0),
    ])
}

/// Groups zones into `k` shape clusters with k-means.
pub fn cluster_zones(zones: &[ZoneInfo], k: usize) -> Result<ZoneClusteringResult, AnalysisError> {
    if k < 2 {
        return Err(AnalysisError::Clustering {
            reason: format!("k must be >= 2, got {}", k),
        });
    }
    if zones.len() < k {
        return Err(AnalysisError::TooFewZones {
            stage: "clustering".to_string(),
            need: k,
            have: zones.len(),
        });
    }

    let raw: Vec<Vec<f64>> = zones
        .iter()
        .map(shape_vector)
        .collect::<Result<_, _>>()?;
    let rows = normalize_columns(raw);

    let matrix = DenseMatrix::from_2d_vec(&rows).map_err(|e| AnalysisError::Clustering {
        reason: format!("matrix creation failed: {}", e),
    })?;

    let model = KMeans::<f64, u32, DenseMatrix<f64>, Vec<u32>>::fit(
        &matrix,
        KMeansParameters::default().with_k(k),
    )
    .map_err(|e| AnalysisError::Clustering {
        reason: e.to_string(),
    })?;

    let raw_labels: Vec<u32> = model.predict(&matrix).map_err(|e| AnalysisError::Clustering {
        reason: e.to_string(),
    })?;
    let labels: Vec<usize> = raw_labels.into_iter().map(|l| l as usize).collect();

    let mut cluster_sizes = vec![0usize; k];
    let mut return_sums = vec![0.0f64; k];
    for (zone, label) in zones.iter().zip(labels.iter()) {
        let c = (*label).min(k - 1);
        cluster_sizes[c] += 1;
        return_sums[c] += zone.price_return().unwrap_or(0.0);
    }
    let mean_return_per_cluster = cluster_sizes
        .iter()
        .zip(return_sums.iter())
        .map(|(n, sum)| if *n > 0 { sum / *n as f64 } else { 0.0 })
        .collect();

    info!("Clustered {} zones into {} shape groups", zones.len(), k);

    Ok(ZoneClusteringResult {
        k,
        labels,
        cluster_sizes,
        mean_return_per_cluster,
    })
}

/// Z-normalizes each column; constant columns collapse to zero.
fn normalize_columns(rows: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    if rows.is_empty() {
        return rows;
    }
    let dims = rows[0].len();
    let n = rows.len() as f64;

    let mut means = vec![0.0; dims];
    for row in &rows {
        for (d, v) in row.iter().enumerate() {
            means[d] += v;
        }
    }
    for m in &mut means {
        *m /= n;
    }

    let mut stds = vec![0.0; dims];
    for row in &rows {
        for (d, v) in row.iter().enumerate() {
            stds[d] += (v - means[d]).powi(2);
        }
    }
    for s in &mut stds {
        *s = (*s / n).sqrt();
    }

    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(d, v)| {
                    if stds[d] > f64::EPSILON {
                        (v - means[d]) / stds[d]
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zones::{ZoneFeatures, ZoneKind};
    use chrono::{TimeZone, Utc};

    fn zone_with(seq: usize, duration: usize, ret: f64, amp: f64) -> ZoneInfo {
        let t = Utc.timestamp_opt(seq as i64 * 3600, 0).unwrap();
        let start = seq * 20;
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
    fn test_two_separated_groups() {
        let mut zones = Vec::new();
        for i in 0..5 {
            zones.push(zone_with(i, 3, 0.01, 0.1));
        }
        for i in 5..10 {
            zones.push(zone_with(i, 30, 0.10, 2.0));
        }

        let result = cluster_zones(&zones, 2).unwrap();
        assert_eq!(result.labels.len(), 10);
        assert_eq!(result.cluster_sizes.iter().sum::<usize>(), 10);
        // The two synthetic groups must not be merged
        assert!(result.cluster_sizes.iter().all(|&n| n == 5));
        assert_ne!(result.labels[0], result.labels[9]);
    }

    #[test]
    fn test_too_few_zones() {
        let zones = vec![zone_with(0, 3, 0.01, 0.1)];
        assert!(matches!(
            cluster_zones(&zones, 2),
            Err(AnalysisError::TooFewZones { .. })
        ));
    }

    #[test]
    fn test_missing_features_rejected() {
        let t = Utc.timestamp_opt(0, 0).unwrap();
        let zones = vec![
            ZoneInfo::new(0, ZoneKind::Bull, 0, 2, t, t),
            ZoneInfo::new(1, ZoneKind::Bear, 3, 5, t, t),
        ];
        assert!(matches!(
            cluster_zones(&zones, 2),
            Err(AnalysisError::MissingFeatures { .. })
        ));
    }
}
