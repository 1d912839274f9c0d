use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution, Max, Min, OrderStatistics};

/// Summary statistics of one sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptive {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
}

/// Describes a sample; None for fewer than two finite values.
pub fn describe(values: &[f64]) -> Option<Descriptive> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }

    let n = finite.len();
    let mut data = Data::new(finite.clone());

    let mean = data.mean()?;
    let std_dev = data.std_dev()?;

    Some(Descriptive {
        n,
        mean,
        std_dev,
        median: data.percentile(50),
        min: data.min(),
        max: data.max(),
        p25: data.quantile(0.25),
        p75: data.quantile(0.75),
        skewness: skewness(&finite),
        excess_kurtosis: excess_kurtosis(&finite),
    })
}

/// Population skewness g1 = m3 / m2^(3/2); zero for a flat sample.
pub fn skewness(values: &[f64]) -> f64 {
    let (m2, m3, _) = central_moments(values);
    if m2 <= f64::EPSILON {
        return 0.0;
    }
    m3 / m2.powf(1.5)
}

/// Population excess kurtosis g2 = m4 / m2^2 - 3; zero for a flat sample.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    let (m2, _, m4) = central_moments(values);
    if m2 <= f64::EPSILON {
        return 0.0;
    }
    m4 / (m2 * m2) - 3.0
}

fn central_moments(values: &[f64]) -> (f64, f64, f64) {
    let n = values.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n;
    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for v in values {
        let d = v - mean;
        m2 += d * d;
        m3 += d * d * d;
        m4 += d * d * d * d;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Pearson correlation; None when either side has (near) zero variance
/// or the slices are shorter than two elements.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }

    let xs = &x[..n];
    let ys = &y[..n];
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        let dy = ys[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_basic() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(d.n, 5);
        assert!((d.mean - 3.0).abs() < 1e-12);
        assert!((d.median - 3.0).abs() < 1e-12);
        assert!((d.min - 1.0).abs() < 1e-12);
        assert!((d.max - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_describe_filters_nan() {
        let d = describe(&[1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(d.n, 2);
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![2.0, 4.0, 6.0, 8.0];
        let r = pearson(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        let y_neg: Vec<f64> = y.iter().map(|v| -v).collect();
        let r = pearson(&x, &y_neg).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_flat_is_none() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_symmetric_sample_has_zero_skew() {
        let s = skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(s.abs() < 1e-12);
    }
}
