use crate::domain::zones::models::BootstrapInterval;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Bootstrap confidence interval for the mean of `values`.
///
/// Each iteration gets its own rng seeded from `seed + i`, so the result
/// is deterministic regardless of rayon's scheduling.
pub fn bootstrap_mean_ci(
    label: impl Into<String>,
    values: &[f64],
    iterations: usize,
    seed: u64,
    confidence: f64,
) -> Option<BootstrapInterval> {
    if values.len() < 3 || iterations < 10 || !(0.0..1.0).contains(&confidence) {
        return None;
    }

    let n = values.len();
    let mut means: Vec<f64> = (0..iterations)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let mut sum = 0.0;
            for _ in 0..n {
                sum += values[rng.random_range(0..n)];
            }
            sum / n as f64
        })
        .collect();

    means.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let tail = (1.0 - confidence) / 2.0;
    let lo_idx = ((iterations as f64 * tail) as usize).min(iterations - 1);
    let hi_idx = ((iterations as f64 * (1.0 - tail)) as usize).min(iterations - 1);

    Some(BootstrapInterval {
        label: label.into(),
        mean: values.iter().sum::<f64>() / n as f64,
        lower: means[lo_idx],
        upper: means[hi_idx],
        confidence,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_brackets_mean() {
        let values: Vec<f64> = (0..100).map(|i| (i % 7) as f64 - 3.0).collect();
        let ci = bootstrap_mean_ci("test", &values, 500, 42, 0.95).unwrap();

        assert!(ci.lower <= ci.mean);
        assert!(ci.mean <= ci.upper);
        assert!(ci.upper - ci.lower < 2.0);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let values = vec![0.5, 1.5, -0.5, 2.0, 0.0, 1.0, -1.0, 0.25];
        let a = bootstrap_mean_ci("a", &values, 200, 7, 0.95).unwrap();
        let b = bootstrap_mean_ci("b", &values, 200, 7, 0.95).unwrap();

        assert_eq!(a.lower, b.lower);
        assert_eq!(a.upper, b.upper);
    }

    #[test]
    fn test_tiny_sample_is_none() {
        assert!(bootstrap_mean_ci("x", &[1.0, 2.0], 200, 1, 0.95).is_none());
    }
}
