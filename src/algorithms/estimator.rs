// src/algorithms/estimator.rs

use crate::algorithms::statistics::SufficientStatistics;
use crate::core::{ModelParameters, NaiveBayesError, Result};
use ndarray::{Array1, Array2};

/// Maximum-likelihood estimates from accumulated statistics:
///
/// ```text
/// prior[k]       = count[k] / N
/// mean[k][j]     = sum[k][j] / count[k]
/// variance[k][j] = sum_squares[k][j] / count[k] - mean[k][j]^2
/// ```
///
/// Variances are population variances; a small negative result from
/// cancellation is clamped to zero. Any class with no examples is an
/// [`NaiveBayesError::EmptyClass`] error, and a mean or variance that is NaN or
/// infinite (for example when squares overflow) is
/// [`NaiveBayesError::NonFinite`].
pub fn estimate(stats: &SufficientStatistics) -> Result<ModelParameters> {
    let num_classes = stats.num_classes();
    let num_features = stats.num_features();

    if let Some(class) = stats.count.iter().position(|&c| c == 0) {
        return Err(NaiveBayesError::EmptyClass { class });
    }
    let total = stats.total() as f64;

    let priors: Array1<f64> = stats.count.mapv(|c| c as f64 / total);
    let mut means = Array2::zeros((num_classes, num_features));
    let mut variances = Array2::zeros((num_classes, num_features));

    for k in 0..num_classes {
        let count = stats.count[k] as f64;
        for j in 0..num_features {
            let mean = stats.sum[[k, j]] / count;
            let mean_of_squares = stats.sum_squares[[k, j]] / count;
            let variance = mean_of_squares - mean * mean;
            if !mean.is_finite() || !variance.is_finite() {
                return Err(NaiveBayesError::NonFinite(format!(
                    "class {} feature {}: mean {}, variance {}.",
                    k,
                    j,
                    mean,
                    variance
                )));
            }
            means[[k, j]] = mean;
            variances[[k, j]] = variance.max(0.0);
        }
    }

    ModelParameters::new(priors, means, variances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::statistics::accumulate;
    use crate::core::Dataset;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn two_class_scenario() -> Result<()> {
        let ds = Dataset::from_rows(
            vec![0, 0, 0, 1, 1],
            vec![vec![1.0], vec![1.0], vec![3.0], vec![10.0], vec![12.0]],
            2,
        )?;
        let model = estimate(&accumulate(&ds)?)?;
        assert_relative_eq!(model.priors[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(model.priors[1], 0.4, epsilon = 1e-12);
        assert_relative_eq!(model.means[[0, 0]], 5.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(model.means[[1, 0]], 11.0, epsilon = 1e-12);
        assert_relative_eq!(model.variances[[0, 0]], 8.0 / 9.0, epsilon = 1e-12);
        assert_relative_eq!(model.variances[[1, 0]], 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn single_example_class_has_zero_variance() -> Result<()> {
        let ds = Dataset::from_rows(
            vec![0, 1, 1],
            vec![vec![0.3, -7.25, 1e6], vec![1.0, 2.0, 3.0], vec![2.0, 2.0, 5.0]],
            2,
        )?;
        let model = estimate(&accumulate(&ds)?)?;
        assert_eq!(model.means.row(0), array![0.3, -7.25, 1e6]);
        assert_eq!(model.variances.row(0), array![0.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn empty_class_is_an_error_not_nan() -> Result<()> {
        let ds = Dataset::from_rows(vec![0, 0, 2], vec![vec![1.0], vec![2.0], vec![3.0]], 3)?;
        let err = estimate(&accumulate(&ds)?).unwrap_err();
        assert!(matches!(err, NaiveBayesError::EmptyClass { class: 1 }));
        Ok(())
    }

    #[test]
    fn reproduces_known_moments() -> Result<()> {
        // Class 0 takes values m - d and m + d in equal numbers per feature,
        // so the mean is m and the population variance is d^2.
        let centers = [2.0, -4.0, 0.5];
        let spreads = [1.0, 0.25, 3.0];
        let mut labels = Vec::new();
        let mut rows = Vec::new();
        for i in 0..10 {
            let sign = if i % 2 == 0 { -1.0 } else { 1.0 };
            labels.push(0);
            rows.push(
                centers
                    .iter()
                    .zip(spreads.iter())
                    .map(|(m, d)| m + sign * d)
                    .collect(),
            );
        }
        let ds = Dataset::from_rows(labels, rows, 1)?;
        let model = estimate(&accumulate(&ds)?)?;
        for j in 0..3 {
            assert_abs_diff_eq!(model.means[[0, j]], centers[j], epsilon = 1e-12);
            assert_abs_diff_eq!(model.variances[[0, j]], spreads[j] * spreads[j], epsilon = 1e-9);
        }
        assert_eq!(model.priors[0], 1.0);
        Ok(())
    }

    #[test]
    fn estimation_is_deterministic() -> Result<()> {
        let ds = crate::synthetic::GaussianBlobs::new(4, 6).seed(3).generate(400)?;
        let a = estimate(&accumulate(&ds)?)?;
        let b = estimate(&accumulate(&ds)?)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn overflowing_squares_are_rejected() -> Result<()> {
        // 1e200 is finite but its square is not.
        let ds = Dataset::from_rows(vec![0, 1], vec![vec![1e200], vec![1.0]], 2)?;
        let err = estimate(&accumulate(&ds)?).unwrap_err();
        assert!(matches!(err, NaiveBayesError::NonFinite(ref m) if m.contains("class 0")));
        Ok(())
    }

    #[test]
    fn non_finite_statistics_are_rejected() {
        let mut stats = SufficientStatistics::zeros(2, 1);
        stats.count = array![1, 1];
        stats.sum = array![[f64::NAN], [1.0]];
        stats.sum_squares = array![[1.0], [1.0]];
        assert!(matches!(estimate(&stats), Err(NaiveBayesError::NonFinite(_))));

        stats.sum = array![[1.0], [1.0]];
        stats.sum_squares = array![[1.0], [f64::INFINITY]];
        assert!(matches!(estimate(&stats), Err(NaiveBayesError::NonFinite(_))));
    }

    proptest! {
        #[test]
        fn priors_sum_to_one(
            labels in prop::collection::vec(0usize..4, 4..200),
            value in -100.0f64..100.0,
        ) {
            // Guarantee every class is present.
            let mut labels = labels;
            labels[..4].copy_from_slice(&[0, 1, 2, 3]);
            let rows = labels.iter().map(|&l| vec![value + l as f64, value * 0.5]).collect();
            let ds = Dataset::from_rows(labels, rows, 4).unwrap();
            let model = estimate(&accumulate(&ds).unwrap()).unwrap();
            prop_assert!((model.priors.sum() - 1.0).abs() < 1e-12);
            prop_assert!(model.variances.iter().all(|&v| v >= 0.0));
        }
    }
}
