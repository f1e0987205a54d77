// src/synthetic.rs

use crate::core::{Dataset, Features, NaiveBayesError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Generates labeled Gaussian blobs, one blob per class.
///
/// Class `k` is centered at `k * separation + j * 0.5` in feature `j`, with
/// standard deviation `spread` in every feature. Labels are assigned round
/// robin, so every class is present once `n >= num_classes`.
#[derive(Debug, Clone)]
pub struct GaussianBlobs {
    num_classes: usize,
    num_features: usize,
    separation: f64,
    spread: f64,
    seed: u64,
}

impl GaussianBlobs {
    pub fn new(num_classes: usize, num_features: usize) -> Self {
        GaussianBlobs {
            num_classes,
            num_features,
            separation: 5.0,
            spread: 1.0,
            seed: 0,
        }
    }

    pub fn separation(mut self, separation: f64) -> Self {
        self.separation = separation;
        self
    }

    pub fn spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn center(&self, class: usize, feature: usize) -> f64 {
        class as f64 * self.separation + feature as f64 * 0.5
    }

    /// Fails with [`NaiveBayesError::InvalidParameter`] unless `spread` is
    /// finite and non-negative and `separation` is finite.
    pub fn generate(&self, n: usize) -> Result<Dataset> {
        if !self.spread.is_finite() || self.spread < 0.0 {
            return Err(NaiveBayesError::InvalidParameter(format!(
                "Blob spread must be finite and non-negative, got {}.",
                self.spread
            )));
        }
        if !self.separation.is_finite() {
            return Err(NaiveBayesError::InvalidParameter(format!(
                "Blob separation must be finite, got {}.",
                self.separation
            )));
        }
        let noise = Normal::new(0.0, self.spread).map_err(|e| {
            NaiveBayesError::InvalidParameter(format!("Invalid blob spread {}: {}", self.spread, e))
        })?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let labels: Vec<usize> = (0..n).map(|i| i % self.num_classes.max(1)).collect();
        let mut features = Features::zeros((n, self.num_features));
        for (i, mut row) in features.rows_mut().into_iter().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = self.center(labels[i], j) + noise.sample(&mut rng);
            }
        }
        Dataset::new(labels, features, self.num_classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::estimator::estimate;
    use crate::algorithms::statistics::accumulate;
    use approx::assert_abs_diff_eq;

    #[test]
    fn same_seed_same_data() -> Result<()> {
        let a = GaussianBlobs::new(3, 4).seed(42).generate(50)?;
        let b = GaussianBlobs::new(3, 4).seed(42).generate(50)?;
        assert_eq!(a.features(), b.features());
        assert_eq!(a.labels(), b.labels());
        let c = GaussianBlobs::new(3, 4).seed(43).generate(50)?;
        assert_ne!(a.features(), c.features());
        Ok(())
    }

    #[test]
    fn every_class_is_present() -> Result<()> {
        let ds = GaussianBlobs::new(5, 2).generate(5)?;
        assert_eq!(ds.labels(), &[0, 1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn estimated_moments_approach_blob_parameters() -> Result<()> {
        let blobs = GaussianBlobs::new(2, 3).seed(7).spread(2.0);
        let model = estimate(&accumulate(&blobs.generate(20_000)?)?)?;
        for k in 0..2 {
            assert_abs_diff_eq!(model.priors[k], 0.5, epsilon = 1e-12);
            for j in 0..3 {
                assert_abs_diff_eq!(model.means[[k, j]], blobs.center(k, j), epsilon = 0.1);
                assert_abs_diff_eq!(model.variances[[k, j]], 4.0, epsilon = 0.25);
            }
        }
        Ok(())
    }

    #[test]
    fn separation_moves_class_centers() -> Result<()> {
        let blobs = GaussianBlobs::new(3, 2).separation(20.0).spread(0.0);
        assert_eq!(blobs.center(2, 1), 40.5);
        let ds = blobs.generate(3)?;
        assert_eq!(ds.example(1), ndarray::array![20.0, 20.5].view());
        Ok(())
    }

    #[test]
    fn invalid_shape_parameters_are_rejected() {
        for spread in [-1.0, f64::NAN, f64::INFINITY] {
            let err = GaussianBlobs::new(2, 2).spread(spread).generate(4).unwrap_err();
            assert!(matches!(err, NaiveBayesError::InvalidParameter(_)), "{}", spread);
        }
        let err = GaussianBlobs::new(2, 2).separation(f64::NAN).generate(4).unwrap_err();
        assert!(matches!(err, NaiveBayesError::InvalidParameter(_)));
    }
}
