// src/algorithms/likelihood.rs

use crate::core::{validate_epsilon, ModelParameters, NaiveBayesError, Result};
use ndarray::{Array1, ArrayView1};
use std::f64::consts::PI;

/// Scores examples against a trained model under a diagonal Gaussian.
///
/// For class `k` the score is
///
/// ```text
/// log(prior[k]) + sum_j [ -0.5 * log(2*pi*(var[k][j] + eps))
///                         - (x[j] - mean[k][j])^2 / (2*(var[k][j] + eps)) ]
/// ```
///
/// summed in ascending feature order. Only the first `num_features` entries
/// of `x` are read, so rows carrying alignment padding can be passed as is.
#[derive(Debug, Clone, Copy)]
pub struct LikelihoodEvaluator<'a> {
    params: &'a ModelParameters,
    epsilon: f64,
}

impl<'a> LikelihoodEvaluator<'a> {
    pub fn new(params: &'a ModelParameters, epsilon: f64) -> Result<Self> {
        validate_epsilon(epsilon)?;
        Ok(LikelihoodEvaluator { params, epsilon })
    }

    pub fn params(&self) -> &'a ModelParameters {
        self.params
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Checks that `x` holds at least the model's features.
    pub fn check_width(&self, width: usize) -> Result<()> {
        if width < self.params.num_features() {
            return Err(NaiveBayesError::IncompatibleDimensions(format!(
                "Example has {} features, but the model expects {}.",
                width,
                self.params.num_features()
            )));
        }
        Ok(())
    }

    /// Log-likelihood of `x` under class `k`. The caller guarantees the width.
    pub fn score(&self, x: ArrayView1<'_, f64>, k: usize) -> f64 {
        let means = self.params.means.row(k);
        let variances = self.params.variances.row(k);
        let mut score = self.params.priors[k].ln();
        for j in 0..self.params.num_features() {
            let var = variances[j] + self.epsilon;
            let diff = x[j] - means[j];
            score += -0.5 * (2.0 * PI * var).ln() - (diff * diff) / (2.0 * var);
        }
        score
    }

    /// One score per class, in class order.
    pub fn scores(&self, x: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        self.check_width(x.len())?;
        Ok((0..self.params.num_classes())
            .map(|k| self.score(x, k))
            .collect())
    }

    /// The arg-max class of `x`.
    pub fn classify(&self, x: ArrayView1<'_, f64>) -> Result<usize> {
        self.check_width(x.len())?;
        Ok(self.classify_unchecked(x))
    }

    /// Arg-max without the width check, for callers that validated a whole
    /// batch up front.
    pub(crate) fn classify_unchecked(&self, x: ArrayView1<'_, f64>) -> usize {
        let mut best_class = 0;
        let mut best_score = f64::NEG_INFINITY;
        for k in 0..self.params.num_classes() {
            let score = self.score(x, k);
            if score > best_score {
                best_score = score;
                best_class = k;
            }
        }
        best_class
    }
}
