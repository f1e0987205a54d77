// src/algorithms/provider.rs

use crate::algorithms::likelihood::LikelihoodEvaluator;
use crate::core::{NaiveBayesError, Predictions, Result};
use crate::traits::{ComputeProvider, UnitRequest};

/// Reference [`ComputeProvider`] that evaluates packed units on the host.
///
/// Only the first `live` rows are scored; zero padding rows past them never
/// reach the evaluator, so the result holds exactly `live` labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareProvider;

impl ComputeProvider for SoftwareProvider {
    fn name(&self) -> &str {
        "software"
    }

    fn submit(&self, request: UnitRequest<'_>) -> Result<Predictions> {
        if request.features.nrows() != request.chunk_size || request.live > request.chunk_size {
            return Err(NaiveBayesError::ExecutionFailure {
                unit: request.unit,
                reason: format!(
                    "unit holds {} rows ({} live) but chunk size is {}",
                    request.features.nrows(),
                    request.live,
                    request.chunk_size
                ),
            });
        }
        let evaluator = LikelihoodEvaluator::new(request.params, request.epsilon)?;
        evaluator.check_width(request.features.ncols())?;
        Ok(request
            .features
            .rows()
            .into_iter()
            .take(request.live)
            .map(|row| evaluator.classify_unchecked(row))
            .collect())
    }
}
