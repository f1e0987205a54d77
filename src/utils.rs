// src/utils.rs

use crate::core::{NaiveBayesError, Result};
use std::fmt;

/// Correct predictions out of a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
}

impl Evaluation {
    pub fn new(predictions: &[usize], labels: &[usize]) -> Result<Self> {
        if predictions.len() != labels.len() {
            return Err(NaiveBayesError::IncompatibleDimensions(format!(
                "{} predictions for {} labels.",
                predictions.len(),
                labels.len()
            )));
        }
        let correct = predictions
            .iter()
            .zip(labels.iter())
            .filter(|(p, l)| p == l)
            .count();
        Ok(Evaluation {
            correct,
            total: labels.len(),
        })
    }

    /// Fraction in `[0, 1]`; `0.0` for an empty set.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Accuracy: {:.2} % ({}/{})",
            100.0 * self.accuracy(),
            self.correct,
            self.total
        )
    }
}
