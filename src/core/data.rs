// src/core/data.rs
use crate::core::errors::{NaiveBayesError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::fmt;

/// A single example's features.
pub type FeatureVector = Array1<f64>;

/// A row-major feature matrix, one example per row.
pub type Features = Array2<f64>;

/// Predicted class indices, one per example, in dataset order.
pub type Predictions = Vec<usize>;

/// Labeled examples. Read-only once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    labels: Vec<usize>,
    features: Features,
    num_classes: usize,
}

impl Dataset {
    pub fn new(labels: Vec<usize>, features: Features, num_classes: usize) -> Result<Self> {
        if num_classes == 0 {
            return Err(NaiveBayesError::InvalidParameter(
                "num_classes must be positive.".to_string(),
            ));
        }
        if features.ncols() == 0 {
            return Err(NaiveBayesError::InvalidParameter(
                "num_features must be positive.".to_string(),
            ));
        }
        if labels.len() != features.nrows() {
            return Err(NaiveBayesError::IncompatibleDimensions(format!(
                "Dataset has {} labels but {} feature rows.",
                labels.len(),
                features.nrows()
            )));
        }
        if let Some((index, feature)) = first_non_finite(features.view()) {
            return Err(NaiveBayesError::NonFinite(format!(
                "example {} feature {} is {}.",
                index,
                feature,
                features[[index, feature]]
            )));
        }
        Ok(Dataset {
            labels,
            features,
            num_classes,
        })
    }

    /// Builds a dataset from row vectors. All rows must have the same length.
    pub fn from_rows(labels: Vec<usize>, rows: Vec<Vec<f64>>, num_classes: usize) -> Result<Self> {
        let num_features = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut flat = Vec::with_capacity(rows.len() * num_features);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != num_features {
                return Err(NaiveBayesError::IncompatibleDimensions(format!(
                    "Row {} has {} features, expected {}.",
                    i,
                    row.len(),
                    num_features
                )));
            }
            flat.extend_from_slice(row);
        }
        let features = Features::from_shape_vec((rows.len(), num_features), flat)?;
        Dataset::new(labels, features, num_classes)
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    pub fn example(&self, index: usize) -> ArrayView1<'_, f64> {
        self.features.row(index)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The trained classifier: per-class priors, per-class-per-feature means and
/// population variances.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub priors: Array1<f64>,
    /// Shape `(num_classes, num_features)`.
    pub means: Array2<f64>,
    /// Shape `(num_classes, num_features)`. Never negative.
    pub variances: Array2<f64>,
}

impl ModelParameters {
    /// Builds parameters after checking that the three tables agree in shape,
    /// that every entry is finite, and that priors and variances are
    /// non-negative.
    pub fn new(priors: Array1<f64>, means: Array2<f64>, variances: Array2<f64>) -> Result<Self> {
        if means.dim() != variances.dim() || means.nrows() != priors.len() {
            return Err(NaiveBayesError::IncompatibleDimensions(format!(
                "priors {}, means {:?} and variances {:?} disagree.",
                priors.len(),
                means.dim(),
                variances.dim()
            )));
        }
        if priors.is_empty() || means.ncols() == 0 {
            return Err(NaiveBayesError::InvalidParameter(
                "Model must have at least one class and one feature.".to_string(),
            ));
        }
        if let Some((class, feature)) = first_non_finite(means.view()) {
            return Err(NaiveBayesError::NonFinite(format!(
                "mean of class {} feature {} is {}.",
                class,
                feature,
                means[[class, feature]]
            )));
        }
        if let Some((class, feature)) = first_non_finite(variances.view()) {
            return Err(NaiveBayesError::NonFinite(format!(
                "variance of class {} feature {} is {}.",
                class,
                feature,
                variances[[class, feature]]
            )));
        }
        if priors.iter().any(|p| !p.is_finite()) {
            return Err(NaiveBayesError::NonFinite("Priors must be finite.".to_string()));
        }
        if priors.iter().any(|&p| !(p >= 0.0)) {
            return Err(NaiveBayesError::InvalidParameter(
                "Priors must be non-negative.".to_string(),
            ));
        }
        if variances.iter().any(|&v| !(v >= 0.0)) {
            return Err(NaiveBayesError::InvalidParameter(
                "Variances must be non-negative.".to_string(),
            ));
        }
        Ok(ModelParameters {
            priors,
            means,
            variances,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.priors.len()
    }

    pub fn num_features(&self) -> usize {
        self.means.ncols()
    }
}

impl fmt::Display for ModelParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ModelParameters ({} classes, {} features):",
            self.num_classes(),
            self.num_features()
        )?;
        for k in 0..self.num_classes() {
            writeln!(f, "  Class {}: prior {:.4}", k, self.priors[k])?;
            for (j, (mean, var)) in self
                .means
                .row(k)
                .iter()
                .zip(self.variances.row(k).iter())
                .take(10)
                .enumerate()
            {
                writeln!(f, "    Feature {}: mean {:.4}, variance {:.4}", j, mean, var)?;
            }
            if self.num_features() > 10 {
                writeln!(f, "    ...")?;
            }
        }
        Ok(())
    }
}

/// Position of the first NaN or infinite entry, in row-major order.
fn first_non_finite(values: ArrayView2<'_, f64>) -> Option<(usize, usize)> {
    values
        .indexed_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(index, _)| index)
}

/// Rounds `value` up to the next multiple of `alignment`.
pub fn round_up(value: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}
