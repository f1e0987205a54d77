// src/traits.rs

use crate::core::{ModelParameters, Predictions, Result};
use ndarray::ArrayView2;

/// Anything that labels a feature matrix, one class index per row.
pub trait Classify {
    fn classify(&self, features: ArrayView2<'_, f64>) -> Result<Predictions>;

    fn num_features(&self) -> usize;
}

/// The inputs handed to a [`ComputeProvider`] for one work unit.
#[derive(Debug, Clone, Copy)]
pub struct UnitRequest<'a> {
    pub unit: usize,
    /// `(chunk_size, num_features_padded)`. Rows past `live` and columns past
    /// `num_features` are zero padding.
    pub features: ArrayView2<'a, f64>,
    pub live: usize,
    pub params: &'a ModelParameters,
    pub epsilon: f64,
    pub num_classes: usize,
    pub num_features: usize,
    pub chunk_size: usize,
}

/// An external executor for work units, such as an accelerator runtime.
///
/// `submit` blocks until the unit completes. The dispatcher submits units
/// concurrently from separate threads and waits for all of them, so an
/// implementation only needs to handle one unit per call. It returns one label
/// per live row, in row order; padding rows are not examples and need no
/// label. Extra labels past `live` are tolerated and ignored. Returning an
/// error, or fewer than `live` labels, marks the unit as an execution failure.
pub trait ComputeProvider: Send + Sync {
    fn name(&self) -> &str;

    fn submit(&self, request: UnitRequest<'_>) -> Result<Predictions>;
}

