// src/lib.rs

//! `gnb_rs` is a Rust crate for Gaussian Naive Bayes classification: it
//! accumulates per-class sufficient statistics, estimates priors, means and
//! variances from them, and labels batches of examples by maximum
//! log-likelihood, sequentially, on a thread pool, or through an external
//! compute provider.

// Declare the main modules of the crate
pub mod algorithms;
pub mod core;
pub mod loader;
pub mod synthetic;
pub mod traits;
pub mod utils;

// Re-export key components for easier use by library consumers
pub use crate::algorithms::{
    BatchDispatcher, ExecutionPolicy, GaussianNaiveBayes, LikelihoodEvaluator, SoftwareProvider,
};
pub use crate::core::{
    Backend, Dataset, ModelParameters, NaiveBayesConfig, NaiveBayesError, OffloadFailurePolicy,
    Predictions, Result,
};
pub use crate::loader::DatasetLoader;
pub use crate::traits::{Classify, ComputeProvider, UnitRequest};
pub use crate::utils::Evaluation;
