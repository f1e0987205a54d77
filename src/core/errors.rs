// src/core/errors.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NaiveBayesError {
    /// A training label outside `[0, num_classes)`.
    #[error(
        "Invalid Label: example {index} has label {label}, expected a value in [0, {num_classes})"
    )]
    InvalidLabel {
        index: usize,
        label: i64,
        num_classes: usize,
    },

    /// No training examples were observed for a class.
    #[error("Empty Class: no training examples for class {class}")]
    EmptyClass { class: usize },

    /// Classification requested before a model was trained.
    #[error("Not Trained: the classifier has no trained model")]
    NotTrained,

    #[error("Invalid Parameter: {0}")]
    InvalidParameter(String),

    /// A NaN or infinite value in a dataset or in estimated parameters.
    #[error("Non-Finite Value: {0}")]
    NonFinite(String),

    /// An external compute provider failed to classify a work unit.
    #[error("Execution Failure: work unit {unit}: {reason}")]
    ExecutionFailure { unit: usize, reason: String },

    #[error("Incompatible Dimensions: {0}")]
    IncompatibleDimensions(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed dataset text; `line` is 1-based.
    #[error("Parse Error: line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Ndarray Error: {0}")]
    NdarrayError(String),
}

impl From<ndarray::ShapeError> for NaiveBayesError {
    fn from(err: ndarray::ShapeError) -> Self {
        NaiveBayesError::NdarrayError(format!("ndarray ShapeError: {}", err))
    }
}

impl From<toml::de::Error> for NaiveBayesError {
    fn from(err: toml::de::Error) -> Self {
        NaiveBayesError::Config(err.to_string())
    }
}

// Convenience type alias for Result
pub type Result<T> = std::result::Result<T, NaiveBayesError>;
