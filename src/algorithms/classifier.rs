// src/algorithms/classifier.rs

use crate::algorithms::dispatch::{BatchDispatcher, ExecutionPolicy};
use crate::algorithms::estimator::estimate;
use crate::algorithms::statistics::{accumulate, accumulate_parallel};
use crate::core::{
    Dataset, ModelParameters, NaiveBayesConfig, NaiveBayesError, Predictions, Result,
};
use crate::traits::Classify;
use crate::utils::Evaluation;
use log::info;
use ndarray::ArrayView2;
use std::time::Instant;

/// Gaussian Naive Bayes: train once, then classify batches.
///
/// Training strictly precedes classification. A successful [`train`] replaces
/// the model wholesale; a failed one leaves the classifier untrained.
///
/// ```
/// use gnb_rs::{Dataset, GaussianNaiveBayes, NaiveBayesConfig};
///
/// let train = Dataset::from_rows(
///     vec![0, 0, 0, 1, 1],
///     vec![vec![1.0], vec![1.0], vec![3.0], vec![10.0], vec![12.0]],
///     2,
/// )?;
/// let mut nb = GaussianNaiveBayes::new(NaiveBayesConfig::new(2, 1))?;
/// nb.train(&train)?;
///
/// let query = Dataset::from_rows(vec![0, 1], vec![vec![1.2], vec![11.0]], 2)?;
/// assert_eq!(nb.predict(&query)?, vec![0, 1]);
/// # Ok::<(), gnb_rs::NaiveBayesError>(())
/// ```
///
/// [`train`]: GaussianNaiveBayes::train
#[derive(Debug, Clone)]
pub struct GaussianNaiveBayes {
    config: NaiveBayesConfig,
    dispatcher: BatchDispatcher,
    model: Option<ModelParameters>,
}

impl GaussianNaiveBayes {
    pub fn new(config: NaiveBayesConfig) -> Result<Self> {
        let dispatcher = BatchDispatcher::new(&config)?;
        Ok(GaussianNaiveBayes {
            config,
            dispatcher,
            model: None,
        })
    }

    /// Replaces the execution policy, e.g. to offload units to a provider.
    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.dispatcher = self.dispatcher.with_policy(policy);
        self
    }

    pub fn config(&self) -> &NaiveBayesConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&ModelParameters> {
        self.model.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn train(&mut self, dataset: &Dataset) -> Result<&ModelParameters> {
        self.model = None;
        self.check_dataset(dataset)?;

        info!(
            "Training on {} examples ({} classes, {} features)",
            dataset.len(),
            self.config.num_classes,
            self.config.num_features
        );
        let start = Instant::now();
        let stats = if self.config.parallel_training {
            accumulate_parallel(dataset)?
        } else {
            accumulate(dataset)?
        };
        let model = estimate(&stats)?;
        info!("Training took {:.2}s", start.elapsed().as_secs_f64());

        Ok(&*self.model.insert(model))
    }

    pub fn predict(&self, dataset: &Dataset) -> Result<Predictions> {
        self.check_dataset(dataset)?;
        self.classify(dataset.features())
    }

    /// Predicts and scores against the dataset's own labels.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<Evaluation> {
        let predictions = self.predict(dataset)?;
        Evaluation::new(&predictions, dataset.labels())
    }

    fn check_dataset(&self, dataset: &Dataset) -> Result<()> {
        if dataset.num_features() != self.num_features() {
            return Err(NaiveBayesError::IncompatibleDimensions(format!(
                "Dataset has {} features, but the classifier is configured for {}.",
                dataset.num_features(),
                self.num_features()
            )));
        }
        if dataset.num_classes() != self.config.num_classes {
            return Err(NaiveBayesError::IncompatibleDimensions(format!(
                "Dataset has {} classes, but the classifier is configured for {}.",
                dataset.num_classes(),
                self.config.num_classes
            )));
        }
        Ok(())
    }
}

impl Classify for GaussianNaiveBayes {
    fn classify(&self, features: ArrayView2<'_, f64>) -> Result<Predictions> {
        let model = self.model.as_ref().ok_or(NaiveBayesError::NotTrained)?;
        info!(
            "Classifying {} examples ({:?})",
            features.nrows(),
            self.dispatcher.policy()
        );
        let start = Instant::now();
        let predictions = self
            .dispatcher
            .dispatch(model, features, self.config.epsilon)?;
        info!("Classification took {:.2}s", start.elapsed().as_secs_f64());
        Ok(predictions)
    }

    fn num_features(&self) -> usize {
        self.config.num_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::provider::SoftwareProvider;
    use crate::core::Backend;
    use crate::synthetic::GaussianBlobs;
    use std::sync::Arc;

    #[test]
    fn predict_before_train_is_not_trained() -> Result<()> {
        let nb = GaussianNaiveBayes::new(NaiveBayesConfig::new(2, 1))?;
        let ds = Dataset::from_rows(vec![0], vec![vec![1.0]], 2)?;
        assert!(matches!(nb.predict(&ds), Err(NaiveBayesError::NotTrained)));
        Ok(())
    }

    #[test]
    fn failed_training_leaves_classifier_untrained() -> Result<()> {
        let mut nb = GaussianNaiveBayes::new(NaiveBayesConfig::new(3, 2))?;
        let good = GaussianBlobs::new(3, 2).seed(9).generate(30)?;
        nb.train(&good)?;
        assert!(nb.is_trained());

        // Class 2 never appears.
        let missing = Dataset::from_rows(vec![0, 1], vec![vec![0.0, 0.0], vec![1.0, 1.0]], 3)?;
        assert!(matches!(
            nb.train(&missing),
            Err(NaiveBayesError::EmptyClass { class: 2 })
        ));
        assert!(!nb.is_trained());
        assert!(matches!(nb.predict(&good), Err(NaiveBayesError::NotTrained)));
        Ok(())
    }

    #[test]
    fn overflowing_training_data_is_rejected() -> Result<()> {
        let mut nb = GaussianNaiveBayes::new(NaiveBayesConfig::new(2, 1))?;
        let rows = vec![vec![1e200], vec![-1e200], vec![1.0]];
        let huge = Dataset::from_rows(vec![0, 0, 1], rows, 2)?;
        assert!(matches!(nb.train(&huge), Err(NaiveBayesError::NonFinite(_))));
        assert!(!nb.is_trained());
        assert!(matches!(nb.predict(&huge), Err(NaiveBayesError::NotTrained)));
        Ok(())
    }

    #[test]
    fn usable_through_the_classify_trait() -> Result<()> {
        let train = GaussianBlobs::new(3, 4).seed(5).spread(0.5).generate(90)?;
        let mut nb = GaussianNaiveBayes::new(NaiveBayesConfig::new(3, 4))?;
        nb.train(&train)?;

        let model: &dyn Classify = &nb;
        assert_eq!(model.num_features(), 4);
        let predictions = model.classify(train.features())?;
        assert_eq!(predictions, nb.predict(&train)?);
        assert!(matches!(
            model.classify(ndarray::Array2::zeros((2, 3)).view()),
            Err(NaiveBayesError::IncompatibleDimensions(_))
        ));
        Ok(())
    }

    #[test]
    fn retraining_replaces_the_model() -> Result<()> {
        let mut nb = GaussianNaiveBayes::new(NaiveBayesConfig::new(3, 2))?;
        let first = nb.train(&GaussianBlobs::new(3, 2).seed(1).generate(30)?)?.clone();
        let second = nb.train(&GaussianBlobs::new(3, 2).seed(2).generate(45)?)?.clone();
        assert_ne!(first, second);
        assert_eq!(nb.model(), Some(&second));
        Ok(())
    }

    #[test]
    fn rejects_dataset_shape_mismatch() -> Result<()> {
        let mut nb = GaussianNaiveBayes::new(NaiveBayesConfig::new(3, 2))?;
        let ds = GaussianBlobs::new(3, 5).seed(1).generate(30)?;
        assert!(matches!(
            nb.train(&ds),
            Err(NaiveBayesError::IncompatibleDimensions(_))
        ));
        Ok(())
    }

    #[test]
    fn separable_blobs_are_learned() -> Result<()> {
        let train = GaussianBlobs::new(4, 8).seed(21).spread(0.5).generate(800)?;
        let test = GaussianBlobs::new(4, 8).seed(22).spread(0.5).generate(200)?;
        let mut nb = GaussianNaiveBayes::new(NaiveBayesConfig::new(4, 8))?;
        nb.train(&train)?;
        let eval = nb.evaluate(&test)?;
        assert_eq!(eval.total, 200);
        assert!(eval.accuracy() > 0.95, "{}", eval);
        Ok(())
    }

    #[test]
    fn backends_and_training_modes_agree() -> Result<()> {
        let train = GaussianBlobs::new(5, 6).seed(31).spread(4.0).generate(500)?;
        let test = GaussianBlobs::new(5, 6).seed(32).spread(4.0).generate(257)?;

        let mut sequential = GaussianNaiveBayes::new(NaiveBayesConfig {
            backend: Backend::Sequential,
            ..NaiveBayesConfig::new(5, 6)
        })?;
        sequential.train(&train)?;
        let expected = sequential.predict(&test)?;

        let mut parallel = GaussianNaiveBayes::new(NaiveBayesConfig {
            backend: Backend::Parallel,
            parallel_training: true,
            threads: Some(3),
            ..NaiveBayesConfig::new(5, 6)
        })?;
        parallel.train(&train)?;
        assert_eq!(parallel.model(), sequential.model());
        assert_eq!(parallel.predict(&test)?, expected);

        let mut offloaded = GaussianNaiveBayes::new(NaiveBayesConfig::new(5, 6))?
            .with_policy(ExecutionPolicy::Offload(Arc::new(SoftwareProvider)));
        offloaded.train(&train)?;
        assert_eq!(offloaded.predict(&test)?, expected);
        Ok(())
    }
}
