pub mod classifier;
pub mod dispatch;
pub mod estimator;
pub mod likelihood;
pub mod provider;
pub mod statistics;

pub use classifier::GaussianNaiveBayes;
pub use dispatch::{BatchDispatcher, ChunkPlan, ExecutionPolicy, WorkUnit};
pub use estimator::estimate;
pub use likelihood::LikelihoodEvaluator;
pub use provider::SoftwareProvider;
pub use statistics::{accumulate, accumulate_parallel, SufficientStatistics};
