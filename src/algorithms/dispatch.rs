// src/algorithms/dispatch.rs

use crate::algorithms::likelihood::LikelihoodEvaluator;
use crate::core::{
    round_up, Backend, Features, ModelParameters, NaiveBayesConfig, NaiveBayesError,
    OffloadFailurePolicy, Predictions, Result,
};
use crate::traits::{ComputeProvider, UnitRequest};
use log::{debug, warn};
use ndarray::{s, ArrayView2};
use rayon::prelude::*;
use std::sync::Arc;

/// A contiguous slice of the dataset handled as one independent job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    pub index: usize,
    pub start: usize,
    /// Examples actually present; the rest of the chunk is padding.
    pub live: usize,
}

impl WorkUnit {
    pub fn end(&self) -> usize {
        self.start + self.live
    }
}

/// How `N` examples are split into `W` units.
///
/// `chunk_size = round_up(ceil(N / W), alignment)`. Unit `u` covers
/// `[u * chunk_size, min((u + 1) * chunk_size, N))`; units starting at or
/// past `N` are empty and are not scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub num_examples: usize,
    pub work_units: usize,
    pub chunk_size: usize,
}

impl ChunkPlan {
    pub fn new(num_examples: usize, work_units: usize, alignment: usize) -> Result<Self> {
        if work_units == 0 || alignment == 0 {
            return Err(NaiveBayesError::InvalidParameter(
                "work_units and alignment must be positive.".to_string(),
            ));
        }
        let chunk_size = round_up(num_examples.div_ceil(work_units), alignment);
        Ok(ChunkPlan {
            num_examples,
            work_units,
            chunk_size,
        })
    }

    /// Non-empty units in ascending order.
    pub fn units(&self) -> impl Iterator<Item = WorkUnit> + '_ {
        (0..self.work_units).filter_map(move |index| {
            let start = index * self.chunk_size;
            if start >= self.num_examples {
                return None;
            }
            let live = self.chunk_size.min(self.num_examples - start);
            Some(WorkUnit { index, start, live })
        })
    }
}

/// Where units are executed.
#[derive(Clone)]
pub enum ExecutionPolicy {
    Sequential,
    /// Units run on a rayon pool, each writing its own slice of the output.
    Parallel,
    /// Units are handed to an external provider and awaited.
    Offload(Arc<dyn ComputeProvider>),
}

impl std::fmt::Debug for ExecutionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionPolicy::Sequential => write!(f, "Sequential"),
            ExecutionPolicy::Parallel => write!(f, "Parallel"),
            ExecutionPolicy::Offload(provider) => write!(f, "Offload({})", provider.name()),
        }
    }
}

impl From<Backend> for ExecutionPolicy {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Sequential => ExecutionPolicy::Sequential,
            Backend::Parallel => ExecutionPolicy::Parallel,
        }
    }
}

/// Splits a batch into work units and labels every live example.
///
/// Whatever the policy, the output for a given model and batch is the same:
/// each example is scored by the same [`LikelihoodEvaluator`], and units
/// write disjoint ranges of the output.
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    work_units: usize,
    chunk_alignment: usize,
    feature_alignment: usize,
    policy: ExecutionPolicy,
    offload_failure: OffloadFailurePolicy,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl BatchDispatcher {
    pub fn new(config: &NaiveBayesConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.threads {
            Some(threads) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| {
                        NaiveBayesError::Config(format!("Failed to build worker pool: {}", e))
                    })?,
            )),
            None => None,
        };
        Ok(BatchDispatcher {
            work_units: config.work_units,
            chunk_alignment: config.chunk_alignment,
            feature_alignment: config.feature_alignment,
            policy: config.backend.into(),
            offload_failure: config.offload_failure,
            pool,
        })
    }

    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_work_units(mut self, work_units: usize) -> Result<Self> {
        if work_units == 0 {
            return Err(NaiveBayesError::InvalidParameter(
                "work_units must be positive.".to_string(),
            ));
        }
        self.work_units = work_units;
        Ok(self)
    }

    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    pub fn plan(&self, num_examples: usize) -> Result<ChunkPlan> {
        ChunkPlan::new(num_examples, self.work_units, self.chunk_alignment)
    }

    /// Labels every row of `features`.
    pub fn dispatch(
        &self,
        params: &ModelParameters,
        features: ArrayView2<'_, f64>,
        epsilon: f64,
    ) -> Result<Predictions> {
        if features.ncols() != params.num_features() {
            return Err(NaiveBayesError::IncompatibleDimensions(format!(
                "Batch has {} features, but the model expects {}.",
                features.ncols(),
                params.num_features()
            )));
        }
        let evaluator = LikelihoodEvaluator::new(params, epsilon)?;
        let plan = self.plan(features.nrows())?;
        debug!(
            "Dispatching {} examples as {} units of {} ({:?})",
            plan.num_examples,
            plan.units().count(),
            plan.chunk_size,
            self.policy
        );

        let mut predictions = vec![0usize; features.nrows()];
        if predictions.is_empty() {
            return Ok(predictions);
        }

        match &self.policy {
            ExecutionPolicy::Sequential => {
                for (unit, out) in plan.units().zip(predictions.chunks_mut(plan.chunk_size)) {
                    classify_unit(&evaluator, unit_rows(features, unit), out);
                }
            }
            ExecutionPolicy::Parallel => {
                let units: Vec<WorkUnit> = plan.units().collect();
                let mut run = || {
                    predictions
                        .par_chunks_mut(plan.chunk_size)
                        .zip(units.par_iter())
                        .for_each(|(out, &unit)| {
                            classify_unit(&evaluator, unit_rows(features, unit), out);
                        });
                };
                match &self.pool {
                    Some(pool) => pool.install(run),
                    None => run(),
                }
            }
            ExecutionPolicy::Offload(provider) => {
                self.offload(provider.as_ref(), &evaluator, &plan, features, &mut predictions)?;
            }
        }
        Ok(predictions)
    }

    /// Submits every unit, waits for all of them, then copies results out in
    /// unit order. Failed units are handled per `offload_failure`.
    fn offload(
        &self,
        provider: &dyn ComputeProvider,
        evaluator: &LikelihoodEvaluator<'_>,
        plan: &ChunkPlan,
        features: ArrayView2<'_, f64>,
        predictions: &mut [usize],
    ) -> Result<()> {
        let params = evaluator.params();
        let epsilon = evaluator.epsilon();
        let padded_width = round_up(params.num_features(), self.feature_alignment);

        let completions: Vec<(WorkUnit, Result<Predictions>)> = std::thread::scope(|scope| {
            let pending: Vec<_> = plan
                .units()
                .map(|unit| {
                    let rows = unit_rows(features, unit);
                    let packed = pack_unit(rows, plan.chunk_size, padded_width);
                    let handle = scope.spawn(move || {
                        provider.submit(UnitRequest {
                            unit: unit.index,
                            features: packed.view(),
                            live: unit.live,
                            params,
                            epsilon,
                            num_classes: params.num_classes(),
                            num_features: params.num_features(),
                            chunk_size: plan.chunk_size,
                        })
                    });
                    (unit, handle)
                })
                .collect();

            pending
                .into_iter()
                .map(|(unit, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(NaiveBayesError::ExecutionFailure {
                            unit: unit.index,
                            reason: format!("provider '{}' panicked", provider.name()),
                        })
                    });
                    (unit, result)
                })
                .collect()
        });

        for (unit, result) in completions {
            let out = &mut predictions[unit.start..unit.end()];
            let checked = result.and_then(|labels| {
                check_unit_output(unit, &labels, params.num_classes())?;
                Ok(labels)
            });
            match checked {
                Ok(labels) => out.copy_from_slice(&labels[..unit.live]),
                Err(err) => {
                    let err = as_execution_failure(unit, err);
                    match self.offload_failure {
                        OffloadFailurePolicy::Abort => return Err(err),
                        OffloadFailurePolicy::FallbackLocal => {
                            warn!("{}; evaluating unit {} locally", err, unit.index);
                            classify_unit(evaluator, unit_rows(features, unit), out);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn unit_rows<'a>(features: ArrayView2<'a, f64>, unit: WorkUnit) -> ArrayView2<'a, f64> {
    features.slice_move(s![unit.start..unit.end(), ..])
}

fn classify_unit(
    evaluator: &LikelihoodEvaluator<'_>,
    rows: ArrayView2<'_, f64>,
    out: &mut [usize],
) {
    for (row, slot) in rows.rows().into_iter().zip(out.iter_mut()) {
        *slot = evaluator.classify_unchecked(row);
    }
}

/// Copies a unit's rows into a zeroed `(chunk_size, padded_width)` matrix.
pub fn pack_unit(rows: ArrayView2<'_, f64>, chunk_size: usize, padded_width: usize) -> Features {
    let mut packed = Features::zeros((chunk_size, padded_width));
    packed
        .slice_mut(s![..rows.nrows(), ..rows.ncols()])
        .assign(&rows);
    packed
}

fn check_unit_output(unit: WorkUnit, labels: &[usize], num_classes: usize) -> Result<()> {
    if labels.len() < unit.live {
        return Err(NaiveBayesError::ExecutionFailure {
            unit: unit.index,
            reason: format!("returned {} labels for {} examples", labels.len(), unit.live),
        });
    }
    if let Some(&bad) = labels[..unit.live].iter().find(|&&l| l >= num_classes) {
        return Err(NaiveBayesError::ExecutionFailure {
            unit: unit.index,
            reason: format!("returned class {} outside [0, {})", bad, num_classes),
        });
    }
    Ok(())
}

fn as_execution_failure(unit: WorkUnit, err: NaiveBayesError) -> NaiveBayesError {
    match err {
        NaiveBayesError::ExecutionFailure { .. } => err,
        other => NaiveBayesError::ExecutionFailure {
            unit: unit.index,
            reason: other.to_string(),
        },
    }
}
