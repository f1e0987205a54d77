// src/algorithms/statistics.rs

use crate::core::{Dataset, NaiveBayesError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use rayon::prelude::*;

/// Examples per partial table in [`accumulate_parallel`]. Fixed so the merge
/// tree, and therefore the rounding, does not depend on the thread count.
pub const PARTIAL_BLOCK_SIZE: usize = 4096;

/// Per-class counts, feature sums and feature sums of squares.
#[derive(Debug, Clone, PartialEq)]
pub struct SufficientStatistics {
    pub count: Array1<usize>,
    /// Shape `(num_classes, num_features)`.
    pub sum: Array2<f64>,
    /// Shape `(num_classes, num_features)`.
    pub sum_squares: Array2<f64>,
}

impl SufficientStatistics {
    pub fn zeros(num_classes: usize, num_features: usize) -> Self {
        SufficientStatistics {
            count: Array1::zeros(num_classes),
            sum: Array2::zeros((num_classes, num_features)),
            sum_squares: Array2::zeros((num_classes, num_features)),
        }
    }

    pub fn num_classes(&self) -> usize {
        self.count.len()
    }

    pub fn num_features(&self) -> usize {
        self.sum.ncols()
    }

    /// Total number of accumulated examples.
    pub fn total(&self) -> usize {
        self.count.sum()
    }

    /// Adds one example of class `label`.
    pub fn observe(&mut self, label: usize, x: ArrayView1<'_, f64>) {
        self.count[label] += 1;
        Zip::from(self.sum.row_mut(label))
            .and(self.sum_squares.row_mut(label))
            .and(&x)
            .for_each(|s, sq, &v| {
                *s += v;
                *sq += v * v;
            });
    }

    /// Element-wise `self += other`.
    pub fn merge(&mut self, other: &SufficientStatistics) -> Result<()> {
        if self.sum.dim() != other.sum.dim() {
            return Err(NaiveBayesError::IncompatibleDimensions(format!(
                "Cannot merge statistics of shape {:?} into {:?}.",
                other.sum.dim(),
                self.sum.dim()
            )));
        }
        self.count += &other.count;
        self.sum += &other.sum;
        self.sum_squares += &other.sum_squares;
        Ok(())
    }
}

/// Single sequential pass over the dataset, in example order.
pub fn accumulate(dataset: &Dataset) -> Result<SufficientStatistics> {
    accumulate_range(
        dataset.labels(),
        dataset.features(),
        0,
        dataset.num_classes(),
    )
}

/// Blocked accumulation on the rayon pool.
///
/// Examples are split into blocks of [`PARTIAL_BLOCK_SIZE`]; each block fills
/// its own partial table, and the partials are merged left to right in
/// ascending block order. For datasets no larger than one block this is
/// bit-identical to [`accumulate`].
pub fn accumulate_parallel(dataset: &Dataset) -> Result<SufficientStatistics> {
    let labels = dataset.labels();
    let features = dataset.features();
    let num_classes = dataset.num_classes();

    let partials: Vec<SufficientStatistics> = labels
        .par_chunks(PARTIAL_BLOCK_SIZE)
        .enumerate()
        .map(|(block, block_labels)| {
            let start = block * PARTIAL_BLOCK_SIZE;
            let rows = features.slice(ndarray::s![start..start + block_labels.len(), ..]);
            accumulate_range(block_labels, rows, start, num_classes)
        })
        .collect::<Result<_>>()?;

    let mut total = SufficientStatistics::zeros(num_classes, dataset.num_features());
    for partial in &partials {
        total.merge(partial)?;
    }
    Ok(total)
}

/// `offset` is the dataset index of the first row, used in error reports.
fn accumulate_range(
    labels: &[usize],
    features: ArrayView2<'_, f64>,
    offset: usize,
    num_classes: usize,
) -> Result<SufficientStatistics> {
    let mut stats = SufficientStatistics::zeros(num_classes, features.ncols());
    for (i, (&label, row)) in labels.iter().zip(features.rows()).enumerate() {
        if label >= num_classes {
            return Err(NaiveBayesError::InvalidLabel {
                index: offset + i,
                label: label as i64,
                num_classes,
            });
        }
        stats.observe(label, row);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::GaussianBlobs;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn scenario() -> Result<Dataset> {
        Dataset::from_rows(
            vec![0, 0, 0, 1, 1],
            vec![vec![1.0], vec![1.0], vec![3.0], vec![10.0], vec![12.0]],
            2,
        )
    }

    #[test]
    fn accumulates_counts_sums_and_squares() -> Result<()> {
        let stats = accumulate(&scenario()?)?;
        assert_eq!(stats.count, array![3, 2]);
        assert_eq!(stats.sum, array![[5.0], [22.0]]);
        assert_eq!(stats.sum_squares, array![[11.0], [244.0]]);
        assert_eq!(stats.total(), 5);
        Ok(())
    }

    #[test]
    fn label_out_of_range_is_invalid_label() -> Result<()> {
        let ds = Dataset::from_rows(vec![0, 2, 1], vec![vec![1.0], vec![2.0], vec![3.0]], 2)?;
        let err = accumulate(&ds).unwrap_err();
        assert!(matches!(
            err,
            NaiveBayesError::InvalidLabel {
                index: 1,
                label: 2,
                num_classes: 2
            }
        ));
        assert!(matches!(
            accumulate_parallel(&ds),
            Err(NaiveBayesError::InvalidLabel { index: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn parallel_matches_sequential_on_small_data() -> Result<()> {
        let ds = scenario()?;
        assert_eq!(accumulate(&ds)?, accumulate_parallel(&ds)?);
        Ok(())
    }

    #[test]
    fn parallel_matches_sequential_across_blocks() -> Result<()> {
        let ds = GaussianBlobs::new(3, 5).seed(11).generate(3 * PARTIAL_BLOCK_SIZE + 17)?;
        let seq = accumulate(&ds)?;
        let par = accumulate_parallel(&ds)?;
        assert_eq!(seq.count, par.count);
        for (a, b) in seq.sum.iter().zip(par.sum.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
        }
        for (a, b) in seq.sum_squares.iter().zip(par.sum_squares.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
        }
        // The merge order is fixed, so repeated runs agree exactly.
        assert_eq!(par, accumulate_parallel(&ds)?);
        Ok(())
    }

    #[test]
    fn merge_rejects_shape_mismatch() {
        let mut a = SufficientStatistics::zeros(2, 3);
        let b = SufficientStatistics::zeros(2, 4);
        assert!(a.merge(&b).is_err());
    }
}
