use std::ops::Range;

use crate::error::{VolError, VolResult};

/// Train/validation index ranges for one fold. Training always precedes validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Range<usize>,
    pub validation: Range<usize>,
}

/// Forward-chaining splits over time-ordered rows.
///
/// Each validation block has `n / (n_splits + 1)` rows; the blocks tile the end of the
/// data and every fold trains on all rows before its block. Rows are never shuffled.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesSplit {
    n_splits: usize,
}

impl TimeSeriesSplit {
    pub fn new(n_splits: usize) -> VolResult<Self> {
        if n_splits < 2 {
            return Err(VolError::invalid_config(format!(
                "time series split needs at least 2 folds, got {}",
                n_splits
            )));
        }
        Ok(Self { n_splits })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn split(&self, n_samples: usize) -> VolResult<Vec<Fold>> {
        let test_size = n_samples / (self.n_splits + 1);
        if test_size == 0 {
            return Err(VolError::InsufficientData {
                required: self.n_splits + 1,
                available: n_samples,
            });
        }
        let first = n_samples - self.n_splits * test_size;
        Ok((0..self.n_splits)
            .map(|k| {
                let start = first + k * test_size;
                Fold {
                    train: 0..start,
                    validation: start..start + test_size,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_tile_the_tail() {
        let folds = TimeSeriesSplit::new(3).unwrap().split(10).unwrap();
        assert_eq!(
            folds,
            vec![
                Fold { train: 0..4, validation: 4..6 },
                Fold { train: 0..6, validation: 6..8 },
                Fold { train: 0..8, validation: 8..10 },
            ]
        );
    }

    #[test]
    fn training_block_always_precedes_validation() {
        for n in [7usize, 50, 101, 999] {
            for k in 2..6 {
                let folds = TimeSeriesSplit::new(k).unwrap().split(n).unwrap();
                assert_eq!(folds.len(), k);
                for f in &folds {
                    assert!(!f.train.is_empty());
                    assert!(f.train.end <= f.validation.start);
                    assert!(f.validation.end <= n);
                }
                assert_eq!(folds.last().unwrap().validation.end, n);
            }
        }
    }

    #[test]
    fn too_few_rows_or_folds_is_an_error() {
        assert!(TimeSeriesSplit::new(1).is_err());
        assert!(matches!(
            TimeSeriesSplit::new(5).unwrap().split(4),
            Err(VolError::InsufficientData { .. })
        ));
    }
}
