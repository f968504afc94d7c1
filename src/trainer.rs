use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{VolError, VolResult};
use crate::features::Dataset;
use crate::regressor::{mean_absolute_error, Model, ModelSpec};
use crate::validation::{Fold, TimeSeriesSplit};

/// Rows beyond `n_splits` required before cross-validation is attempted.
pub const DEFAULT_MIN_FOLD_ROWS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub n_splits: usize,
    pub min_fold_rows: usize,
    pub model: ModelSpec,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_splits: 5,
            min_fold_rows: DEFAULT_MIN_FOLD_ROWS,
            model: ModelSpec::default(),
        }
    }
}

/// Out-of-sample result of one cross-validation fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldReport {
    pub index: usize,
    pub train_rows: usize,
    pub validation_rows: usize,
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub validation_start: NaiveDate,
    pub validation_end: NaiveDate,
    /// Mean absolute error in annualized volatility units.
    pub mae: f64,
}

#[derive(Debug)]
pub struct TrainingReport {
    /// Fitted on the entire dataset.
    pub model: Model,
    /// Mean of the fold MAEs; `None` when the dataset was too small to cross-validate.
    pub mae_cv: Option<f64>,
    pub folds: Vec<FoldReport>,
}

impl TrainingReport {
    pub fn into_parts(self) -> (Model, Option<f64>) {
        (self.model, self.mae_cv)
    }
}

#[derive(Debug, Clone)]
pub struct Trainer {
    spec: ModelSpec,
    min_fold_rows: usize,
}

impl Trainer {
    pub fn new(spec: ModelSpec) -> VolResult<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            min_fold_rows: DEFAULT_MIN_FOLD_ROWS,
        })
    }

    pub fn from_config(cfg: &TrainingConfig) -> VolResult<Self> {
        Ok(Self::new(cfg.model.clone())?.with_min_fold_rows(cfg.min_fold_rows))
    }

    /// At least one row is always required per fold.
    pub fn with_min_fold_rows(mut self, rows: usize) -> Self {
        self.min_fold_rows = rows.max(1);
        self
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Cross-validate with forward-chaining folds, then refit on every row.
    pub fn train(&self, dataset: &Dataset, n_splits: usize) -> VolResult<TrainingReport> {
        if dataset.is_empty() {
            return Err(VolError::InsufficientData {
                required: 1,
                available: 0,
            });
        }
        let splitter = TimeSeriesSplit::new(n_splits)?;

        let splits = if dataset.len() >= n_splits + self.min_fold_rows {
            splitter.split(dataset.len()).ok()
        } else {
            None
        };
        let folds = match splits {
            Some(splits) => splits
                .into_par_iter()
                .enumerate()
                .map(|(index, fold)| self.evaluate_fold(dataset, index, &fold))
                .collect::<VolResult<Vec<_>>>()?,
            None => {
                tracing::warn!(
                    rows = dataset.len(),
                    required = n_splits + self.min_fold_rows,
                    "Dataset too small for cross-validation; skipping"
                );
                Vec::new()
            }
        };

        let mae_cv = if folds.is_empty() {
            None
        } else {
            Some(folds.iter().map(|f| f.mae).sum::<f64>() / folds.len() as f64)
        };

        let mut regressor = self.spec.build();
        regressor.fit(dataset.features(), dataset.target())?;
        let model = Model::from_fitted(dataset.feature_names().to_vec(), regressor);

        tracing::info!(
            model = model.name(),
            rows = dataset.len(),
            folds = folds.len(),
            mae_cv = ?mae_cv,
            "Trained volatility model"
        );
        Ok(TrainingReport {
            model,
            mae_cv,
            folds,
        })
    }

    fn evaluate_fold(&self, dataset: &Dataset, index: usize, fold: &Fold) -> VolResult<FoldReport> {
        let train = dataset.slice(fold.train.start, fold.train.end);
        let validation = dataset.slice(fold.validation.start, fold.validation.end);
        let (Some(train_start), Some(train_end)) = (train.dates().first(), train.dates().last())
        else {
            return Err(VolError::InsufficientData {
                required: 1,
                available: 0,
            });
        };
        let (Some(validation_start), Some(validation_end)) =
            (validation.dates().first(), validation.dates().last())
        else {
            return Err(VolError::InsufficientData {
                required: 1,
                available: 0,
            });
        };

        let mut regressor = self.spec.build();
        regressor.fit(train.features(), train.target())?;
        let predicted = regressor.predict(validation.features())?;
        let mae = mean_absolute_error(validation.target(), &predicted);

        tracing::debug!(
            fold = index,
            train_rows = train.len(),
            validation_rows = validation.len(),
            mae,
            "Evaluated fold"
        );
        Ok(FoldReport {
            index,
            train_rows: train.len(),
            validation_rows: validation.len(),
            train_start: *train_start,
            train_end: *train_end,
            validation_start: *validation_start,
            validation_end: *validation_end,
            mae,
        })
    }
}
