use chrono::NaiveDate;
use ndarray::{s, Array1, Array2};

use crate::error::{VolError, VolResult};

/// Feature values for one date, ordered like the builder's feature names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

impl FeatureRow {
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| v.is_some_and(f64::is_finite))
    }
}

/// Every feature row of a series, warm-up rows included.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub feature_names: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row, which carries no label and is what the predictor consumes.
    pub fn latest(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.feature_names.iter().position(|n| n == name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }
}

/// Complete feature/label rows in ascending date order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    dates: Vec<NaiveDate>,
    features: Array2<f64>,
    target: Array1<f64>,
}

impl Dataset {
    pub fn new(
        feature_names: Vec<String>,
        dates: Vec<NaiveDate>,
        features: Array2<f64>,
        target: Array1<f64>,
    ) -> VolResult<Self> {
        if features.nrows() != dates.len() || target.len() != dates.len() {
            return Err(VolError::model(format!(
                "dataset shape mismatch: {} dates, {} feature rows, {} targets",
                dates.len(),
                features.nrows(),
                target.len()
            )));
        }
        if features.ncols() != feature_names.len() {
            return Err(VolError::model(format!(
                "dataset has {} columns but {} feature names",
                features.ncols(),
                feature_names.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(VolError::invalid_series(
                "dataset dates must be strictly increasing",
            ));
        }
        Ok(Self {
            feature_names,
            dates,
            features,
            target,
        })
    }

    /// Inner join of feature rows and labels, keeping only rows with every value present.
    pub fn from_rows(table: &FeatureTable, labels: &[Option<f64>]) -> VolResult<Self> {
        let n_features = table.feature_names.len();
        let mut dates = Vec::new();
        let mut flat = Vec::new();
        let mut target = Vec::new();
        for (row, label) in table.rows.iter().zip(labels) {
            let Some(y) = label.filter(|v| v.is_finite()) else {
                continue;
            };
            if !row.is_complete() {
                continue;
            }
            dates.push(row.date);
            flat.extend(row.values.iter().map(|v| v.unwrap_or(f64::NAN)));
            target.push(y);
        }
        let features = Array2::from_shape_vec((dates.len(), n_features), flat)
            .map_err(|e| VolError::model(e.to_string()))?;
        Self::new(
            table.feature_names.clone(),
            dates,
            features,
            Array1::from_vec(target),
        )
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    pub fn row(&self, i: usize) -> FeatureRow {
        FeatureRow {
            date: self.dates[i],
            values: self.features.row(i).iter().map(|v| Some(*v)).collect(),
        }
    }

    /// Contiguous block of rows `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        Self {
            feature_names: self.feature_names.clone(),
            dates: self.dates[start..end].to_vec(),
            features: self.features.slice(s![start..end, ..]).to_owned(),
            target: self.target.slice(s![start..end]).to_owned(),
        }
    }

    pub fn tail(&self, n: usize) -> Self {
        self.slice(self.len().saturating_sub(n), self.len())
    }
}
