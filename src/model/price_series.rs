use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{VolError, VolResult};

/// A single daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ordered close prices with strictly increasing dates and positive values.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> VolResult<Self> {
        for (i, p) in points.iter().enumerate() {
            if !p.close.is_finite() || p.close <= 0.0 {
                return Err(VolError::invalid_series(format!(
                    "close at {} must be positive and finite, got {}",
                    p.date, p.close
                )));
            }
            if i > 0 && points[i - 1].date >= p.date {
                return Err(VolError::invalid_series(format!(
                    "dates must be strictly increasing: {} follows {}",
                    p.date,
                    points[i - 1].date
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn from_pairs<I>(pairs: I) -> VolResult<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, close)| PricePoint { date, close })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Series restricted to the first `len` observations.
    pub fn truncated(&self, len: usize) -> Self {
        Self {
            points: self.points[..len.min(self.points.len())].to_vec(),
        }
    }

    /// `r[t] = ln(p[t] / p[t-1])`; `None` at t = 0.
    pub fn log_returns(&self) -> Vec<Option<f64>> {
        let mut out = Vec::with_capacity(self.points.len());
        for (i, p) in self.points.iter().enumerate() {
            if i == 0 {
                out.push(None);
            } else {
                out.push(Some((p.close / self.points[i - 1].close).ln()));
            }
        }
        out
    }
}
