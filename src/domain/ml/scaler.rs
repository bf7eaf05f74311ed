//! Min-max feature scaling.
//!
//! `x' = (x - min) * scale` with `scale = 1 / (max - min)`, or `1` for a constant
//! column, so a constant column maps to 0. Values outside the fitted range are not
//! clipped: a persisted scaler applied to a newer window may yield values outside [0, 1].

use crate::domain::errors::PreprocessError;
use crate::domain::market::indicator_row::IndicatorRow;
use crate::domain::ml::feature_registry::{FEATURE_COUNT, feature_names, row_features};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Bumped whenever the persisted layout or the feature columns change meaning
pub const SCALER_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    pub version: u32,
    pub columns: Vec<String>,
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    pub samples: usize,
    pub fitted_at: DateTime<Utc>,
}

impl FittedScaler {
    /// Fits per-column min/max over every row of `matrix`
    pub fn fit(matrix: &Array2<f64>) -> Result<Self, PreprocessError> {
        if matrix.ncols() != FEATURE_COUNT {
            return Err(PreprocessError::ColumnMismatch {
                expected: FEATURE_COUNT,
                actual: matrix.ncols(),
            });
        }
        if matrix.nrows() == 0 {
            return Err(PreprocessError::InsufficientHistory {
                required: 1,
                available: 0,
            });
        }

        let mut data_min = Vec::with_capacity(FEATURE_COUNT);
        let mut data_max = Vec::with_capacity(FEATURE_COUNT);
        for column in matrix.columns() {
            data_min.push(column.iter().copied().fold(f64::INFINITY, f64::min));
            data_max.push(column.iter().copied().fold(f64::NEG_INFINITY, f64::max));
        }

        Ok(Self {
            version: SCALER_FORMAT_VERSION,
            columns: feature_names(),
            data_min,
            data_max,
            samples: matrix.nrows(),
            fitted_at: Utc::now(),
        })
    }

    /// True when this scaler was fitted on the current feature layout
    pub fn is_compatible(&self) -> bool {
        self.version == SCALER_FORMAT_VERSION
            && self.columns == feature_names()
            && self.data_min.len() == FEATURE_COUNT
            && self.data_max.len() == FEATURE_COUNT
    }

    fn scale(&self, column: usize) -> f64 {
        let range = self.data_max[column] - self.data_min[column];
        if range == 0.0 { 1.0 } else { 1.0 / range }
    }

    pub fn transform(&self, matrix: &Array2<f64>) -> Result<Array2<f64>, PreprocessError> {
        if matrix.ncols() != self.data_min.len() {
            return Err(PreprocessError::ColumnMismatch {
                expected: self.data_min.len(),
                actual: matrix.ncols(),
            });
        }

        let mut scaled = matrix.clone();
        for (j, mut column) in scaled.columns_mut().into_iter().enumerate() {
            let min = self.data_min[j];
            let scale = self.scale(j);
            column.mapv_inplace(|x| (x - min) * scale);
        }
        Ok(scaled)
    }

    /// Maps a scaled value of `column` back to original units
    pub fn inverse_column(&self, column: usize, value: f64) -> f64 {
        value / self.scale(column) + self.data_min[column]
    }
}

/// Builds the model feature matrix from the rows whose features are all defined.
pub fn build_feature_matrix(
    rows: &[IndicatorRow],
    min_rows: usize,
) -> Result<Array2<f64>, PreprocessError> {
    let features: Vec<[f64; FEATURE_COUNT]> = rows.iter().filter_map(row_features).collect();

    if features.is_empty() || features.len() < min_rows {
        return Err(PreprocessError::InsufficientHistory {
            required: min_rows.max(1),
            available: features.len(),
        });
    }

    Ok(Array2::from_shape_fn(
        (features.len(), FEATURE_COUNT),
        |(i, j)| features[i][j],
    ))
}
