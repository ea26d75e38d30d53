use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Error, Result};

mod loader;
pub use loader::{load_csv, read_csv, CsvOptions, CsvOptionsBuilder, LabeledDataset};

/// Validated training data: a rectangular feature matrix and a target vector
/// of the same row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl Dataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self> {
        if x.nrows() == 0 || y.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if x.nrows() != y.len() {
            return Err(Error::RowCountMismatch {
                features: x.nrows(),
                targets: y.len(),
            });
        }
        if x.ncols() == 0 {
            return Err(Error::EmptyFeatureRow { row: 0 });
        }
        if let Some(index) = y.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteTarget { index });
        }
        if let Some(((row, column), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::NonFiniteFeature { row, column });
        }
        Ok(Self { x, y })
    }

    /// Builds a dataset from row-major feature rows, copying the input.
    pub fn from_rows(rows: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        if rows.is_empty() || y.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if rows.len() != y.len() {
            return Err(Error::RowCountMismatch {
                features: rows.len(),
                targets: y.len(),
            });
        }
        let n_features = rows[0].len();
        for (row, values) in rows.iter().enumerate() {
            if values.is_empty() {
                return Err(Error::EmptyFeatureRow { row });
            }
            if values.len() != n_features {
                return Err(Error::RaggedRow {
                    row,
                    expected: n_features,
                    found: values.len(),
                });
            }
        }

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let x = Array2::from_shape_vec((rows.len(), n_features), flat)
            .map_err(|e| Error::invalid_parameter("rows", e.to_string()))?;
        Self::new(x, Array1::from(y.to_vec()))
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }

    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Copies the given rows, in order and with repetition, into a new dataset.
    ///
    /// `indices` must be non-empty and in range.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        debug_assert!(!indices.is_empty());
        Dataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
        }
    }

    /// Same features, new targets.
    pub fn with_targets(&self, y: Array1<f64>) -> Result<Dataset> {
        Dataset::new(self.x.clone(), y)
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>) {
        (self.x, self.y)
    }
}
