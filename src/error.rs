use std::{io, num::ParseFloatError};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("feature matrix and target vector must not be empty")]
    EmptyDataset,

    #[error("feature matrix has {features} rows but target vector has {targets}")]
    RowCountMismatch { features: usize, targets: usize },

    #[error("feature row {row} is empty")]
    EmptyFeatureRow { row: usize },

    #[error("feature row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("target value at index {index} is not finite")]
    NonFiniteTarget { index: usize },

    #[error("feature value at row {row}, column {column} is not finite")]
    NonFiniteFeature { row: usize, column: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("estimator must be fitted before use")]
    NotFitted,

    #[error("expected {expected} features, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("cannot parse {value:?} at row {row}, column {column}: {source}")]
    Parse {
        row: usize,
        column: usize,
        value: String,
        source: ParseFloatError,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
