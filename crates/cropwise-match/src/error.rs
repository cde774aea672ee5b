//! Matching-specific error types.

use thiserror::Error;

use crate::types::Measurement;

/// The reference table could not be built from its source.
#[derive(Error, Debug)]
pub enum DataFormatError {
    #[error("failed to read reference data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed reference data: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: expected at least {expected} columns, found {found}")]
    TooFewColumns {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {column} value {value:?} is not a finite number")]
    InvalidNumber {
        line: u64,
        column: Measurement,
        value: String,
    },

    #[error("line {line}: crop label is empty")]
    EmptyLabel { line: u64 },

    #[error("reference data has no rows")]
    Empty,
}

/// An observation that cannot be compared against the table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidObservationError {
    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: Measurement, value: f64 },

    #[error("{field} {value} is outside its valid range")]
    OutOfRange { field: Measurement, value: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    #[error("invalid observation: {0}")]
    InvalidObservation(#[from] InvalidObservationError),

    #[error("number of crops to suggest must be at least 1")]
    ZeroK,
}

impl DataFormatError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Io(_) => "The crop reference data could not be read.",
            Self::Empty => "The crop reference data is empty.",
            _ => "The crop reference data is malformed.",
        }
    }
}

impl RecommendError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidObservation(InvalidObservationError::NonFinite { .. }) => {
                "The measured conditions contain an invalid number."
            }
            Self::InvalidObservation(InvalidObservationError::OutOfRange { .. }) => {
                "The measured conditions are outside the possible range."
            }
            Self::ZeroK => "Ask for at least one crop suggestion.",
        }
    }
}
