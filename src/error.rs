//! Failure taxonomy for the melt operation.
//!
//! Every reshape failure is one of three kinds. Each kind maps to a fixed
//! corrective message via [`ReshapeError::user_message`]; the command layer
//! prints that message and leaves no output behind.

use thiserror::Error;

pub type ReshapeResult<T> = std::result::Result<T, ReshapeError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReshapeError {
    /// The selection does not produce a rectangular long table.
    #[error("shape mismatch: {detail}")]
    ShapeMismatch { detail: String },

    /// Two columns share a name after normalization.
    #[error("duplicate axis: column '{column}' appears more than once")]
    DuplicateAxis { column: String },

    /// Anything else that stopped the reshape.
    #[error("{0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ShapeMismatch,
    DuplicateAxis,
    Unexpected,
}

impl ReshapeError {
    pub fn shape_mismatch(detail: impl Into<String>) -> Self {
        ReshapeError::ShapeMismatch {
            detail: detail.into(),
        }
    }

    pub fn duplicate_axis(column: impl Into<String>) -> Self {
        ReshapeError::DuplicateAxis {
            column: column.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        ReshapeError::Unexpected(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReshapeError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            ReshapeError::DuplicateAxis { .. } => ErrorKind::DuplicateAxis,
            ReshapeError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Human-readable message shown when a melt fails.
    pub fn user_message(&self) -> String {
        match self {
            ReshapeError::ShapeMismatch { detail } => format!(
                "Data Transformation Error: The number of selected columns does not match the \
                 expected format. Please review your column selections. ({detail})"
            ),
            ReshapeError::DuplicateAxis { column } => format!(
                "Duplicate Column Error: There are duplicate columns in your selection. \
                 Please ensure each column is unique. (column '{column}')"
            ),
            ReshapeError::Unexpected(message) => format!(
                "Unexpected Error: {message}. Please review your selections and try again. \
                 If the issue persists, ask the maintainer of your export for assistance."
            ),
        }
    }
}
