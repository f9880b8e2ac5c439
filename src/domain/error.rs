//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed classification data or caller contract violations.
/// These are independent of how the data was loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed classifier node {node}: {reason}")]
    Structural { node: usize, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DomainError {
    pub fn structural(node: usize, reason: impl Into<String>) -> Self {
        Self::Structural {
            node,
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
