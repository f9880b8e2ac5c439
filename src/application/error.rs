//! Application-level errors (wraps domain errors)

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add lookup and configuration failures.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("no classification version starting on {0}")]
    UnknownVersion(NaiveDate),

    #[error("GHM root {root} not priced in version {version}")]
    UnknownGhmRoot { version: NaiveDate, root: String },

    #[error("GHS {ghs} not found in GHM root {root}")]
    UnknownGhs { root: String, ghs: u32 },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
