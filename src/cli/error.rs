//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(e.into())
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Infra(ApplicationError::from(e).into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } if e.is_not_found() => exitcode::NOINPUT,
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Json { .. } => exitcode::DATAERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::Structural { .. }) => exitcode::DATAERR,
                    ApplicationError::Domain(DomainError::InvalidArgument(_)) => exitcode::USAGE,
                    ApplicationError::UnknownVersion(_)
                    | ApplicationError::UnknownGhmRoot { .. }
                    | ApplicationError::UnknownGhs { .. } => exitcode::NOINPUT,
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_exit_codes() {
        let structural: CliError = DomainError::structural(3, "child range out of bounds").into();
        assert_eq!(structural.exit_code(), exitcode::DATAERR);

        let invalid: CliError = DomainError::invalid_argument("negative duration").into();
        assert_eq!(invalid.exit_code(), exitcode::USAGE);

        let version = NaiveDate::from_ymd_opt(2019, 3, 1).unwrap();
        let unknown: CliError = ApplicationError::UnknownVersion(version).into();
        assert_eq!(unknown.exit_code(), exitcode::NOINPUT);

        let missing: CliError = InfraError::io(
            "reading tree",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        )
        .into();
        assert_eq!(missing.exit_code(), exitcode::NOINPUT);

        let config: CliError = ApplicationError::Config { message: "bad".into() }.into();
        assert_eq!(config.exit_code(), exitcode::CONFIG);
    }
}
