//! Application layer: sessions, catalog and use cases
//!
//! This layer holds loaded classification versions and orchestrates domain logic.
//! It performs no I/O; loading lives in the infrastructure layer.

pub mod catalog;
pub mod collapse;
pub mod error;
pub mod services;
pub mod session;

pub use catalog::VersionCatalog;
pub use collapse::CollapseSet;
pub use error::{ApplicationError, ApplicationResult};
pub use session::{ClassificationSession, VersionInfo};
