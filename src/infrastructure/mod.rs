//! Infrastructure layer: I/O implementations
//!
//! This layer implements I/O boundary traits and loads classification data from disk.

pub mod error;
pub mod loader;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use loader::{DataLoader, PRICE_MAP_FILE, TREE_FILE, VERSION_INDEX_FILE};
