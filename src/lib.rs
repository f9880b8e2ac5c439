//! casemix: French hospital case-mix tables
//!
//! Reconstructs the GHM classifier decision tree from its flat node list,
//! prices GHS tariffs by stay duration, compares tariffs across versions and
//! finds cross-references (procedures, diagnoses, GHM roots, nodes) in labels.
//!
//! Layers:
//! - [`domain`]: pure data types and computations, no I/O
//! - [`application`]: loaded versions, collapse state, pricing grid
//! - [`infrastructure`]: JSON ingestion from a data directory
//! - [`cli`]: the `casemix` inspection binary

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
