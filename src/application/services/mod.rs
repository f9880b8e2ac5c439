//! Application services
//!
//! Concrete services built on top of loaded classification sessions.

mod pricing_grid;

pub use pricing_grid::{CellBand, GridCell, GridRow, HeaderCell, HeaderClass, HeaderRow, PricingGrid};
