//! Domain layer: classification data and pure computations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod duration_mask;
pub mod error;
pub mod node;
pub mod pricing;
pub mod reconstruct;
pub mod xref;

pub use duration_mask::{mask_to_ranges, nights, ranges_describe_same_set, DurationMask};
pub use error::{DomainError, DomainResult};
pub use node::{DecisionNode, NodeStore, GOTO_TEST};
pub use pricing::{
    compute_delta, compute_price, duration_text, price_text, DeltaBand, DeltaResult,
    GhsPricingEntry, PriceBand, PriceResult, PricingTable,
};
pub use reconstruct::{find_path, reconstruct, DisplayNode, NodeKind, TreeReconstructor};
pub use xref::{scan, segments_text, LinkKind, LinkToken, Segment};
