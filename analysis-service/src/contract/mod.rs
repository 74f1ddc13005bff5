//! Response-contract normalization.
//!
//! Whatever the upstream model returns, [`normalize`] produces a response
//! matching the current schema: every field present, every list at its
//! cardinality floor, every enum inside its declared domain. Older flat
//! payloads pass through [`legacy::upgrade`] first.

pub mod coerce;
pub mod context;
pub mod legacy;
pub mod normalize;
pub mod result;
pub mod sections;
pub mod template;

pub use context::ContextInput;
pub use normalize::{NormalizeMeta, normalize};
pub use result::{NormalizedResult, Outcome, RiskLevel};

/// Version stamped into every normalized response.
pub const SCHEMA_VERSION: u32 = 2;
