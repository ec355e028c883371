//! Deduplication of survey candidates against nearby OSM data.
//!
//! Nearby entities are narrowed to tagged nodes, then each one is compared
//! with the candidate's tags to decide whether the candidate is created.

mod compare;
mod filter;
mod novelty;

pub use compare::{is_similar, TagComparison, Tier};
pub use filter::filter_points;
pub use novelty::should_create;
