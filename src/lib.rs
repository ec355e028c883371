//! geopaposm - Import field-survey points into OpenStreetMap
//!
//! This library provides the dedup core and the OSM collaborators shared by
//! the import and service binaries.

pub mod batch;
pub mod config;
pub mod dedup;
pub mod error;
pub mod models;
pub mod osm;

pub use batch::{parse_records, run_import, BatchImporter, BatchResult, RecordOutcome};
pub use error::ImportError;
pub use models::{ExistingEntity, PointCandidate, SearchBuffer, TagSet};
