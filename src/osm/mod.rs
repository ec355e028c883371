//! Collaborators that read from and write to OpenStreetMap.
//!
//! The importer only sees the two traits below. `OsmClient` and
//! `ChangesetUploader` talk to the OSM API; `MemorySource` and `DryRunSink`
//! let a batch be evaluated without network access.

mod changeset;
mod client;
mod memory;
mod xml;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BoundingBox, ExistingEntity, PointCandidate};

pub use changeset::{changeset_comment, ChangesetUploader, DryRunSink};
pub use client::{Credentials, OsmClient, DEFAULT_API_URL};
pub use memory::MemorySource;

#[derive(Debug, Error)]
pub enum OsmApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OSM API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected changeset id {0:?}")]
    ChangesetId(String),

    #[error("uploading requires credentials")]
    MissingCredentials,

    #[error("failed to read data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Source of existing entities around a candidate.
#[async_trait]
pub trait GeoDataSource: Send + Sync {
    async fn fetch_nearby(&self, bbox: &BoundingBox) -> Result<Vec<ExistingEntity>, OsmApiError>;
}

/// Destination for approved candidates.
#[async_trait]
pub trait UploadSink: Send {
    /// Queue a point for creation
    fn create_point(&mut self, candidate: PointCandidate);

    /// Commit every queued point as one unit, or fail without committing.
    async fn flush(&mut self) -> Result<(), OsmApiError>;
}
