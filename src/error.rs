//! Errors surfaced by a batch import.

use thiserror::Error;

use crate::osm::OsmApiError;

/// Label reported when the input batch cannot be parsed
pub const ERROR_JSON: &str = "error_json";
/// Label reported when OSM could not be queried or written
pub const ERROR_OSM: &str = "error_osm";

#[derive(Debug, Error)]
pub enum ImportError {
    /// The input batch is not a JSON array of survey records.
    #[error("malformed input batch: {0}")]
    MalformedInput(#[source] serde_json::Error),

    /// Nearby data for a record could not be fetched.
    #[error("failed to fetch nearby data for record {record}: {source}")]
    Fetch {
        record: usize,
        #[source]
        source: OsmApiError,
    },

    /// Committing the queued points failed; nothing was reported as imported.
    #[error("failed to upload queued points: {0}")]
    UploadFailure(#[source] OsmApiError),
}

impl ImportError {
    /// Short label returned to the calling service
    pub fn label(&self) -> &'static str {
        match self {
            ImportError::MalformedInput(_) => ERROR_JSON,
            ImportError::Fetch { .. } | ImportError::UploadFailure(_) => ERROR_OSM,
        }
    }
}
