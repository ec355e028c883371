//! Queued point creation committed as a single changeset.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::xml::{changeset_document, create_nodes_document};
use super::{OsmApiError, OsmClient, UploadSink};
use crate::models::{PointCandidate, TagSet, CREATED_BY};

const BASE_COMMENT: &str = "auto import of features using geopaparazzi and geopaposm.";
const CREATED_BY_VALUE: &str = concat!("geopaposm ", env!("CARGO_PKG_VERSION"));

/// Changeset comment, with the user's note appended on its own line
pub fn changeset_comment(user_comment: Option<&str>) -> String {
    match user_comment.map(str::trim).filter(|c| !c.is_empty()) {
        Some(note) => format!("{BASE_COMMENT}\n {note}"),
        None => BASE_COMMENT.to_string(),
    }
}

/// Uploads queued points through the OSM API
pub struct ChangesetUploader {
    client: OsmClient,
    tags: TagSet,
    queue: Vec<PointCandidate>,
    total_uploaded: usize,
}

impl ChangesetUploader {
    pub fn new(client: OsmClient, comment: Option<&str>) -> Self {
        let mut tags = TagSet::new();
        tags.insert("comment".to_string(), changeset_comment(comment));
        tags.insert(CREATED_BY.to_string(), CREATED_BY_VALUE.to_string());

        Self {
            client,
            tags,
            queue: Vec::new(),
            total_uploaded: 0,
        }
    }

    /// Closing is best effort: OSM closes idle changesets on its own.
    async fn close_quietly(&self, changeset: u64) {
        if let Err(e) = self.client.close_changeset(changeset).await {
            warn!("Failed to close changeset {}: {}", changeset, e);
        }
    }
}

#[async_trait]
impl UploadSink for ChangesetUploader {
    fn create_point(&mut self, candidate: PointCandidate) {
        self.queue.push(candidate);
    }

    async fn flush(&mut self) -> Result<(), OsmApiError> {
        if self.queue.is_empty() {
            debug!("Nothing queued, skipping changeset");
            return Ok(());
        }

        let count = self.queue.len();
        let changeset = self
            .client
            .create_changeset(changeset_document(&self.tags))
            .await?;

        let diff = create_nodes_document(changeset, &self.queue);
        if let Err(e) = self.client.upload_diff(changeset, diff).await {
            // The diff upload is atomic, so a failed upload leaves nothing behind
            self.close_quietly(changeset).await;
            return Err(e);
        }

        // Committed from here on, whatever happens to the close call
        self.queue.clear();
        self.total_uploaded += count;
        info!(
            "Uploaded {} points in changeset {} ({} this session)",
            count, changeset, self.total_uploaded
        );

        self.close_quietly(changeset).await;
        Ok(())
    }
}

/// Records creations without contacting the API
#[derive(Debug, Default)]
pub struct DryRunSink {
    queued: Vec<PointCandidate>,
    committed: Vec<PointCandidate>,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points that would have been uploaded
    pub fn committed(&self) -> &[PointCandidate] {
        &self.committed
    }
}

#[async_trait]
impl UploadSink for DryRunSink {
    fn create_point(&mut self, candidate: PointCandidate) {
        info!(
            "[dry run] would create node {} at ({}, {}) with {} tags",
            candidate.id,
            candidate.location.lon,
            candidate.location.lat,
            candidate.tags.len()
        );
        self.queued.push(candidate);
    }

    async fn flush(&mut self) -> Result<(), OsmApiError> {
        info!("[dry run] {} points would be uploaded", self.queued.len());
        self.committed.append(&mut self.queued);
        Ok(())
    }
}
