//! Batch import of survey records.
//!
//! Records are resolved one at a time: decode, fetch nearby entities, filter,
//! decide, queue. Queued points are committed by a single flush at the end.

use tracing::{debug, info};

use crate::dedup::{filter_points, should_create};
use crate::error::ImportError;
use crate::models::{PlaceholderIds, PointCandidate, SearchBuffer, SurveyRecord};
use crate::osm::{GeoDataSource, UploadSink};

/// Label reported when every eligible record was created
pub const ALL_IMPORTED: &str = "features_imported";

/// Parse the exported JSON batch
pub fn parse_records(input: &str) -> Result<Vec<SurveyRecord>, ImportError> {
    serde_json::from_str(input).map_err(ImportError::MalformedInput)
}

/// Counters for one batch.
///
/// `seen` counts records carrying both coordinates; records without a
/// location never reach the dedup step and are not part of the ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub seen: usize,
    pub created: usize,
}

impl BatchResult {
    pub fn all_imported(&self) -> bool {
        self.created == self.seen
    }

    /// Human readable summary
    pub fn summary(&self) -> String {
        if self.all_imported() {
            "all imported".to_string()
        } else {
            format!("imported {} of {}", self.created, self.seen)
        }
    }

    /// Label returned to the calling service
    pub fn output_label(&self) -> String {
        if self.all_imported() {
            ALL_IMPORTED.to_string()
        } else {
            format!("{}_{}_{}", ALL_IMPORTED, self.created, self.seen)
        }
    }
}

/// What happened to a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Missing or unparseable coordinates
    Ineligible,
    /// Queued for creation under this placeholder id
    Created(i64),
    /// Rejected by the novelty decision
    Skipped,
}

/// Drives one batch against a data source and an upload sink.
pub struct BatchImporter<'a, S: ?Sized, K: ?Sized> {
    source: &'a S,
    sink: &'a mut K,
    buffer: SearchBuffer,
    ids: PlaceholderIds,
    result: BatchResult,
    processed: usize,
}

impl<'a, S, K> BatchImporter<'a, S, K>
where
    S: GeoDataSource + ?Sized,
    K: UploadSink + ?Sized,
{
    pub fn new(source: &'a S, sink: &'a mut K, buffer: SearchBuffer) -> Self {
        Self {
            source,
            sink,
            buffer,
            ids: PlaceholderIds::new(),
            result: BatchResult::default(),
            processed: 0,
        }
    }

    /// Resolve one record fully before returning
    pub async fn process(&mut self, record: &SurveyRecord) -> Result<RecordOutcome, ImportError> {
        let index = self.processed;
        self.processed += 1;

        let decoded = record.decode();
        let Some(location) = decoded.location() else {
            debug!("Record {} has no usable location, skipping", index);
            return Ok(RecordOutcome::Ineligible);
        };
        self.result.seen += 1;

        let bbox = self.buffer.around(location);
        let nearby = self
            .source
            .fetch_nearby(&bbox)
            .await
            .map_err(|source| ImportError::Fetch {
                record: index,
                source,
            })?;
        let points = filter_points(nearby);

        if !should_create(&decoded.tags, &points) {
            debug!(
                "Record {} rejected against {} nearby points",
                index,
                points.len()
            );
            return Ok(RecordOutcome::Skipped);
        }

        let id = self.ids.next_id();
        self.sink
            .create_point(PointCandidate::new(id, location, decoded.tags));
        self.result.created += 1;

        debug!("Record {} queued as node {}", index, id);
        Ok(RecordOutcome::Created(id))
    }

    /// Current counters
    pub fn stats(&self) -> BatchResult {
        self.result
    }

    /// Flush queued points and return the final counters
    pub async fn finish(self) -> Result<BatchResult, ImportError> {
        self.sink.flush().await.map_err(ImportError::UploadFailure)?;

        info!(
            "Processed {} records: {}",
            self.processed,
            self.result.summary()
        );
        Ok(self.result)
    }
}

/// Import every record in input order, then flush.
pub async fn run_import<S, K>(
    records: &[SurveyRecord],
    source: &S,
    sink: &mut K,
    buffer: SearchBuffer,
) -> Result<BatchResult, ImportError>
where
    S: GeoDataSource + ?Sized,
    K: UploadSink + ?Sized,
{
    let mut importer = BatchImporter::new(source, sink, buffer);
    for record in records {
        importer.process(record).await?;
    }
    importer.finish().await
}
