//! Offline data source backed by an R-tree of previously downloaded nodes.

use std::path::Path;

use async_trait::async_trait;
use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use super::{GeoDataSource, OsmApiError};
use crate::models::{BoundingBox, ExistingEntity};

/// Wrapper for R-tree indexing of entities with a location
struct IndexedEntity {
    entity: ExistingEntity,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEntity {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedEntity {
    fn new(entity: ExistingEntity) -> Option<Self> {
        let location = entity.location?;
        Some(Self {
            envelope: AABB::from_point([location.lon, location.lat]),
            entity,
        })
    }
}

/// In-memory spatial index of existing entities
pub struct MemorySource {
    tree: RTree<IndexedEntity>,
}

impl MemorySource {
    /// Entities without a location cannot be found by bbox and are dropped.
    pub fn new(entities: Vec<ExistingEntity>) -> Self {
        let indexed: Vec<IndexedEntity> =
            entities.into_iter().filter_map(IndexedEntity::new).collect();
        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    /// Load a JSON array of entities (`[{"type": "node", "id": 1, "location": {...}, "tags": {...}}]`)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, OsmApiError> {
        let content = std::fs::read_to_string(path)?;
        let entities: Vec<ExistingEntity> = serde_json::from_str(&content)?;
        let source = Self::new(entities);
        info!("Loaded {} existing entities", source.len());
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[async_trait]
impl GeoDataSource for MemorySource {
    async fn fetch_nearby(&self, bbox: &BoundingBox) -> Result<Vec<ExistingEntity>, OsmApiError> {
        let envelope =
            AABB::from_corners([bbox.min_lon, bbox.min_lat], [bbox.max_lon, bbox.max_lat]);
        Ok(self
            .tree
            .locate_in_envelope(&envelope)
            .map(|indexed| indexed.entity.clone())
            .collect())
    }
}
