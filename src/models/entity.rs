//! Survey candidates and the existing OSM entities they are compared against.

use serde::{Deserialize, Serialize};

use super::TagSet;

/// Type of OSM object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    Node,
    Way,
    Relation,
}

impl OsmType {
    /// Only nodes carry a point geometry
    pub fn is_point(&self) -> bool {
        matches!(self, OsmType::Node)
    }
}

impl std::fmt::Display for OsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmType::Node => write!(f, "node"),
            OsmType::Way => write!(f, "way"),
            OsmType::Relation => write!(f, "relation"),
        }
    }
}

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A record already stored in OSM, snapshotted for one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingEntity {
    #[serde(rename = "type")]
    pub osm_type: OsmType,

    /// OSM id, 0 when the source does not report one
    #[serde(default)]
    pub id: i64,

    /// Location for nodes; ways and relations have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,

    #[serde(default)]
    pub tags: TagSet,
}

impl ExistingEntity {
    pub fn node(id: i64, location: GeoPoint, tags: TagSet) -> Self {
        Self {
            osm_type: OsmType::Node,
            id,
            location: Some(location),
            tags,
        }
    }

    pub fn is_point(&self) -> bool {
        self.osm_type.is_point()
    }
}

/// A point proposed for import, not yet committed.
///
/// The id is a negative placeholder until the OSM API assigns a real one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointCandidate {
    pub id: i64,
    pub location: GeoPoint,
    pub tags: TagSet,
}

impl PointCandidate {
    pub fn new(id: i64, location: GeoPoint, tags: TagSet) -> Self {
        debug_assert!(id < 0, "placeholder ids are negative");
        Self { id, location, tags }
    }
}

/// Hands out placeholder ids: -1, -2, -3, ...
#[derive(Debug, Clone)]
pub struct PlaceholderIds {
    next: i64,
}

impl PlaceholderIds {
    pub fn new() -> Self {
        Self { next: -1 }
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next -= 1;
        id
    }
}

impl Default for PlaceholderIds {
    fn default() -> Self {
        Self::new()
    }
}
