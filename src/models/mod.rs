//! Core data models for the import pipeline.

pub mod area;
pub mod entity;
pub mod field;
pub mod tags;

pub use area::{BoundingBox, InvalidBuffer, SearchBuffer, DEFAULT_BUFFER_DEGREES};
pub use entity::{ExistingEntity, GeoPoint, OsmType, PlaceholderIds, PointCandidate};
pub use field::{Axis, DecodedRecord, Field, FormItem, SurveyRecord};
pub use tags::{tag_set, TagSet, CREATED_BY};
