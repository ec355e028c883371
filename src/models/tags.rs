//! Key/value tag maps attached to points.

use std::collections::HashMap;

/// Descriptive attributes of a point (e.g. `amenity=cafe`).
pub type TagSet = HashMap<String, String>;

/// Tag key used by editors to record which tool created an object.
pub const CREATED_BY: &str = "created_by";

/// True when the only tag present is the `created_by` provenance marker
pub fn is_provenance_only(tags: &TagSet) -> bool {
    tags.len() == 1 && tags.contains_key(CREATED_BY)
}

/// Build a tag map from string pairs
pub fn tag_set<'a, T>(pairs: T) -> TagSet
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}
