//! Selects the fetched entities worth comparing against.

use tracing::debug;

use crate::models::tags::is_provenance_only;
use crate::models::ExistingEntity;

/// Keep nodes that carry descriptive tags.
///
/// Bare nodes and nodes tagged only with `created_by` are dropped.
pub fn filter_points(entities: Vec<ExistingEntity>) -> Vec<ExistingEntity> {
    let fetched = entities.len();
    let points: Vec<ExistingEntity> = entities.into_iter().filter(is_comparable_point).collect();

    debug!("Kept {} of {} fetched entities", points.len(), fetched);
    points
}

fn is_comparable_point(entity: &ExistingEntity) -> bool {
    entity.is_point() && !entity.tags.is_empty() && !is_provenance_only(&entity.tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{tag_set, GeoPoint, OsmType, TagSet};

    fn node(tags: TagSet) -> ExistingEntity {
        ExistingEntity::node(1, GeoPoint { lat: 0.0, lon: 0.0 }, tags)
    }

    #[test]
    fn test_excludes_provenance_only_node() {
        assert!(filter_points(vec![node(tag_set([("created_by", "tool")]))]).is_empty());
    }

    #[test]
    fn test_excludes_untagged_node() {
        assert!(filter_points(vec![node(TagSet::new())]).is_empty());
    }

    #[test]
    fn test_includes_tagged_node() {
        let kept = filter_points(vec![node(tag_set([("amenity", "cafe")]))]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].tags["amenity"], "cafe");
    }

    #[test]
    fn test_keeps_created_by_alongside_other_tags() {
        let kept = filter_points(vec![node(tag_set([
            ("created_by", "tool"),
            ("amenity", "cafe"),
        ]))]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_excludes_ways_and_relations() {
        let tags = tag_set([("building", "yes")]);
        let way = ExistingEntity {
            osm_type: OsmType::Way,
            id: 7,
            location: None,
            tags: tags.clone(),
        };
        let relation = ExistingEntity {
            osm_type: OsmType::Relation,
            id: 8,
            location: None,
            tags,
        };
        assert!(filter_points(vec![way, relation]).is_empty());
    }
}
