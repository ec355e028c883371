//! Create-or-skip decision for one candidate.

use tracing::debug;

use super::compare::TagComparison;
use crate::models::{ExistingEntity, TagSet};

/// Approve a candidate for creation.
///
/// With no neighbours the candidate is always created. Otherwise it is
/// created only when every neighbour is judged similar by the comparator.
/// This matches the behaviour of the survey importer this tool replaces;
/// flipping it to "create when no neighbour matches" is a product decision.
pub fn should_create(candidate_tags: &TagSet, nearby_points: &[ExistingEntity]) -> bool {
    if nearby_points.is_empty() {
        return true;
    }

    let similar = nearby_points
        .iter()
        .filter(|entity| {
            let comparison = TagComparison::between(&entity.tags, candidate_tags);
            debug!(
                "Compared with {}/{}: {} of {} keys differ ({:?})",
                entity.osm_type,
                entity.id,
                comparison.different,
                comparison.total,
                comparison.tier()
            );
            comparison.is_similar()
        })
        .count();

    similar == nearby_points.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{tag_set, GeoPoint};

    fn node(id: i64, pairs: &[(&str, &str)]) -> ExistingEntity {
        ExistingEntity::node(
            id,
            GeoPoint { lat: 0.0, lon: 0.0 },
            tag_set(pairs.iter().copied()),
        )
    }

    #[test]
    fn test_no_neighbours_creates() {
        assert!(should_create(&tag_set([("amenity", "cafe")]), &[]));
        assert!(should_create(&TagSet::new(), &[]));
    }

    // Characterization: creation is approved when every neighbour is similar.
    #[test]
    fn test_all_neighbours_similar_creates() {
        let candidate = tag_set([("amenity", "cafe")]);
        let nearby = vec![node(1, &[("amenity", "cafe")]), node(2, &[("amenity", "cafe")])];
        assert!(should_create(&candidate, &nearby));
    }

    // Characterization: a single dissimilar neighbour blocks creation.
    #[test]
    fn test_one_dissimilar_neighbour_skips() {
        let candidate = tag_set([("amenity", "cafe")]);
        let nearby = vec![node(1, &[("amenity", "cafe")]), node(2, &[("shop", "bakery")])];
        assert!(!should_create(&candidate, &nearby));
    }

    #[test]
    fn test_no_similar_neighbour_skips() {
        let candidate = tag_set([("amenity", "bench")]);
        let nearby = vec![node(1, &[("highway", "street_lamp")])];
        assert!(!should_create(&candidate, &nearby));
    }

    #[test]
    fn test_untagged_candidate_matches_anything() {
        // An empty tag set has no keys that can differ
        let nearby = vec![node(1, &[("highway", "street_lamp")])];
        assert!(should_create(&TagSet::new(), &nearby));
    }
}
