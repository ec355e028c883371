//! XML documents for the changeset endpoints.

use quick_xml::escape::escape;

use crate::models::{PointCandidate, TagSet};

const GENERATOR: &str = concat!("geopaposm ", env!("CARGO_PKG_VERSION"));

fn write_tags(out: &mut String, tags: &TagSet, indent: &str) {
    // Sorted so repeated uploads produce identical documents
    let mut pairs: Vec<(&String, &String)> = tags.iter().collect();
    pairs.sort();

    for (key, value) in pairs {
        out.push_str(&format!(
            "{indent}<tag k=\"{}\" v=\"{}\"/>\n",
            escape(key.as_str()),
            escape(value.as_str())
        ));
    }
}

/// Body for `PUT /changeset/create`
pub fn changeset_document(tags: &TagSet) -> String {
    let mut out = String::from("<osm>\n  <changeset>\n");
    write_tags(&mut out, tags, "    ");
    out.push_str("  </changeset>\n</osm>\n");
    out
}

/// osmChange diff creating every candidate inside `changeset`
pub fn create_nodes_document(changeset: u64, candidates: &[PointCandidate]) -> String {
    let mut out = format!("<osmChange version=\"0.6\" generator=\"{GENERATOR}\">\n  <create>\n");

    for candidate in candidates {
        let open = format!(
            "    <node id=\"{}\" changeset=\"{}\" lat=\"{}\" lon=\"{}\"",
            candidate.id, changeset, candidate.location.lat, candidate.location.lon
        );
        if candidate.tags.is_empty() {
            out.push_str(&open);
            out.push_str("/>\n");
        } else {
            out.push_str(&open);
            out.push_str(">\n");
            write_tags(&mut out, &candidate.tags, "      ");
            out.push_str("    </node>\n");
        }
    }

    out.push_str("  </create>\n</osmChange>\n");
    out
}
