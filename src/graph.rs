// src/graph.rs
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::models::NormalizedRecord;

pub const SOURCE_CLASS: &str = "source";
pub const TAG_CLASS: &str = "tag";

/// Node ids carry a type prefix so a source and a tag spelled alike stay distinct.
pub fn source_id(name: &str) -> String {
    format!("{SOURCE_CLASS}:{name}")
}

pub fn tag_id(tag: &str) -> String {
    format!("{TAG_CLASS}:{tag}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphElement {
    SourceNode { id: String, label: String, classes: &'static str },
    TagNode { id: String, label: String, classes: &'static str },
    Edge { source: String, target: String },
}

/// Bipartite source↔tag graph, nodes first then edges.
///
/// Returns nothing unless `enabled`. Every distinct source gets a node even
/// when none of its records carry tags. Each (source, tag) edge is emitted
/// once no matter how many records repeat it.
pub fn build_graph(records: &[NormalizedRecord], enabled: bool) -> Vec<GraphElement> {
    if !enabled {
        return Vec::new();
    }

    let mut seen_sources: HashSet<&str> = HashSet::new();
    let mut seen_tags: HashSet<&str> = HashSet::new();
    let mut seen_edges: HashSet<(&str, &str)> = HashSet::new();

    let mut sources = Vec::new();
    let mut tags = Vec::new();
    let mut edges = Vec::new();

    for r in records {
        let src = r.source();
        if seen_sources.insert(src) {
            sources.push(GraphElement::SourceNode {
                id: source_id(src),
                label: src.to_string(),
                classes: SOURCE_CLASS,
            });
        }
        for tag in r.tags.iter().map(String::as_str) {
            if seen_tags.insert(tag) {
                tags.push(GraphElement::TagNode {
                    id: tag_id(tag),
                    label: tag.to_string(),
                    classes: TAG_CLASS,
                });
            }
            if seen_edges.insert((src, tag)) {
                edges.push(GraphElement::Edge {
                    source: source_id(src),
                    target: tag_id(tag),
                });
            }
        }
    }

    debug!(
        "Graph built - sources={}, tags={}, edges={}",
        sources.len(),
        tags.len(),
        edges.len()
    );

    let mut out = sources;
    out.append(&mut tags);
    out.append(&mut edges);
    out
}
