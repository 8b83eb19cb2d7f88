//! GML export of attributed citation graphs.
//!
//! Plain-text graph-interchange format readable by the usual network
//! tooling. Node ids are dense integers assigned in insertion order; string
//! attributes are double-quoted with `&` and `"` escaped as entities.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::graph::{CitationGraph, NodeAttrs};

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

/// Write `g` in GML to any writer.
pub fn write_gml<W: Write>(g: &CitationGraph, out: &mut W) -> io::Result<()> {
    let graph = g.inner();
    let ids: HashMap<NodeIndex, usize> = graph
        .node_indices()
        .enumerate()
        .map(|(i, ix)| (ix, i))
        .collect();

    writeln!(out, "graph [")?;
    for ix in graph.node_indices() {
        let node = &graph[ix];
        writeln!(out, "  node [")?;
        writeln!(out, "    id {}", ids[&ix])?;
        writeln!(out, "    label \"{}\"", escape(&node.name))?;
        writeln!(out, "    class \"{}\"", node.class().as_str())?;
        match &node.attrs {
            NodeAttrs::News { credibility, bias } => {
                writeln!(out, "    credibility \"{}\"", credibility.as_str())?;
                if let Some(bias) = bias {
                    writeln!(out, "    bias \"{}\"", escape(bias))?;
                }
            }
            NodeAttrs::Twitter {
                followers,
                following,
                tweet_count,
            } => {
                writeln!(out, "    followers {followers}")?;
                writeln!(out, "    following {following}")?;
                writeln!(out, "    tweet_count {tweet_count}")?;
            }
        }
        writeln!(out, "  ]")?;
    }
    for edge in graph.edge_references() {
        writeln!(out, "  edge [")?;
        writeln!(out, "    source {}", ids[&edge.source()])?;
        writeln!(out, "    target {}", ids[&edge.target()])?;
        writeln!(out, "    weight {}", edge.weight())?;
        writeln!(out, "  ]")?;
    }
    writeln!(out, "]")?;
    Ok(())
}

/// Write `g` in GML to `path`.
pub fn write_gml_file(g: &CitationGraph, path: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);
    write_gml(g, &mut out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use citenet_common::{Credibility, LabelTable, ProfileTable, SourceLabel};

    fn sample_graph() -> CitationGraph {
        let mut labels = LabelTable::new();
        labels.insert(
            "daily \"truth\"".into(),
            SourceLabel {
                credibility: Credibility::Unreliable,
                bias: "far&right".into(),
            },
        );
        let mut g = CitationGraph::new();
        let a = g.add_news_node("daily \"truth\"", &labels);
        let b = g.add_twitter_node("who", &ProfileTable::new());
        g.set_edge(a, b, 0.25);
        g
    }

    #[test]
    fn emits_nodes_edges_and_attributes() {
        let mut buf = Vec::new();
        write_gml(&sample_graph(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("graph [\n"));
        assert!(text.trim_end().ends_with(']'));
        assert!(text.contains("    credibility \"unreliable\""));
        assert!(text.contains("    class \"twitter\""));
        assert!(text.contains("    followers 1"));
        assert!(text.contains("    weight 0.25"));
        assert!(text.contains("    source 0"));
        assert!(text.contains("    target 1"));
    }

    #[test]
    fn escapes_quotes_and_ampersands() {
        let mut buf = Vec::new();
        write_gml(&sample_graph(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("label \"daily &quot;truth&quot;\""));
        assert!(text.contains("bias \"far&amp;right\""));
        assert!(!text.contains("far&right"));
    }
}
