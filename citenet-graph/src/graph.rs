//! Attributed undirected graph shared by both builders.

use std::collections::HashMap;

use citenet_common::{Credibility, LabelTable, ProfileTable};
use petgraph::graph::{NodeIndex, UnGraph};

/// Node class, part of the node's identity: an author handle that happens to
/// collide with a source name stays a distinct node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    News,
    Twitter,
}

impl NodeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeClass::News => "news",
            NodeClass::Twitter => "twitter",
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeAttrs {
    News {
        credibility: Credibility,
        bias: Option<String>,
    },
    Twitter {
        followers: u64,
        following: u64,
        tweet_count: u64,
    },
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub name: String,
    pub attrs: NodeAttrs,
}

impl GraphNode {
    pub fn class(&self) -> NodeClass {
        match self.attrs {
            NodeAttrs::News { .. } => NodeClass::News,
            NodeAttrs::Twitter { .. } => NodeClass::Twitter,
        }
    }
}

/// Weighted undirected graph with (class, name)-keyed node lookup.
#[derive(Debug, Clone, Default)]
pub struct CitationGraph {
    graph: UnGraph<GraphNode, f64>,
    lookup: HashMap<(NodeClass, String), NodeIndex>,
}

impl CitationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or fetch) a news node, attaching credibility/bias from the label
    /// table. Unlisted sources default to unlabeled with no bias rating.
    pub fn add_news_node(&mut self, name: &str, labels: &LabelTable) -> NodeIndex {
        let key = (NodeClass::News, name.to_string());
        if let Some(ix) = self.lookup.get(&key) {
            return *ix;
        }
        let attrs = match labels.get(name) {
            Some(label) => NodeAttrs::News {
                credibility: label.credibility,
                bias: Some(label.bias.clone()),
            },
            None => NodeAttrs::News {
                credibility: Credibility::Unlabeled,
                bias: None,
            },
        };
        let ix = self.graph.add_node(GraphNode {
            name: name.to_string(),
            attrs,
        });
        self.lookup.insert(key, ix);
        ix
    }

    /// Add (or fetch) a twitter node, attaching profile metrics. Authors
    /// without cached profiles get neutral counts of 1.
    pub fn add_twitter_node(&mut self, handle: &str, profiles: &ProfileTable) -> NodeIndex {
        let key = (NodeClass::Twitter, handle.to_string());
        if let Some(ix) = self.lookup.get(&key) {
            return *ix;
        }
        let attrs = match profiles.get(handle) {
            Some(profile) => NodeAttrs::Twitter {
                followers: profile.followers(),
                following: profile.following(),
                tweet_count: profile.tweet_count(),
            },
            None => NodeAttrs::Twitter {
                followers: citenet_common::profiles::NEUTRAL_METRIC,
                following: citenet_common::profiles::NEUTRAL_METRIC,
                tweet_count: citenet_common::profiles::NEUTRAL_METRIC,
            },
        };
        let ix = self.graph.add_node(GraphNode {
            name: handle.to_string(),
            attrs,
        });
        self.lookup.insert(key, ix);
        ix
    }

    /// Set the weighted edge between two existing nodes. Re-adding an edge
    /// replaces its weight rather than stacking a parallel edge.
    pub fn set_edge(&mut self, a: NodeIndex, b: NodeIndex, weight: f64) {
        debug_assert_ne!(a, b, "self-loops are never emitted");
        self.graph.update_edge(a, b, weight);
    }

    pub fn node(&self, class: NodeClass, name: &str) -> Option<NodeIndex> {
        self.lookup.get(&(class, name.to_string())).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn degree(&self, ix: NodeIndex) -> usize {
        self.graph.edges(ix).count()
    }

    /// Weight of the edge between two named nodes, if present.
    pub fn edge_weight(&self, a: (NodeClass, &str), b: (NodeClass, &str)) -> Option<f64> {
        let ai = self.node(a.0, a.1)?;
        let bi = self.node(b.0, b.1)?;
        let edge = self.graph.find_edge(ai, bi)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Drop twitter-class nodes whose degree fell below `min_degree` after
    /// thresholding. News nodes are kept even when isolated.
    pub fn prune_twitter_below_degree(&mut self, min_degree: usize) {
        let mut doomed: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|ix| {
                self.graph[*ix].class() == NodeClass::Twitter && self.degree(*ix) < min_degree
            })
            .collect();
        // remove_node swaps the last node into the freed slot, so release
        // indices from highest to lowest.
        doomed.sort();
        let removed = doomed.len();
        for ix in doomed.into_iter().rev() {
            self.graph.remove_node(ix);
        }
        if removed > 0 {
            self.rebuild_lookup();
            tracing::debug!(removed, min_degree, "pruned low-degree twitter nodes");
        }
    }

    fn rebuild_lookup(&mut self) {
        self.lookup = self
            .graph
            .node_indices()
            .map(|ix| {
                let node = &self.graph[ix];
                ((node.class(), node.name.clone()), ix)
            })
            .collect();
    }

    /// Underlying petgraph structure, for export and inspection.
    pub fn inner(&self) -> &UnGraph<GraphNode, f64> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citenet_common::SourceLabel;

    fn labels() -> LabelTable {
        let mut table = LabelTable::new();
        table.insert(
            "reuters".into(),
            SourceLabel {
                credibility: Credibility::Reliable,
                bias: "center".into(),
            },
        );
        table
    }

    #[test]
    fn news_and_twitter_nodes_with_same_name_stay_distinct() {
        let mut g = CitationGraph::new();
        let labels = labels();
        let profiles = ProfileTable::new();
        let n = g.add_news_node("reuters", &labels);
        let t = g.add_twitter_node("reuters", &profiles);
        assert_ne!(n, t);
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn re_adding_a_node_is_idempotent() {
        let mut g = CitationGraph::new();
        let labels = labels();
        let a = g.add_news_node("reuters", &labels);
        let b = g.add_news_node("reuters", &labels);
        assert_eq!(a, b);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn set_edge_replaces_weight() {
        let mut g = CitationGraph::new();
        let labels = labels();
        let a = g.add_news_node("a", &labels);
        let b = g.add_news_node("b", &labels);
        g.set_edge(a, b, 1.0);
        g.set_edge(a, b, 2.5);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(
            g.edge_weight((NodeClass::News, "a"), (NodeClass::News, "b")),
            Some(2.5)
        );
    }

    #[test]
    fn pruning_keeps_isolated_news_nodes() {
        let mut g = CitationGraph::new();
        let labels = labels();
        let profiles = ProfileTable::new();
        let news = g.add_news_node("reuters", &labels);
        let strong = g.add_twitter_node("strong", &profiles);
        let weak = g.add_twitter_node("weak", &profiles);
        let other = g.add_news_node("other", &labels);
        g.set_edge(strong, news, 1.0);
        g.set_edge(strong, other, 1.0);
        g.set_edge(weak, news, 1.0);

        g.prune_twitter_below_degree(2);

        assert!(g.node(NodeClass::Twitter, "strong").is_some());
        assert!(g.node(NodeClass::Twitter, "weak").is_none());
        // news nodes survive regardless of degree
        assert!(g.node(NodeClass::News, "reuters").is_some());
        assert!(g.node(NodeClass::News, "other").is_some());
        // lookup stays consistent after index reshuffling
        assert_eq!(
            g.edge_weight((NodeClass::Twitter, "strong"), (NodeClass::News, "other")),
            Some(1.0)
        );
    }
}
