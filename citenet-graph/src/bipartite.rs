//! Source↔author bipartite graph.
//!
//! The direct view of the citation data: news sources on one side, cited
//! tweet authors on the other. Each citation adds one inverse-log-follower
//! increment to its (author, source) edge, so an account with millions of
//! followers needs many more citations to carry the same weight as a
//! small one — the same reach discount as the co-citation scaling.

use std::collections::{HashMap, HashSet};

use citenet_common::{profiles::NEUTRAL_METRIC, LabelTable, ProfileTable};
use citenet_social::twitter::extract::author_from_url;

use crate::graph::CitationGraph;
use crate::index::CitationEvent;
use crate::metric::{inverse_log_scale, Threshold};

#[derive(Debug, Clone)]
pub struct BipartiteParams {
    /// Edge cutoff over the accumulated weight distribution. The default is
    /// the plain distribution mean (alpha = 0).
    pub threshold: Threshold,
    /// Twitter-class nodes below this degree are pruned after thresholding.
    pub min_degree: usize,
}

impl Default for BipartiteParams {
    fn default() -> Self {
        Self {
            threshold: Threshold::MeanStd { alpha: 0.0 },
            min_degree: 5,
        }
    }
}

/// Build the bipartite graph straight from citation events.
///
/// All sources and resolvable authors appear as nodes; only edges whose
/// accumulated weight clears the threshold survive, and authors left with
/// fewer than `min_degree` surviving links are pruned. Isolated news nodes
/// are kept.
pub fn build_bipartite_graph(
    events: &[CitationEvent],
    profiles: &ProfileTable,
    labels: &LabelTable,
    exclude_authors: &HashSet<String>,
    params: &BipartiteParams,
) -> CitationGraph {
    let mut g = CitationGraph::new();
    let mut weights: HashMap<(String, String), f64> = HashMap::new();

    for event in events {
        let Some(author) = author_from_url(event.url.as_deref()) else {
            continue;
        };
        if exclude_authors.contains(&author) {
            continue;
        }

        g.add_twitter_node(&author, profiles);
        g.add_news_node(&event.source, labels);

        let followers = profiles.followers(&author).unwrap_or(NEUTRAL_METRIC);
        *weights
            .entry((author, event.source.clone()))
            .or_insert(0.0) += inverse_log_scale(followers);
    }

    let scores: Vec<f64> = weights.values().copied().collect();
    let cutoff = params.threshold.resolve(&scores);
    tracing::info!(
        pairs = weights.len(),
        cutoff,
        min_degree = params.min_degree,
        "bipartite weight distribution"
    );

    // Deterministic edge insertion order keeps exports stable across runs.
    let mut entries: Vec<(&(String, String), &f64)> = weights.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for ((author, source), weight) in entries {
        if *weight > cutoff {
            let ai = g.add_twitter_node(author, profiles);
            let si = g.add_news_node(source, labels);
            g.set_edge(ai, si, *weight);
        }
    }

    g.prune_twitter_below_degree(params.min_degree);

    tracing::info!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        "bipartite graph built"
    );
    g
}
