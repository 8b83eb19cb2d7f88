//! Source–source co-citation graph.
//!
//! Two sources are linked when they cite a common set of tweet authors more
//! strongly than the background pair distribution. Treating the citations of
//! u and v as independent events, the probabilistic score for a pair is the
//! chance that both cite a common author, optionally discounted by that
//! author's follower reach so that very popular accounts (cited by everyone)
//! contribute less distinctive signal.

use std::collections::HashMap;

use citenet_common::{LabelTable, ProfileTable};

use crate::graph::CitationGraph;
use crate::index::CitationIndex;
use crate::metric::{self, inverse_log_scale, Metric, Threshold};

#[derive(Debug, Clone)]
pub struct CociteParams {
    pub metric: Metric,
    /// Discount common authors by inverse log follower count where profile
    /// data is available (probabilistic metric only).
    pub scaling: bool,
    pub threshold: Threshold,
}

impl Default for CociteParams {
    fn default() -> Self {
        Self {
            metric: Metric::Probabilistic,
            scaling: false,
            threshold: Threshold::MeanStd { alpha: 1.0 },
        }
    }
}

/// Build the co-citation graph over every unordered pair of sources in the
/// index.
///
/// The pair sweep is the dominant cost of the whole workspace: O(S²) pairs,
/// each scored in O(min(|authors(u)|, |authors(v)|)). Pairs with no common
/// author score zero, enter the threshold distribution, and are never
/// emitted as edges — whatever the threshold resolves to.
pub fn build_cocitation_graph(
    index: &CitationIndex,
    profiles: &ProfileTable,
    labels: &LabelTable,
    params: &CociteParams,
) -> CitationGraph {
    let sources = index.sorted_sources();

    let mut scores = Vec::with_capacity(sources.len() * sources.len().saturating_sub(1) / 2);
    let mut candidates: Vec<(&str, &str, f64)> = Vec::new();

    for i in 0..sources.len() {
        for j in (i + 1)..sources.len() {
            let (u, v) = (sources[i].as_str(), sources[j].as_str());
            let score = pair_score(index, u, v, params, profiles);
            scores.push(score);
            if score > 0.0 {
                candidates.push((u, v, score));
            }
        }
    }

    let cutoff = params.threshold.resolve(&scores);
    let (mean, std) = metric::mean_std(&scores);
    tracing::info!(
        pairs = scores.len(),
        mean,
        std,
        cutoff,
        metric = params.metric.as_str(),
        scaling = params.scaling,
        "pairwise score distribution"
    );

    let mut g = CitationGraph::new();
    for (u, v, score) in candidates {
        if score > cutoff {
            let ui = g.add_news_node(u, labels);
            let vi = g.add_news_node(v, labels);
            g.set_edge(ui, vi, score);
        }
    }

    tracing::info!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        "co-citation graph built"
    );
    g
}

fn pair_score(
    index: &CitationIndex,
    u: &str,
    v: &str,
    params: &CociteParams,
    profiles: &ProfileTable,
) -> f64 {
    match params.metric {
        Metric::Probabilistic => {
            let (Some(up), Some(vp)) = (index.probabilities(u), index.probabilities(v)) else {
                return 0.0;
            };
            if params.scaling {
                metric::probabilistic(up, vp, |author| {
                    profiles
                        .followers(author)
                        .map(inverse_log_scale)
                        .unwrap_or(1.0)
                })
            } else {
                metric::probabilistic(up, vp, |_| 1.0)
            }
        }
        Metric::Overlap => count_metric(index, u, v, metric::overlap),
        Metric::Jaccard => count_metric(index, u, v, metric::jaccard),
        Metric::Cosine => count_metric(index, u, v, metric::cosine),
    }
}

fn count_metric<F>(index: &CitationIndex, u: &str, v: &str, f: F) -> f64
where
    F: Fn(&HashMap<String, u64>, &HashMap<String, u64>) -> f64,
{
    match (index.counts(u), index.counts(v)) {
        (Some(uc), Some(vc)) => f(uc, vc),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeClass;
    use crate::index::CitationEvent;
    use std::collections::HashSet;

    fn index(rows: &[(&str, &str)]) -> CitationIndex {
        let events: Vec<CitationEvent> = rows
            .iter()
            .map(|(s, a)| CitationEvent::new(*s, Some(format!("twitter.com/{a}/status/1"))))
            .collect();
        CitationIndex::from_events(&events, &HashSet::new())
    }

    fn build(index: &CitationIndex, params: &CociteParams) -> CitationGraph {
        build_cocitation_graph(index, &ProfileTable::new(), &LabelTable::new(), params)
    }

    #[test]
    fn worked_example_edge_weight() {
        let idx = index(&[("A", "x"), ("A", "x"), ("A", "y"), ("B", "x")]);
        let params = CociteParams {
            threshold: Threshold::Explicit(0.5),
            ..Default::default()
        };
        let g = build(&idx, &params);
        let w = g
            .edge_weight((NodeClass::News, "A"), (NodeClass::News, "B"))
            .expect("edge above threshold");
        assert!((w - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn no_common_authors_means_no_edge_even_below_zero_threshold() {
        let idx = index(&[("A", "x"), ("B", "y")]);
        let params = CociteParams {
            threshold: Threshold::Explicit(-1.0),
            ..Default::default()
        };
        let g = build(&idx, &params);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn never_emits_self_loops() {
        let idx = index(&[("A", "x"), ("A", "y"), ("B", "x"), ("C", "x")]);
        let params = CociteParams {
            threshold: Threshold::Explicit(0.0),
            ..Default::default()
        };
        let g = build(&idx, &params);
        for edge in g.inner().edge_indices() {
            let (a, b) = g.inner().edge_endpoints(edge).unwrap();
            assert_ne!(a, b);
        }
    }

    #[test]
    fn raising_threshold_never_adds_edges() {
        let idx = index(&[
            ("A", "x"),
            ("A", "y"),
            ("B", "x"),
            ("B", "y"),
            ("C", "x"),
            ("C", "z"),
            ("D", "z"),
            ("D", "y"),
        ]);
        let mut previous = usize::MAX;
        for t in [0.0, 0.1, 0.3, 0.5, 0.9] {
            let params = CociteParams {
                threshold: Threshold::Explicit(t),
                ..Default::default()
            };
            let edges = build(&idx, &params).edge_count();
            assert!(edges <= previous, "threshold {t} grew the graph");
            previous = edges;
        }
    }

    #[test]
    fn follower_scaling_discounts_popular_authors() {
        let idx = index(&[("A", "mega"), ("B", "mega")]);
        let mut profiles = ProfileTable::new();
        profiles.insert(citenet_common::UserProfile {
            id: "1".into(),
            username: "mega".into(),
            name: None,
            created_at: None,
            verified: None,
            public_metrics: Some(citenet_common::PublicMetrics {
                followers_count: 1_000_000,
                following_count: 0,
                tweet_count: 0,
                listed_count: None,
            }),
        });
        let params = CociteParams {
            scaling: true,
            threshold: Threshold::Explicit(0.0),
            ..Default::default()
        };
        let unscaled = build_cocitation_graph(
            &idx,
            &ProfileTable::new(),
            &LabelTable::new(),
            &CociteParams {
                threshold: Threshold::Explicit(0.0),
                ..Default::default()
            },
        );
        let scaled = build_cocitation_graph(&idx, &profiles, &LabelTable::new(), &params);
        let wu = unscaled
            .edge_weight((NodeClass::News, "A"), (NodeClass::News, "B"))
            .unwrap();
        let ws = scaled
            .edge_weight((NodeClass::News, "A"), (NodeClass::News, "B"))
            .unwrap();
        assert!(ws < wu);
        assert!(ws > 0.0);
    }

    #[test]
    fn mean_std_threshold_keeps_only_outlier_pairs() {
        // A and B share everything; the remaining pairs share nothing, so
        // the A-B pair sits far above mean + stddev.
        let idx = index(&[
            ("A", "x"),
            ("A", "y"),
            ("B", "x"),
            ("B", "y"),
            ("C", "c1"),
            ("D", "d1"),
            ("E", "e1"),
        ]);
        let g = build(&idx, &CociteParams::default());
        assert_eq!(g.edge_count(), 1);
        assert!(g
            .edge_weight((NodeClass::News, "A"), (NodeClass::News, "B"))
            .is_some());
    }

    #[test]
    fn alternate_metrics_populate_edges() {
        let idx = index(&[("A", "x"), ("A", "y"), ("B", "x"), ("B", "y")]);
        for metric in [Metric::Overlap, Metric::Jaccard, Metric::Cosine] {
            let params = CociteParams {
                metric,
                threshold: Threshold::Explicit(0.0),
                ..Default::default()
            };
            let g = build(&idx, &params);
            assert_eq!(g.edge_count(), 1, "metric {metric:?}");
        }
    }
}
