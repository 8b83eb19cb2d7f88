//! Source–author citation graphs.
//!
//! This crate is the analytical core of the workspace. It turns raw
//! citation events (a news source embedding a tweet URL) into:
//!
//! - a [`CitationIndex`]: per-source citation-probability distributions over
//!   cited authors, plus the inverted author→source counts;
//! - a source–source co-citation graph ([`cocite`]), where two sources are
//!   linked by the probability that they independently cite a common
//!   author, optionally discounted by that author's follower reach;
//! - a source↔author bipartite graph ([`bipartite`]), weighted by inverse
//!   log-follower count and pruned of low-signal authors;
//! - a GML export plus a ranking of authors by citation count ([`gml`]).
//!
//! Everything here is a synchronous, single-pass batch computation over
//! in-memory data; the quadratic source-pair sweep in [`cocite`] dominates
//! the cost of the whole workspace.

pub mod bipartite;
pub mod cocite;
pub mod gml;
pub mod graph;
pub mod index;
pub mod metric;

pub use bipartite::{build_bipartite_graph, BipartiteParams};
pub use cocite::{build_cocitation_graph, CociteParams};
pub use gml::{write_gml, write_gml_file};
pub use graph::{CitationGraph, GraphNode, NodeAttrs, NodeClass};
pub use index::{CitationEvent, CitationIndex};
pub use metric::{inverse_log_scale, Metric, Threshold};
