//! Pairwise similarity metrics and edge thresholding.
//!
//! The exploratory phase of the study produced several near-duplicate
//! network scripts differing only in which similarity they computed; they
//! collapse here into one [`Metric`] enum consumed by the builders.

use std::collections::HashMap;
use std::str::FromStr;

/// Similarity measure between two sources' citation vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Probability that both sources independently cite a common author:
    /// `Σ P(u cites a) · P(v cites a) · scale(a)`.
    #[default]
    Probabilistic,
    /// Number of common cited authors.
    Overlap,
    /// `|common| / |union|` over cited-author sets.
    Jaccard,
    /// Cosine similarity over raw citation-count vectors.
    Cosine,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Probabilistic => "probabilistic",
            Metric::Overlap => "overlap",
            Metric::Jaccard => "jaccard",
            Metric::Cosine => "cosine",
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "probabilistic" => Ok(Metric::Probabilistic),
            "overlap" => Ok(Metric::Overlap),
            "jaccard" => Ok(Metric::Jaccard),
            "cosine" => Ok(Metric::Cosine),
            other => Err(format!(
                "unknown metric '{other}' (expected probabilistic|overlap|jaccard|cosine)"
            )),
        }
    }
}

/// Edge cutoff rule applied to the pairwise score distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Caller-supplied cutoff.
    Explicit(f64),
    /// `mean + alpha · stddev` of all pairwise scores. Lower alpha yields
    /// denser graphs.
    MeanStd { alpha: f64 },
}

impl Threshold {
    pub fn resolve(&self, scores: &[f64]) -> f64 {
        match *self {
            Threshold::Explicit(value) => value,
            Threshold::MeanStd { alpha } => {
                let (mean, std) = mean_std(scores);
                mean + alpha * std
            }
        }
    }
}

/// Population mean and standard deviation. Empty input yields (0, 0) so an
/// empty graph thresholds to an empty graph instead of NaN-poisoning.
pub(crate) fn mean_std(xs: &[f64]) -> (f64, f64) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Inverse-log discount for an author's follower reach: `1 / ln(max(f, e))`.
///
/// Flooring at Euler's number keeps the factor in (0, 1] and absorbs the
/// zero- and one-follower degeneracies a bare `1/ln(f + eps)` produces.
/// Strictly decreasing above the floor, so popular authors always
/// contribute less per citation.
pub fn inverse_log_scale(followers: u64) -> f64 {
    let f = (followers as f64).max(std::f64::consts::E);
    1.0 / f.ln()
}

/// `Σ P(u cites a) · P(v cites a) · scale(a)` over common authors.
///
/// Iterates the smaller distribution so disjoint pairs exit in O(min) time.
pub fn probabilistic<F>(u: &HashMap<String, f64>, v: &HashMap<String, f64>, scale: F) -> f64
where
    F: Fn(&str) -> f64,
{
    let (small, large) = if u.len() <= v.len() { (u, v) } else { (v, u) };
    let mut score = 0.0;
    for (author, p_small) in small {
        if let Some(p_large) = large.get(author) {
            score += p_small * p_large * scale(author);
        }
    }
    score
}

/// Number of authors cited by both sources.
pub fn overlap(u: &HashMap<String, u64>, v: &HashMap<String, u64>) -> f64 {
    let (small, large) = if u.len() <= v.len() { (u, v) } else { (v, u) };
    small.keys().filter(|a| large.contains_key(*a)).count() as f64
}

/// Jaccard index over cited-author sets.
pub fn jaccard(u: &HashMap<String, u64>, v: &HashMap<String, u64>) -> f64 {
    let common = overlap(u, v);
    let union = (u.len() + v.len()) as f64 - common;
    if union == 0.0 {
        0.0
    } else {
        common / union
    }
}

/// Cosine similarity over raw citation-count vectors.
pub fn cosine(u: &HashMap<String, u64>, v: &HashMap<String, u64>) -> f64 {
    let (small, large) = if u.len() <= v.len() { (u, v) } else { (v, u) };
    let dot: f64 = small
        .iter()
        .filter_map(|(a, x)| large.get(a).map(|y| *x as f64 * *y as f64))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }
    let norm = |m: &HashMap<String, u64>| {
        m.values().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt()
    };
    dot / (norm(u) * norm(v))
}
