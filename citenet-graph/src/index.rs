//! The citation index: who cites whom, and how often.

use std::collections::{HashMap, HashSet};

use citenet_social::twitter::extract::author_from_url;

/// One observed embedding: a source's article carried a tweet URL.
///
/// The URL is optional because the article store records articles whose
/// embed markup no longer resolves; those rows contribute nothing to the
/// index.
#[derive(Debug, Clone)]
pub struct CitationEvent {
    pub source: String,
    pub url: Option<String>,
}

impl CitationEvent {
    pub fn new(source: impl Into<String>, url: Option<String>) -> Self {
        Self {
            source: source.into(),
            url,
        }
    }
}

/// Two inverted mappings over citation events.
///
/// `source → author → probability` (normalised per source) drives the
/// co-citation scoring; `author → source → raw count` answers ranking and
/// coverage questions. A source with zero resolvable citations is simply
/// absent — there is no zero-division case to guard downstream.
#[derive(Debug, Clone, Default)]
pub struct CitationIndex {
    source_counts: HashMap<String, HashMap<String, u64>>,
    source_probs: HashMap<String, HashMap<String, f64>>,
    author_counts: HashMap<String, HashMap<String, u64>>,
}

impl CitationIndex {
    /// Build the index from raw events, skipping events whose author cannot
    /// be resolved and events by excluded authors.
    pub fn from_events<'a, I>(events: I, exclude_authors: &HashSet<String>) -> Self
    where
        I: IntoIterator<Item = &'a CitationEvent>,
    {
        let mut source_counts: HashMap<String, HashMap<String, u64>> = HashMap::new();
        let mut author_counts: HashMap<String, HashMap<String, u64>> = HashMap::new();

        for event in events {
            let Some(author) = author_from_url(event.url.as_deref()) else {
                continue;
            };
            if exclude_authors.contains(&author) {
                continue;
            }

            *author_counts
                .entry(author.clone())
                .or_default()
                .entry(event.source.clone())
                .or_insert(0) += 1;
            *source_counts
                .entry(event.source.clone())
                .or_default()
                .entry(author)
                .or_insert(0) += 1;
        }

        // Normalise each source's counts into a probability distribution
        // over the authors it cites. Totals are non-zero by construction.
        let source_probs = source_counts
            .iter()
            .map(|(source, counts)| {
                let total: u64 = counts.values().sum();
                let probs = counts
                    .iter()
                    .map(|(author, count)| (author.clone(), *count as f64 / total as f64))
                    .collect();
                (source.clone(), probs)
            })
            .collect();

        let index = Self {
            source_counts,
            source_probs,
            author_counts,
        };
        tracing::info!(
            sources = index.num_sources(),
            authors = index.num_authors(),
            "citation index built"
        );
        index
    }

    pub fn num_sources(&self) -> usize {
        self.source_counts.len()
    }

    pub fn num_authors(&self) -> usize {
        self.author_counts.len()
    }

    /// Sources in lexicographic order, for deterministic pair iteration and
    /// exports.
    pub fn sorted_sources(&self) -> Vec<&String> {
        let mut sources: Vec<&String> = self.source_counts.keys().collect();
        sources.sort();
        sources
    }

    /// Citation-probability distribution of `source` over its cited authors.
    pub fn probabilities(&self, source: &str) -> Option<&HashMap<String, f64>> {
        self.source_probs.get(source)
    }

    /// Raw citation counts of `source` per cited author.
    pub fn counts(&self, source: &str) -> Option<&HashMap<String, u64>> {
        self.source_counts.get(source)
    }

    /// Raw citation counts of `author` per citing source.
    pub fn author_sources(&self, author: &str) -> Option<&HashMap<String, u64>> {
        self.author_counts.get(author)
    }

    pub fn authors(&self) -> impl Iterator<Item = &String> {
        self.author_counts.keys()
    }

    /// Authors ranked by total embedded tweets, descending; ties break on
    /// the handle so the ranking is stable across runs.
    pub fn author_ranking(&self) -> Vec<(String, u64)> {
        let mut ranking: Vec<(String, u64)> = self
            .author_counts
            .iter()
            .map(|(author, counts)| (author.clone(), counts.values().sum()))
            .collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(rows: &[(&str, &str)]) -> Vec<CitationEvent> {
        rows.iter()
            .map(|(src, url)| CitationEvent::new(*src, Some(url.to_string())))
            .collect()
    }

    #[test]
    fn probabilities_sum_to_one_per_source() {
        let evs = events(&[
            ("A", "twitter.com/x/status/1"),
            ("A", "twitter.com/x/status/2"),
            ("A", "twitter.com/y/status/3"),
            ("B", "twitter.com/x/status/1"),
            ("B", "twitter.com/z/status/4"),
            ("B", "twitter.com/z/status/5"),
            ("B", "twitter.com/w/status/6"),
        ]);
        let index = CitationIndex::from_events(&evs, &HashSet::new());
        for source in ["A", "B"] {
            let total: f64 = index.probabilities(source).unwrap().values().sum();
            assert!((total - 1.0).abs() < 1e-6, "{source} sums to {total}");
        }
    }

    #[test]
    fn worked_example_distribution() {
        let evs = events(&[
            ("A", "twitter.com/x"),
            ("A", "twitter.com/x"),
            ("A", "twitter.com/y"),
            ("B", "twitter.com/x"),
        ]);
        let index = CitationIndex::from_events(&evs, &HashSet::new());

        let a = index.probabilities("A").unwrap();
        assert!((a["x"] - 2.0 / 3.0).abs() < 1e-9);
        assert!((a["y"] - 1.0 / 3.0).abs() < 1e-9);
        let b = index.probabilities("B").unwrap();
        assert!((b["x"] - 1.0).abs() < 1e-9);

        assert_eq!(index.author_sources("x").unwrap()["A"], 2);
        assert_eq!(index.author_sources("x").unwrap()["B"], 1);
    }

    #[test]
    fn unknown_authors_are_skipped_not_counted() {
        let mut evs = events(&[("A", "twitter.com/x"), ("A", "https://example.com/page")]);
        evs.push(CitationEvent::new("A", None));
        let index = CitationIndex::from_events(&evs, &HashSet::new());
        let a = index.probabilities("A").unwrap();
        assert_eq!(a.len(), 1);
        assert!((a["x"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn source_with_no_resolvable_citations_is_absent() {
        let evs = vec![CitationEvent::new("ghost", None)];
        let index = CitationIndex::from_events(&evs, &HashSet::new());
        assert!(index.probabilities("ghost").is_none());
        assert_eq!(index.num_sources(), 0);
    }

    #[test]
    fn excluded_authors_never_enter_the_index() {
        let evs = events(&[
            ("A", "twitter.com/potus/status/1"),
            ("A", "twitter.com/x/status/2"),
        ]);
        let exclude: HashSet<String> = ["potus".to_string()].into_iter().collect();
        let index = CitationIndex::from_events(&evs, &exclude);
        assert!(index.author_sources("potus").is_none());
        assert!((index.probabilities("A").unwrap()["x"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ranking_is_descending_and_tie_stable() {
        let evs = events(&[
            ("A", "twitter.com/x"),
            ("B", "twitter.com/x"),
            ("A", "twitter.com/b"),
            ("A", "twitter.com/a"),
        ]);
        let index = CitationIndex::from_events(&evs, &HashSet::new());
        let ranking = index.author_ranking();
        assert_eq!(ranking[0], ("x".to_string(), 2));
        assert_eq!(ranking[1], ("a".to_string(), 1));
        assert_eq!(ranking[2], ("b".to_string(), 1));
    }
}
