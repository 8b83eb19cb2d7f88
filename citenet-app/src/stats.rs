//! Descriptive statistics over cited authors, per credibility group.
//!
//! Replaces the exploratory plotting pass: everything a figure would show
//! (citation/follower correlation, account ages, verified share, top cited
//! accounts) is computed here and exported as delimited text.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use citenet_common::{Credibility, LabelTable, ProfileTable};
use citenet_social::twitter::extract::author_from_url;
use time::OffsetDateTime;

use crate::db::TweetRow;

/// Per-author aggregate within one credibility group.
#[derive(Debug, Clone)]
pub struct TopAuthor {
    pub handle: String,
    pub citations: u64,
    pub followers: Option<u64>,
    pub verified: bool,
    pub age_days: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub group: String,
    /// Citations with a resolvable author.
    pub citations: u64,
    pub authors: usize,
    /// Authors with no cached profile (suspended, deleted, never collected).
    pub missing_profiles: usize,
    pub verified: usize,
    pub mean_age_days: Option<f64>,
    pub spearman: Option<f64>,
    pub pearson: Option<f64>,
    pub top_authors: Vec<TopAuthor>,
}

/// Summarise one group of tweet rows against the cached profile table.
///
/// The citation/follower correlations only consider authors with positive
/// follower counts, mirroring the exclusion of unresolved profiles from the
/// distribution analysis.
pub fn summarize_group(
    group: &str,
    rows: &[&TweetRow],
    profiles: &ProfileTable,
    top_k: usize,
    now: OffsetDateTime,
) -> GroupSummary {
    let mut cited: HashMap<String, u64> = HashMap::new();
    for row in rows {
        if let Some(author) = author_from_url(row.url.as_deref()) {
            *cited.entry(author).or_insert(0) += 1;
        }
    }

    let citations: u64 = cited.values().sum();
    let authors = cited.len();
    let missing_profiles = cited.keys().filter(|a| !profiles.contains(a)).count();
    let verified = cited
        .keys()
        .filter_map(|a| profiles.get(a))
        .filter(|p| p.is_verified())
        .count();

    let ages: Vec<f64> = cited
        .keys()
        .filter_map(|a| profiles.get(a))
        .filter_map(|p| p.account_age_days(now))
        .map(|d| d as f64)
        .collect();
    let mean_age_days = if ages.is_empty() {
        None
    } else {
        Some(ages.iter().sum::<f64>() / ages.len() as f64)
    };

    let mut x_cited = Vec::new();
    let mut x_followers = Vec::new();
    let mut handles: Vec<&String> = cited.keys().collect();
    handles.sort();
    for handle in &handles {
        let count = cited[*handle];
        if let Some(followers) = profiles.followers(handle) {
            if followers > 0 && count > 0 {
                x_cited.push(count as f64);
                x_followers.push(followers as f64);
            }
        }
    }

    let mut ranking: Vec<(&String, u64)> = cited.iter().map(|(a, c)| (a, *c)).collect();
    ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let top_authors = ranking
        .into_iter()
        .take(top_k)
        .map(|(handle, citations)| {
            let profile = profiles.get(handle);
            TopAuthor {
                handle: handle.clone(),
                citations,
                followers: profile.map(|p| p.followers()),
                verified: profile.map(|p| p.is_verified()).unwrap_or(false),
                age_days: profile.and_then(|p| p.account_age_days(now)),
            }
        })
        .collect();

    GroupSummary {
        group: group.to_string(),
        citations,
        authors,
        missing_profiles,
        verified,
        mean_age_days,
        spearman: spearman(&x_cited, &x_followers),
        pearson: pearson(&x_cited, &x_followers),
        top_authors,
    }
}

/// Split rows into the three credibility groups and summarise each.
pub fn summarize_by_credibility(
    rows: &[TweetRow],
    labels: &LabelTable,
    profiles: &ProfileTable,
    top_k: usize,
    now: OffsetDateTime,
) -> Vec<GroupSummary> {
    let all: Vec<&TweetRow> = rows.iter().collect();
    let reliable: Vec<&TweetRow> = rows
        .iter()
        .filter(|r| credibility_of(labels, &r.source) == Credibility::Reliable)
        .collect();
    let unreliable: Vec<&TweetRow> = rows
        .iter()
        .filter(|r| credibility_of(labels, &r.source) == Credibility::Unreliable)
        .collect();

    vec![
        summarize_group("all", &all, profiles, top_k, now),
        summarize_group("reliable", &reliable, profiles, top_k, now),
        summarize_group("unreliable", &unreliable, profiles, top_k, now),
    ]
}

fn credibility_of(labels: &LabelTable, source: &str) -> Credibility {
    labels
        .get(source)
        .map(|l| l.credibility)
        .unwrap_or(Credibility::Unlabeled)
}

/// Write the group summaries plus each group's top authors.
pub fn write_summaries(summaries: &[GroupSummary], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "group",
        "citations",
        "authors",
        "missing_profiles",
        "verified",
        "mean_age_days",
        "spearman",
        "pearson",
    ])?;
    for s in summaries {
        let fields = [
            s.group.clone(),
            s.citations.to_string(),
            s.authors.to_string(),
            s.missing_profiles.to_string(),
            s.verified.to_string(),
            s.mean_age_days.map(|v| format!("{v:.1}")).unwrap_or_default(),
            s.spearman.map(|v| format!("{v:.4}")).unwrap_or_default(),
            s.pearson.map(|v| format!("{v:.4}")).unwrap_or_default(),
        ];
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_top_authors(summaries: &[GroupSummary], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["group", "author", "citations", "followers", "verified", "age_days"])?;
    for s in summaries {
        for a in &s.top_authors {
            let fields = [
                s.group.clone(),
                a.handle.clone(),
                a.citations.to_string(),
                a.followers.map(|f| f.to_string()).unwrap_or_default(),
                if a.verified { "yes" } else { "no" }.to_string(),
                a.age_days.map(|d| d.to_string()).unwrap_or_default(),
            ];
            writer.write_record(&fields)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Pearson correlation coefficient. `None` for fewer than two points or a
/// degenerate (zero-variance) axis.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let cov: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    let vx: f64 = x.iter().map(|a| (a - mx).powi(2)).sum();
    let vy: f64 = y.iter().map(|b| (b - my).powi(2)).sum();
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Spearman rank correlation: Pearson over average-tied ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let rx = average_ranks(x);
    let ry = average_ranks(y);
    pearson(&rx, &ry)
}

/// Ranks starting at 1, with tied values receiving the mean of the ranks
/// they span.
fn average_ranks(xs: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..xs.len()).collect();
    order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));

    let mut ranks = vec![0.0; xs.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && xs[order[j + 1]] == xs[order[i]] {
            j += 1;
        }
        // ranks i+1 ..= j+1 average to (i + j) / 2 + 1
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = rank;
        }
        i = j + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use citenet_common::{PublicMetrics, UserProfile};
    use time::macros::datetime;

    #[test]
    fn pearson_of_perfect_line_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        let y_neg: Vec<f64> = y.iter().map(|v| -v).collect();
        assert!((pearson(&x, &y_neg).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_degenerate_cases_are_none() {
        assert!(pearson(&[1.0], &[2.0]).is_none());
        assert!(pearson(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }

    #[test]
    fn spearman_sees_monotone_nonlinear_as_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        assert!((spearman(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn average_ranks_handle_ties() {
        let ranks = average_ranks(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
    }

    fn row(source: &str, author: &str) -> TweetRow {
        TweetRow {
            article_id: "a".into(),
            source: source.into(),
            url: Some(format!("twitter.com/{author}/status/1")),
            rowid: 0,
        }
    }

    fn profile(handle: &str, followers: u64, verified: bool) -> UserProfile {
        UserProfile {
            id: handle.into(),
            username: handle.into(),
            name: None,
            created_at: Some("2010-01-01T00:00:00.000Z".into()),
            verified: Some(verified),
            public_metrics: Some(PublicMetrics {
                followers_count: followers,
                following_count: 0,
                tweet_count: 0,
                listed_count: None,
            }),
        }
    }

    #[test]
    fn group_summary_counts_and_ranks() {
        let rows_owned = vec![
            row("s1", "pop"),
            row("s1", "pop"),
            row("s1", "pop"),
            row("s2", "mid"),
            row("s2", "mid"),
            row("s2", "ghost"),
        ];
        let rows: Vec<&TweetRow> = rows_owned.iter().collect();
        let profiles: ProfileTable = vec![
            profile("pop", 1000, true),
            profile("mid", 10, false),
        ]
        .into_iter()
        .collect();

        let now = datetime!(2020-01-01 00:00:00 UTC);
        let summary = summarize_group("all", &rows, &profiles, 2, now);

        assert_eq!(summary.citations, 6);
        assert_eq!(summary.authors, 3);
        assert_eq!(summary.missing_profiles, 1);
        assert_eq!(summary.verified, 1);
        assert!(summary.mean_age_days.is_some());
        assert_eq!(summary.top_authors.len(), 2);
        assert_eq!(summary.top_authors[0].handle, "pop");
        assert_eq!(summary.top_authors[0].citations, 3);
        assert_eq!(summary.top_authors[1].handle, "mid");
        // two usable points: correlation defined
        assert!(summary.pearson.is_some());
        assert!(summary.spearman.is_some());
    }
}
