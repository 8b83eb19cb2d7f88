//! Delimited-text exports: per-tweet joins, author rankings, source counts.

use std::path::Path;

use anyhow::{Context, Result};
use citenet_common::ProfileTable;
use citenet_social::twitter::extract::{author_from_url, strip_query};

use crate::db::{SourceArticleCount, SourceTweetCount, TweetRow};

/// Per-row join of tweet, source, extracted author, and cached profile
/// metrics. Metric fields stay blank when the author has no cached profile,
/// so downstream analysis can distinguish "missing" from a real count.
pub fn write_tweet_export(rows: &[TweetRow], profiles: &ProfileTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "rowid",
        "url",
        "source",
        "author",
        "followers",
        "following",
        "tweet_count",
    ])?;

    for row in rows {
        let url = row.url.as_deref().map(strip_query).unwrap_or_default();
        let author = author_from_url(row.url.as_deref()).unwrap_or_default();
        let profile = (!author.is_empty())
            .then(|| profiles.get(&author))
            .flatten();
        let (followers, following, tweet_count) = match profile {
            Some(p) => (
                p.followers().to_string(),
                p.following().to_string(),
                p.tweet_count().to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let rowid = row.rowid.to_string();
        writer.write_record([
            rowid.as_str(),
            url,
            row.source.as_str(),
            author.as_str(),
            followers.as_str(),
            following.as_str(),
            tweet_count.as_str(),
        ])?;
    }
    writer.flush()?;
    tracing::info!(rows = rows.len(), path = %path.display(), "wrote tweet export");
    Ok(())
}

/// Companion ranking for a graph export: authors by embedded-tweet count,
/// descending.
pub fn write_author_ranking(ranking: &[(String, u64)], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["author", "embedded_tweets"])?;
    for (author, count) in ranking {
        let count = count.to_string();
        writer.write_record([author.as_str(), count.as_str()])?;
    }
    writer.flush()?;
    tracing::info!(authors = ranking.len(), path = %path.display(), "wrote author ranking");
    Ok(())
}

/// Per-source embedded-tweet counts next to the source's total article
/// output, so tweet-embedding habits can be normalised by volume.
pub fn write_source_counts(
    tweet_counts: &[SourceTweetCount],
    article_totals: &[SourceArticleCount],
    path: &Path,
) -> Result<()> {
    let totals: std::collections::HashMap<&str, i64> = article_totals
        .iter()
        .map(|c| (c.source.as_str(), c.articles))
        .collect();

    let mut counts: Vec<&SourceTweetCount> = tweet_counts.iter().collect();
    counts.sort_by(|a, b| a.source.cmp(&b.source));

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["source", "tweets", "tweet_articles", "articles"])?;
    for count in counts {
        let total = totals.get(count.source.as_str()).copied().unwrap_or(0);
        let (tweets, articles, total) = (
            count.tweets.to_string(),
            count.articles.to_string(),
            total.to_string(),
        );
        writer.write_record([
            count.source.as_str(),
            tweets.as_str(),
            articles.as_str(),
            total.as_str(),
        ])?;
    }
    writer.flush()?;
    tracing::info!(sources = tweet_counts.len(), path = %path.display(), "wrote source counts");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use citenet_common::{PublicMetrics, UserProfile};

    fn row(rowid: i64, source: &str, url: Option<&str>) -> TweetRow {
        TweetRow {
            article_id: format!("art-{rowid}"),
            source: source.into(),
            url: url.map(String::from),
            rowid,
        }
    }

    #[test]
    fn tweet_export_blanks_missing_profiles() {
        let profiles: ProfileTable = vec![UserProfile {
            id: "1".into(),
            username: "known".into(),
            name: None,
            created_at: None,
            verified: None,
            public_metrics: Some(PublicMetrics {
                followers_count: 42,
                following_count: 7,
                tweet_count: 9,
                listed_count: None,
            }),
        }]
        .into_iter()
        .collect();

        let rows = vec![
            row(1, "reuters", Some("twitter.com/known/status/5?ref_src=x")),
            row(2, "reuters", Some("twitter.com/stranger/status/6")),
            row(3, "reuters", None),
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twitter_info.csv");
        write_tweet_export(&rows, &profiles, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "rowid,url,source,author,followers,following,tweet_count"
        );
        // query string stripped, metrics filled
        assert_eq!(lines[1], "1,twitter.com/known/status/5,reuters,known,42,7,9");
        // unknown profile: blank metrics
        assert_eq!(lines[2], "2,twitter.com/stranger/status/6,reuters,stranger,,,");
        // unresolvable row keeps its slot with blank url/author
        assert_eq!(lines[3], "3,,reuters,,,,");
    }

    #[test]
    fn ranking_preserves_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.csv");
        let ranking = vec![("x".to_string(), 3u64), ("y".to_string(), 1u64)];
        write_author_ranking(&ranking, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "author,embedded_tweets\nx,3\ny,1\n");
    }

    #[test]
    fn source_counts_join_article_totals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tweets-per-source.csv");
        let tweet_counts = vec![
            SourceTweetCount {
                source: "b".into(),
                tweets: 4,
                articles: 2,
            },
            SourceTweetCount {
                source: "a".into(),
                tweets: 1,
                articles: 1,
            },
        ];
        let totals = vec![SourceArticleCount {
            source: "a".into(),
            articles: 100,
        }];
        write_source_counts(&tweet_counts, &totals, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        // sorted by source; missing totals become 0
        assert_eq!(
            text,
            "source,tweets,tweet_articles,articles\na,1,1,100\nb,4,2,0\n"
        );
    }
}
