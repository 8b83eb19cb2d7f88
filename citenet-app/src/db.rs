//! SQLite access to the article/tweet database.
//!
//! The database carries one `newsdata` row per article and one `tweet` row
//! per embedded tweet observed in an article body. Everything downstream
//! works from the join of the two.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

/// One embedded tweet joined with its article.
#[derive(Debug, Clone, FromRow)]
pub struct TweetRow {
    pub article_id: String,
    pub source: String,
    pub url: Option<String>,
    pub rowid: i64,
}

/// An article that embedded a given tweet.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    pub source: String,
    pub title: Option<String>,
    pub url: Option<String>,
}

/// Embedded-tweet and article counts for one source.
#[derive(Debug, Clone, FromRow)]
pub struct SourceTweetCount {
    pub source: String,
    pub tweets: i64,
    pub articles: i64,
}

/// Total article count for one source.
#[derive(Debug, Clone, FromRow)]
pub struct SourceArticleCount {
    pub source: String,
    pub articles: i64,
}

const TWEETS_QUERY: &str = "SELECT t.article_id AS article_id, a.source AS source, \
     t.embedded_tweet AS url, a.rowid AS rowid \
     FROM tweet t INNER JOIN newsdata a ON t.article_id = a.id";

const ARTICLES_FOR_TWEET_QUERY: &str = "SELECT d.source AS source, d.title AS title, d.url AS url \
     FROM tweet t INNER JOIN newsdata d ON t.article_id = d.id \
     WHERE t.embedded_tweet = ?";

const TWEETS_PER_SOURCE_QUERY: &str = "SELECT d.source AS source, count(*) AS tweets, \
     count(DISTINCT t.article_id) AS articles \
     FROM tweet t INNER JOIN newsdata d ON t.article_id = d.id \
     GROUP BY d.source";

const ARTICLES_PER_SOURCE_QUERY: &str =
    "SELECT source, count(id) AS articles FROM newsdata GROUP BY source";

pub async fn connect(path: &Path) -> Result<SqlitePool> {
    let url = format!("sqlite:{}", path.display());
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .with_context(|| format!("opening article database {}", path.display()))
}

/// Load all embedded tweets, optionally restricted to a set of article
/// rowids (topic selections).
pub async fn load_tweets(
    pool: &SqlitePool,
    rowids: Option<&HashSet<String>>,
) -> Result<Vec<TweetRow>> {
    let rows: Vec<TweetRow> = sqlx::query_as(TWEETS_QUERY)
        .fetch_all(pool)
        .await
        .context("loading tweet rows")?;
    let rows = match rowids {
        Some(keep) => rows
            .into_iter()
            .filter(|r| keep.contains(&r.rowid.to_string()))
            .collect(),
        None => rows,
    };
    tracing::info!(tweets = rows.len(), "loaded embedded tweets");
    Ok(rows)
}

/// Articles embedding exactly this tweet URL.
pub async fn articles_for_tweet(pool: &SqlitePool, tweet_url: &str) -> Result<Vec<ArticleRow>> {
    sqlx::query_as(ARTICLES_FOR_TWEET_QUERY)
        .bind(tweet_url)
        .fetch_all(pool)
        .await
        .context("querying articles for tweet")
}

pub async fn tweets_per_source(pool: &SqlitePool) -> Result<Vec<SourceTweetCount>> {
    sqlx::query_as(TWEETS_PER_SOURCE_QUERY)
        .fetch_all(pool)
        .await
        .context("counting tweets per source")
}

pub async fn articles_per_source(pool: &SqlitePool) -> Result<Vec<SourceArticleCount>> {
    sqlx::query_as(ARTICLES_PER_SOURCE_QUERY)
        .fetch_all(pool)
        .await
        .context("counting articles per source")
}

/// Load a rowid selection from a delimited file with a `rowid,month,source`
/// header. Only the first column is used.
pub fn load_rowid_filter(path: &Path) -> Result<HashSet<String>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening rowid selection {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let mut rowids = HashSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(rowid) = record.get(0) {
            rowids.insert(rowid.to_string());
        }
    }
    tracing::info!(rowids = rowids.len(), "loaded topic rowid selection");
    Ok(rowids)
}
