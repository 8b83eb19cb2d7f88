//! Citenet CLI: build citation networks and run the collection passes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use citenet_common::observability::{init_logging, LogOptions};
use citenet_common::{load_label_table, LabelTable, ProfileTable};
use citenet_config::{CitenetConfig, CitenetConfigLoader};
use citenet_graph::{
    build_bipartite_graph, build_cocitation_graph, write_gml_file, BipartiteParams, CitationEvent,
    CitationIndex, CociteParams, Metric, Threshold,
};
use citenet_social::twitter::collect::{combine_user_files, missing_handles, UserCollector};
use citenet_social::twitter::extract::{author_from_url, strip_query};
use citenet_social::twitter::{FollowKind, TwitterApi};
use clap::{Parser, Subcommand};

mod db;
mod export;
mod stats;

#[derive(Parser)]
#[command(name = "citenet", about = "News-source / tweet-author citation networks")]
struct Cli {
    /// Path to the run configuration file
    #[arg(long, default_value = "citenet.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a citation network and export it as GML plus an author ranking
    Network {
        /// Output path for the GML file
        output: PathBuf,
        /// Restrict to articles listed in this rowid selection file
        #[arg(long)]
        rowids: Option<PathBuf>,
        /// Explicit edge cutoff (otherwise mean + alpha * stddev)
        #[arg(long)]
        threshold: Option<f64>,
        /// Deviations above the mean for the derived cutoff
        #[arg(long)]
        alpha: Option<f64>,
        /// probabilistic | overlap | jaccard | cosine
        #[arg(long)]
        metric: Option<String>,
        /// Discount common authors by inverse log follower count
        #[arg(long)]
        scaling: bool,
        /// Build the source-author bipartite graph instead of source-source
        #[arg(long)]
        bipartite: bool,
        /// Minimum surviving degree for twitter nodes (bipartite mode)
        #[arg(long)]
        min_degree: Option<usize>,
        /// Authors to ignore when building the network
        #[arg(long = "exclude-author")]
        exclude_authors: Vec<String>,
    },
    /// Collect profile data for every author cited in the database
    CollectUsers,
    /// Collect follower/following lists for every cached user
    CollectFollows {
        #[arg(long, default_value = "follows")]
        out_dir: PathBuf,
    },
    /// Re-collect profiles for authors missing from the cached table
    MissingAccounts {
        #[arg(long, default_value = "missing_accounts")]
        out_dir: PathBuf,
    },
    /// Merge collection output directories into one profile table
    CombineUsers {
        /// Directories of collection output JSON files, in merge order
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
        /// Where to write the combined table (default: configured user_data)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export the per-tweet author/profile join as delimited text
    ExportTweets {
        #[arg(default_value = "twitter_info.csv")]
        output: PathBuf,
    },
    /// List the articles embedding a tweet URL, grouped by credibility
    Articles { url: String },
    /// Per-source counts and per-author descriptive statistics
    Stats {
        #[arg(long, default_value = "results")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogOptions {
        emit_stderr: true,
        ..Default::default()
    })?;

    let config: CitenetConfig = CitenetConfigLoader::new().with_file(&cli.config).load()?;

    match cli.command {
        Command::Network {
            output,
            rowids,
            threshold,
            alpha,
            metric,
            scaling,
            bipartite,
            min_degree,
            exclude_authors,
        } => {
            run_network(
                &config,
                &output,
                rowids.as_deref(),
                threshold,
                alpha,
                metric.as_deref(),
                scaling,
                bipartite,
                min_degree,
                exclude_authors,
            )
            .await
        }
        Command::CollectUsers => collect_users(&config).await,
        Command::CollectFollows { out_dir } => collect_follows(&config, &out_dir).await,
        Command::MissingAccounts { out_dir } => missing_accounts(&config, &out_dir).await,
        Command::CombineUsers { dirs, output } => combine_users(&config, &dirs, output.as_deref()),
        Command::ExportTweets { output } => export_tweets(&config, &output).await,
        Command::Articles { url } => articles(&config, &url).await,
        Command::Stats { out_dir } => run_stats(&config, &out_dir).await,
    }
}

fn database_path(config: &CitenetConfig) -> Result<PathBuf> {
    config
        .data
        .database
        .as_ref()
        .map(PathBuf::from)
        .context("data.database is not configured")
}

fn load_labels(config: &CitenetConfig) -> Result<LabelTable> {
    let path = config
        .data
        .labels
        .as_ref()
        .context("data.labels is not configured")?;
    let table = load_label_table(path).with_context(|| format!("loading label table {path}"))?;
    tracing::info!(sources = table.len(), "loaded label table");
    Ok(table)
}

/// Profile coverage is optional for graph construction; a missing table just
/// means neutral defaults everywhere.
fn load_profiles(config: &CitenetConfig) -> Result<ProfileTable> {
    match config.data.user_data.as_ref() {
        Some(path) => {
            let table = ProfileTable::load(path)
                .with_context(|| format!("loading profile table {path}"))?;
            tracing::info!(users = table.len(), "loaded profile table");
            Ok(table)
        }
        None => Ok(ProfileTable::new()),
    }
}

fn profile_table_path(config: &CitenetConfig) -> Result<PathBuf> {
    config
        .data
        .user_data
        .as_ref()
        .map(PathBuf::from)
        .context("data.user_data is not configured")
}

fn make_collector(config: &CitenetConfig, out_dir: &Path) -> Result<UserCollector> {
    let bearer = config
        .collector
        .bearer_token
        .as_ref()
        .context("collector.bearer_token is not configured")?;
    Ok(UserCollector::new(TwitterApi::new(bearer.clone()), out_dir)
        .with_batch_size(config.collector.batch_size)
        .with_cooldown(Duration::from_secs(config.collector.cooldown_secs)))
}

fn to_events(rows: &[db::TweetRow]) -> Vec<CitationEvent> {
    rows.iter()
        .map(|r| CitationEvent::new(r.source.clone(), r.url.clone()))
        .collect()
}

/// Distinct resolvable author handles across all tweet rows, sorted.
fn distinct_authors(rows: &[db::TweetRow]) -> Vec<String> {
    let set: HashSet<String> = rows
        .iter()
        .filter_map(|r| author_from_url(r.url.as_deref()))
        .collect();
    let mut authors: Vec<String> = set.into_iter().collect();
    authors.sort();
    authors
}

#[allow(clippy::too_many_arguments)]
async fn run_network(
    config: &CitenetConfig,
    output: &Path,
    rowids: Option<&Path>,
    threshold: Option<f64>,
    alpha: Option<f64>,
    metric: Option<&str>,
    scaling: bool,
    bipartite: bool,
    min_degree: Option<usize>,
    exclude_authors: Vec<String>,
) -> Result<()> {
    let pool = db::connect(&database_path(config)?).await?;
    let rowid_filter = rowids.map(db::load_rowid_filter).transpose()?;
    let rows = db::load_tweets(&pool, rowid_filter.as_ref()).await?;
    let events = to_events(&rows);

    let labels = load_labels(config)?;
    let profiles = load_profiles(config)?;

    let mut exclude: HashSet<String> = config.graph.exclude_authors.iter().cloned().collect();
    exclude.extend(exclude_authors);

    let index = CitationIndex::from_events(&events, &exclude);

    let graph = if bipartite {
        let params = BipartiteParams {
            threshold: threshold
                .or(config.graph.threshold)
                .map(Threshold::Explicit)
                .unwrap_or(Threshold::MeanStd { alpha: 0.0 }),
            min_degree: min_degree.unwrap_or(config.graph.min_degree),
        };
        build_bipartite_graph(&events, &profiles, &labels, &exclude, &params)
    } else {
        let metric: Metric = metric
            .unwrap_or(&config.graph.metric)
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        let params = CociteParams {
            metric,
            scaling: scaling || config.graph.scaling,
            threshold: threshold
                .or(config.graph.threshold)
                .map(Threshold::Explicit)
                .unwrap_or(Threshold::MeanStd {
                    alpha: alpha.unwrap_or(config.graph.alpha),
                }),
        };
        build_cocitation_graph(&index, &profiles, &labels, &params)
    };

    write_gml_file(&graph, output)
        .with_context(|| format!("writing graph to {}", output.display()))?;
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        path = %output.display(),
        "graph exported"
    );

    let ranking_path = output.with_extension("csv");
    export::write_author_ranking(&index.author_ranking(), &ranking_path)?;
    Ok(())
}

async fn collect_users(config: &CitenetConfig) -> Result<()> {
    let pool = db::connect(&database_path(config)?).await?;
    let rows = db::load_tweets(&pool, None).await?;
    let authors = distinct_authors(&rows);
    tracing::info!(authors = authors.len(), "collecting user profiles");

    let collector = make_collector(config, Path::new(&config.collector.out_dir))?;
    let resolved = collector.collect_users(&authors).await?;
    tracing::info!(resolved, requested = authors.len(), "user collection done");
    Ok(())
}

async fn collect_follows(config: &CitenetConfig, out_dir: &Path) -> Result<()> {
    let profiles = ProfileTable::load(profile_table_path(config)?)?;
    let collector = make_collector(config, out_dir)?;

    let mut users: Vec<(&String, &citenet_common::UserProfile)> = profiles.iter().collect();
    users.sort_by(|a, b| a.0.cmp(b.0));

    for (handle, profile) in users {
        let followers = collector
            .collect_follows(&profile.id, FollowKind::Followers)
            .await?;
        let following = collector
            .collect_follows(&profile.id, FollowKind::Following)
            .await?;
        tracing::info!(
            %handle,
            followers = followers.len(),
            following = following.len(),
            "follow lists collected"
        );
    }
    Ok(())
}

async fn missing_accounts(config: &CitenetConfig, out_dir: &Path) -> Result<()> {
    let profiles = ProfileTable::load(profile_table_path(config)?)?;
    let pool = db::connect(&database_path(config)?).await?;
    let rows = db::load_tweets(&pool, None).await?;
    let authors = distinct_authors(&rows);

    let missing = missing_handles(&authors, &profiles);
    tracing::info!(
        missing = missing.len(),
        cached = profiles.len(),
        "re-collecting missing accounts"
    );
    if missing.is_empty() {
        return Ok(());
    }

    let collector = make_collector(config, out_dir)?;
    let resolved = collector.collect_users(&missing).await?;
    tracing::info!(resolved, requested = missing.len(), "missing-account collection done");
    Ok(())
}

fn combine_users(config: &CitenetConfig, dirs: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let mut files: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        let mut batch: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("reading {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        batch.sort();
        files.extend(batch);
    }
    if files.is_empty() {
        bail!("no collection output files found under {dirs:?}");
    }

    let table = combine_user_files(&files)?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => profile_table_path(config)?,
    };
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    table.save(&output)?;
    tracing::info!(users = table.len(), path = %output.display(), "profile table written");
    Ok(())
}

async fn export_tweets(config: &CitenetConfig, output: &Path) -> Result<()> {
    let pool = db::connect(&database_path(config)?).await?;
    let rows = db::load_tweets(&pool, None).await?;
    let profiles = load_profiles(config)?;
    export::write_tweet_export(&rows, &profiles, output)
}

async fn articles(config: &CitenetConfig, url: &str) -> Result<()> {
    let pool = db::connect(&database_path(config)?).await?;
    let labels = load_labels(config)?;

    // Query both the raw URL and its query-stripped form; the database holds
    // whichever variant the article markup carried.
    let mut results = db::articles_for_tweet(&pool, url).await?;
    let stripped = strip_query(url);
    if stripped != url {
        results.extend(db::articles_for_tweet(&pool, stripped).await?);
    }
    tracing::info!(articles = results.len(), %url, "articles embedding tweet");

    for wanted in [
        citenet_common::Credibility::Unreliable,
        citenet_common::Credibility::Reliable,
    ] {
        println!("------");
        println!("{}", wanted.as_str().to_uppercase());
        for article in &results {
            let class = labels
                .get(&article.source)
                .map(|l| l.credibility)
                .unwrap_or(citenet_common::Credibility::Unlabeled);
            if class == wanted {
                println!(
                    "{}\t{}\t{}",
                    article.source,
                    article.title.as_deref().unwrap_or("-"),
                    article.url.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

async fn run_stats(config: &CitenetConfig, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let pool = db::connect(&database_path(config)?).await?;
    let rows = db::load_tweets(&pool, None).await?;
    let labels = load_labels(config)?;
    let profiles = load_profiles(config)?;

    let tweet_counts = db::tweets_per_source(&pool).await?;
    let article_totals = db::articles_per_source(&pool).await?;
    export::write_source_counts(
        &tweet_counts,
        &article_totals,
        &out_dir.join("tweets-per-source.csv"),
    )?;

    let now = time::OffsetDateTime::now_utc();
    let summaries = stats::summarize_by_credibility(&rows, &labels, &profiles, 10, now);
    for summary in &summaries {
        tracing::info!(
            group = %summary.group,
            citations = summary.citations,
            authors = summary.authors,
            missing_profiles = summary.missing_profiles,
            verified = summary.verified,
            mean_age_days = ?summary.mean_age_days,
            spearman = ?summary.spearman,
            pearson = ?summary.pearson,
            "group summary"
        );
    }
    stats::write_summaries(&summaries, &out_dir.join("author-summary.csv"))?;
    stats::write_top_authors(&summaries, &out_dir.join("top-authors.csv"))?;
    Ok(())
}
