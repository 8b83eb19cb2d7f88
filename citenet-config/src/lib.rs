//! Loader for workspace configuration with YAML + environment overlays.
//!
//! A run is described by one `citenet.yaml`: where the article database,
//! label table, and cached profile table live, how the collector talks to
//! the REST API, and the default graph-construction parameters. Values may
//! reference `${VAR}` placeholders (the bearer token should never live in
//! the file), and any field can be overridden with `CITENET__`-prefixed
//! environment variables.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct CitenetConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

/// Paths to the external inputs of a run.
#[derive(Debug, Default, Deserialize)]
pub struct DataConfig {
    /// SQLite database holding the article and tweet tables.
    pub database: Option<String>,
    /// Delimited label table (source, country, label, bias, ...).
    pub labels: Option<String>,
    /// Handle-keyed JSON profile table from prior collection.
    pub user_data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CollectorConfig {
    /// Bearer token for the REST API; reference `${TWITTER_BEARER_TOKEN}`
    /// rather than inlining the secret.
    pub bearer_token: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Fixed cooldown after a rate-limit response, in seconds.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            batch_size: default_batch_size(),
            cooldown_secs: default_cooldown_secs(),
            out_dir: default_out_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphConfig {
    /// probabilistic | overlap | jaccard | cosine
    #[serde(default = "default_metric")]
    pub metric: String,
    /// Discount common authors by inverse log follower count.
    #[serde(default)]
    pub scaling: bool,
    /// Explicit edge cutoff; when absent, mean + alpha * stddev is used.
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Minimum surviving degree for twitter nodes in bipartite mode.
    #[serde(default = "default_min_degree")]
    pub min_degree: usize,
    #[serde(default)]
    pub exclude_authors: Vec<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            metric: default_metric(),
            scaling: false,
            threshold: None,
            alpha: default_alpha(),
            min_degree: default_min_degree(),
            exclude_authors: Vec::new(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}
fn default_cooldown_secs() -> u64 {
    15 * 60
}
fn default_out_dir() -> String {
    "user_data".into()
}
fn default_metric() -> String {
    "probabilistic".into()
}
fn default_alpha() -> f64 {
    1.0
}
fn default_min_degree() -> usize {
    5
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML file + env overrides).
pub struct CitenetConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CitenetConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CitenetConfigLoader {
    /// Start with the defaults: `CITENET__`-prefixed env overrides on top of
    /// whatever file/snippet sources get attached.
    ///
    /// ```
    /// use citenet_config::CitenetConfigLoader;
    ///
    /// let config = CitenetConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.collector.batch_size, 100);
    /// assert_eq!(config.graph.metric, "probabilistic");
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("CITENET").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by
    /// suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            // FIXME: support optional config files so collection-only runs
            // can rely purely on environment variables.
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use citenet_config::CitenetConfigLoader;
    ///
    /// let cfg = CitenetConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// data:
    ///   database: "nela-gt-2020.db"
    /// graph:
    ///   alpha: 0.5
    ///   exclude_authors: ["realDonaldTrump"]
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.data.database.as_deref(), Some("nela-gt-2020.db"));
    /// assert_eq!(cfg.graph.alpha, 0.5);
    /// assert_eq!(cfg.graph.exclude_authors, vec!["realDonaldTrump"]);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources, expanding
    /// `${VAR}` placeholders before materialising the typed config.
    pub fn load(self) -> Result<CitenetConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: CitenetConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
