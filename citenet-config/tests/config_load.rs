use citenet_config::CitenetConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn load_full_run_config() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
data:
  database: "data/nela-gt-2020.db"
  labels: "data/labels.csv"
  user_data: "user_data/user_data.json"
collector:
  bearer_token: "${TWITTER_BEARER_TOKEN}"
  cooldown_secs: 900
  out_dir: "user_data"
graph:
  metric: "probabilistic"
  scaling: true
  alpha: 1.0
  min_degree: 5
"#;
    let p = write_yaml(&tmp, "citenet.yaml", file_yaml);

    temp_env::with_var("TWITTER_BEARER_TOKEN", Some("secret-token"), || {
        let config = CitenetConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load run config");

        assert_eq!(config.data.database.as_deref(), Some("data/nela-gt-2020.db"));
        assert_eq!(
            config.collector.bearer_token.as_deref(),
            Some("secret-token")
        );
        assert_eq!(config.collector.cooldown_secs, 900);
        assert!(config.graph.scaling);
        assert_eq!(config.graph.min_degree, 5);
    });
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "citenet.yaml",
        "graph:\n  alpha: 1.0\n  min_degree: 5\n",
    );

    temp_env::with_var("CITENET__DATA__DATABASE", Some("override.db"), || {
        let config = CitenetConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load with env override");
        assert_eq!(config.data.database.as_deref(), Some("override.db"));
        assert_eq!(config.graph.min_degree, 5);
    });
}
