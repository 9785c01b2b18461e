use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cellmesh::error::{ConfigError, Error};
use cellmesh::infrastructure::config::settings::Config;

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn write_temp_config(contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let suffix = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!("cellmesh-config-test-{nanos}-{suffix}.toml"));
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn config_loads_every_section() {
    let toml = r#"
[logging]
level = "debug"
format = "json"

[repository]
path = "/srv/cellmesh/repo"

[cluster]
kubectl = "/usr/local/bin/kubectl"
namespace = "cells"

[executor]
program = "cellmesh-runtime"
args = ["--verbose"]

[resolver]
max_concurrency = 4

[routing]
manifest = "out/routes.yaml"
"#;

    let path = write_temp_config(toml);
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    let config = result.expect("valid config");
    assert!(config.logging.is_json());
    assert_eq!(config.cluster.namespace.as_deref(), Some("cells"));
    assert_eq!(config.executor.args, ["--verbose"]);
    assert_eq!(config.resolver.max_concurrency, 4);
    assert_eq!(config.routing.manifest, PathBuf::from("out/routes.yaml"));
}

#[test]
fn config_rejects_zero_concurrency() {
    let path = write_temp_config("[resolver]\nmax_concurrency = 0\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    match result {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "resolver.max_concurrency",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid concurrency error, got {err}"),
        Ok(config) => panic!(
            "Expected zero concurrency to be rejected, got {}",
            config.resolver.max_concurrency
        ),
    }
}

#[test]
fn config_rejects_malformed_toml() {
    let path = write_temp_config("[resolver\nmax_concurrency = 2\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn config_load_reports_missing_file() {
    let result = Config::load("/nonexistent/cellmesh.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn config_rejects_empty_kubectl() {
    let path = write_temp_config("[cluster]\nkubectl = \"\"\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField {
            field: "cluster.kubectl"
        }))
    ));
}
