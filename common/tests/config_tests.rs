//! Configuration loading tests (file + environment layering).

use modaics_common::config::{ENV_API_BASE_URL, ENV_LOG, ENV_RETRY_COUNT};
use modaics_common::{ConfigError, ModaicsConfig};
use std::collections::HashMap;
use std::io::Write;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_load_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
[api]
base_url = "https://api.modaics.example"
retry_count = 5
backoff_unit_ms = 250

[pipeline]
detection_threshold = 0.6
fallback_to_local = true

[fusion]
local_weight = 0.3
"#
    )
    .expect("write config");

    let config = ModaicsConfig::from_file(file.path()).expect("load config");

    assert_eq!(config.api.base_url, "https://api.modaics.example");
    assert_eq!(config.api.retry_count, 5);
    assert_eq!(config.api.backoff_unit_ms, 250);
    assert_eq!(config.pipeline.detection_threshold, 0.6);
    assert!(config.pipeline.fallback_to_local);
    assert_eq!(config.fusion.local_weight, 0.3);
    // Untouched sections keep their defaults
    assert_eq!(config.logging.filter, "info");
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("does-not-exist.toml");

    let config = ModaicsConfig::load(Some(&path)).expect("defaults");
    assert_eq!(config.api.api_version, "v1");
}

#[test]
fn test_env_overrides_take_priority() {
    let mut config = ModaicsConfig::from_toml_str(
        r#"
        [api]
        base_url = "https://from-file.example"
        retry_count = 2
        "#,
    )
    .expect("parse");

    config
        .apply_env_overrides(env(&[
            (ENV_API_BASE_URL, "https://from-env.example"),
            (ENV_RETRY_COUNT, "4"),
            (ENV_LOG, "modaics_client=debug"),
        ]))
        .expect("overrides");

    assert_eq!(config.api.base_url, "https://from-env.example");
    assert_eq!(config.api.retry_count, 4);
    assert_eq!(config.logging.filter, "modaics_client=debug");
}

#[test]
fn test_bad_env_value_is_reported() {
    let mut config = ModaicsConfig::default();
    let err = config
        .apply_env_overrides(env(&[(ENV_RETRY_COUNT, "three")]))
        .unwrap_err();

    match err {
        ConfigError::Env { var, value } => {
            assert_eq!(var, ENV_RETRY_COUNT);
            assert_eq!(value, "three");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let result = ModaicsConfig::from_toml_str("[api\nbase_url = ");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_out_of_range_weight_rejected() {
    let config = ModaicsConfig::from_toml_str(
        r#"
        [fusion]
        local_weight = 1.5
        "#,
    )
    .expect("parse");

    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}
