//! Configuration tests

use super::*;
use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

fn parse(toml_str: &str) -> FileConfig {
    Config::parse_file_config(Path::new("config.toml"), toml_str).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// The rendered default config must parse back to the same settings
#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let file = parse(&config.to_toml());
    let resolved = Config::resolve(file, no_env).unwrap();
    assert_eq!(resolved, config);
}

#[test]
fn test_config_roundtrip_custom() {
    let mut config = Config::default();
    config.logging.level = "debug".to_string();
    config.logging.format = LogFormat::Json;
    config.logging.file_enabled = true;
    config.logging.file_rotation = LogRotation::Hourly;
    config.details.conformance = Conformance::Open;

    let resolved = Config::resolve(parse(&config.to_toml()), no_env).unwrap();
    assert_eq!(resolved, config);
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_file_gives_defaults() {
    let resolved = Config::resolve(parse(""), no_env).unwrap();
    assert_eq!(resolved, Config::default());
    assert_eq!(resolved.details.conformance, Conformance::Strict);
}

#[test]
fn test_env_overrides_file() {
    let file = parse(
        r#"
[logging]
level = "warn"
format = "pretty"

[details]
conformance = "strict"
"#,
    );
    let env = env_from(&[
        (ENV_LEVEL, "trace"),
        (ENV_FORMAT, "json"),
        (ENV_CONFORMANCE, "open"),
    ]);

    let resolved = Config::resolve(file, env).unwrap();
    assert_eq!(resolved.logging.level, "trace");
    assert_eq!(resolved.logging.format, LogFormat::Json);
    assert_eq!(resolved.details.conformance, Conformance::Open);
}

#[test]
fn test_file_overrides_defaults() {
    let file = parse(
        r#"
[logging]
file_enabled = true
file_dir = "/var/log/themes"
file_prefix = "site"
"#,
    );
    let resolved = Config::resolve(file, no_env).unwrap();
    assert!(resolved.logging.file_enabled);
    assert_eq!(resolved.logging.file_dir, PathBuf::from("/var/log/themes"));
    assert_eq!(resolved.logging.file_prefix, "site");
    // untouched settings keep their defaults
    assert_eq!(resolved.logging.level, "info");
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_invalid_values_rejected() {
    let file = parse("[details]\nconformance = \"loose\"\n");
    let err = Config::resolve(file, no_env).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            key: "details.conformance",
            ..
        }
    ));

    let file = parse("[logging]\nfile_rotation = \"weekly\"\n");
    assert!(Config::resolve(file, no_env).is_err());

    let err = Config::resolve(parse(""), env_from(&[(ENV_FORMAT, "xml")])).unwrap_err();
    assert_eq!(err.to_string(), "invalid value \"xml\" for THEME_LOG_FORMAT");
}

#[test]
fn test_malformed_file_is_parse_error() {
    let result = Config::parse_file_config(Path::new("bad.toml"), "[logging\nlevel = ");
    assert!(matches!(result, Err(ConfigError::Parse { .. })));

    let result = Config::parse_file_config(Path::new("bad.toml"), "[themes]\nname = \"x\"\n");
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_missing_file_gives_defaults() {
    let path = std::env::temp_dir().join("theme-log-does-not-exist").join("config.toml");
    let file = Config::load_file_config(&path).unwrap();
    assert!(file.logging.is_none());
    assert!(file.details.is_none());
}
