// tests/config.rs
use crate::config::{default_console_severity, LogConfig};
use crate::config_loader::{find_config_file, load_config_from};
use crate::severity::Severity;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
pub fn defaults_load_without_file_or_env() {
    let cfg = load_config_from(None, &[], "SPUD_TEST_NONE_").unwrap();
    assert_eq!(cfg, LogConfig::default());
    assert_eq!(cfg.min_severity, Severity::Trace);
}

#[test]
pub fn console_default_follows_build_profile() {
    let expected = if cfg!(debug_assertions) {
        Severity::Debug
    } else {
        Severity::Error
    };
    assert_eq!(default_console_severity(), expected);
    assert_eq!(LogConfig::default().console_severity, expected);
}

#[test]
pub fn search_paths_pick_the_first_existing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    let present = dir.path().join("spud.toml");
    std::fs::write(&present, "console_severity = \"critical\"\n").unwrap();

    let search = vec![missing, present.clone()];
    assert_eq!(find_config_file(&search), Some(present));

    let cfg = load_config_from(None, &search, "SPUD_TEST_SEARCH_").unwrap();
    assert_eq!(cfg.console_severity, Severity::Critical);
}

#[test]
pub fn explicit_file_wins_over_search_paths() {
    let dir = TempDir::new().unwrap();
    let found = dir.path().join("spud.toml");
    std::fs::write(&found, "color = false\n").unwrap();
    let explicit = toml_file("queue_capacity = 2048\n");

    let cfg = load_config_from(Some(explicit.path()), &[found], "SPUD_TEST_EXPLICIT_").unwrap();
    assert_eq!(cfg.queue_capacity, 2048);
    assert!(cfg.color);
}

#[test]
pub fn toml_overrides_defaults() {
    let file = toml_file(
        r#"
log_file = "custom.blog"
console_severity = "warning"
color = false
"#,
    );

    let cfg = load_config_from(Some(file.path()), &[], "SPUD_TEST_TOML_").unwrap();
    assert_eq!(cfg.log_file, PathBuf::from("custom.blog"));
    assert_eq!(cfg.console_severity, Severity::Warning);
    assert!(!cfg.color);
    assert_eq!(cfg.idle_interval_ms, LogConfig::default().idle_interval_ms);
}

#[test]
pub fn env_overrides_toml() {
    let file = toml_file("console_severity = \"warning\"\nqueue_capacity = 4096\n");
    env::set_var("SPUD_TEST_ENV_CONSOLE_SEVERITY", "critical");

    let cfg = load_config_from(Some(file.path()), &[], "SPUD_TEST_ENV_").unwrap();
    assert_eq!(cfg.console_severity, Severity::Critical);
    assert_eq!(cfg.queue_capacity, 4096);

    env::remove_var("SPUD_TEST_ENV_CONSOLE_SEVERITY");
}

#[test]
pub fn missing_explicit_file_fails_fast() {
    let result = load_config_from(
        Some(std::path::Path::new("/definitely/not/here/spud.toml")),
        &[],
        "SPUD_TEST_MISSING_",
    );
    assert!(result.unwrap_err().to_string().contains("config file not found"));
}

#[test]
pub fn zero_queue_capacity_is_rejected() {
    let file = toml_file("queue_capacity = 0\n");
    let result = load_config_from(Some(file.path()), &[], "SPUD_TEST_ZERO_");
    assert!(result.unwrap_err().to_string().contains("queue_capacity"));
}

#[test]
pub fn bad_date_format_is_rejected() {
    let cfg = LogConfig {
        date_format: "%Q".to_string(),
        ..LogConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
pub fn verbosity_lowers_console_threshold() {
    let cfg = LogConfig {
        console_severity: Severity::Error,
        ..LogConfig::default()
    };
    assert_eq!(cfg.clone().with_verbosity(0).console_severity, Severity::Error);
    assert_eq!(cfg.clone().with_verbosity(1).console_severity, Severity::Debug);
    assert_eq!(cfg.with_verbosity(3).console_severity, Severity::Trace);
}
