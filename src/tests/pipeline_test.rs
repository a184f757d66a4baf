use crate::cli::{dump_log, run_host};
use crate::config::LogConfig;
use crate::log_reader::LogReader;
use crate::severity::Severity;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

fn quiet_config(dir: &TempDir) -> LogConfig {
    LogConfig {
        log_file: dir.path().join("host.blog"),
        console_severity: Severity::NoLogs,
        ..LogConfig::default()
    }
}

#[test]
fn host_run_archives_every_event() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);

    let totals = run_host(&config, 3, 40, Duration::from_millis(1)).unwrap();

    // 3 workers x 40, plus start, platform and exit lines from main
    assert_eq!(totals.events, 123);

    let events: Vec<_> = LogReader::open(&config.log_file)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(events.len(), 123);

    let mut per_writer: HashMap<String, Vec<String>> = HashMap::new();
    for event in &events {
        per_writer
            .entry(event.writer_name().to_string())
            .or_default()
            .push(event.message());
    }

    for index in 0..3 {
        let messages = &per_writer[&format!("worker-{index}")];
        let expected: Vec<String> = (1..=40).map(|i| format!("work item {i} of 40")).collect();
        assert_eq!(messages, &expected);
    }
    assert_eq!(per_writer["main"].last().map(String::as_str), Some("Exiting"));
}

#[test]
fn dump_filters_and_formats() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);
    run_host(&config, 1, 12, Duration::from_millis(1)).unwrap();

    let printer_config = LogConfig {
        event_format: "%S %m\n".to_string(),
        ..config.clone()
    };

    let mut out = Vec::new();
    let printed = dump_log(
        &config.log_file,
        &printer_config,
        Severity::Error,
        false,
        false,
        &mut out,
    )
    .unwrap();

    // error and critical for each of the two six-item severity cycles
    assert_eq!(printed, 4);
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().all(|line| line.starts_with("EROR") || line.starts_with("CRIT")));
    assert!(text.contains("EROR work item 5 of 12"));
}

#[test]
fn dump_emits_json_lines() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);
    run_host(&config, 1, 6, Duration::from_millis(1)).unwrap();

    let mut out = Vec::new();
    let printed = dump_log(&config.log_file, &config, Severity::Critical, true, false, &mut out).unwrap();
    assert_eq!(printed, 1);

    let value: serde_json::Value = serde_json::from_slice(out.trim_ascii_end()).unwrap();
    assert_eq!(value["severity"], "critical");
    assert_eq!(value["category"], "worker");
    assert_eq!(value["format"], "work item {} of {}");
}
