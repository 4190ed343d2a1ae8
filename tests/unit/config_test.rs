//! Tests for configuration

use std::io::Write;

use prometheus_timeless_loop::config::VirtualClockConfig;

#[test]
fn test_json_partial_uses_defaults() {
    let cfg = VirtualClockConfig::from_json_str(r#"{ "start_time": 12.5 }"#).unwrap();
    assert_eq!(cfg.start_time, 12.5);
    assert_eq!(cfg.max_pending, VirtualClockConfig::default().max_pending);
}

#[test]
fn test_json_rejects_invalid_values() {
    let err = VirtualClockConfig::from_json_str(r#"{ "max_pending": 0 }"#).unwrap_err();
    assert!(err.contains("max_pending"));

    let err = VirtualClockConfig::from_json_str("not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_validate_rejects_negative_start() {
    let cfg = VirtualClockConfig::default().with_start_time(-1.0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_from_env_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "TIMELESS_START_TIME=3.5").unwrap();
    writeln!(file, "TIMELESS_MAX_CALLBACKS_PER_ADVANCE=64").unwrap();
    writeln!(file, "UNRELATED=1").unwrap();

    let cfg = VirtualClockConfig::from_env_file(file.path()).unwrap();
    assert_eq!(cfg.start_time, 3.5);
    assert_eq!(cfg.max_callbacks_per_advance, 64);
    assert_eq!(cfg.max_pending, VirtualClockConfig::default().max_pending);
}

#[test]
fn test_from_env_file_bad_value() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "TIMELESS_MAX_PENDING=lots").unwrap();
    let err = VirtualClockConfig::from_env_file(file.path()).unwrap_err();
    assert!(err.contains("TIMELESS_MAX_PENDING"));
}

#[test]
fn test_from_env_file_missing() {
    assert!(VirtualClockConfig::from_env_file("/nonexistent/timeless.env").is_err());
}
