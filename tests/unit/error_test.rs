//! Tests for error types

use prometheus_timeless_loop::core::SchedulerError;

#[test]
fn test_invalid_delay_error() {
    let err = SchedulerError::InvalidDelay(-2.0);
    assert_eq!(format!("{}", err), "invalid delay: -2");
}

#[test]
fn test_queue_full_error() {
    let err = SchedulerError::QueueFull("max pending depth 4 reached".to_string());
    assert_eq!(format!("{}", err), "queue full: max pending depth 4 reached");
}

#[test]
fn test_runaway_error() {
    let err = SchedulerError::RunawayAdvance { fired: 3 };
    assert!(format!("{}", err).contains("3 callbacks"));
}

#[test]
fn test_callback_error_keeps_source() {
    let err = SchedulerError::Callback(anyhow::anyhow!("peer reset"));
    assert_eq!(format!("{}", err), "callback failed: peer reset");
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("peer reset"));
}

#[test]
fn test_backend_error() {
    let err = SchedulerError::Backend("connection failed".to_string());
    assert_eq!(format!("{}", err), "backend error: connection failed");
}

#[test]
fn test_errors_convert_into_anyhow() {
    let err: anyhow::Error = SchedulerError::NoProtocol.into();
    assert_eq!(err.to_string(), "transport has no protocol attached");
}
