//! Tests for builder modules

use prometheus_timeless_loop::builders::SchedulerBuilder;
use prometheus_timeless_loop::config::VirtualClockConfig;
use prometheus_timeless_loop::core::{Callback, EventLoop, SchedulerError, TimerHandle};
use prometheus_timeless_loop::runtime::{clear_event_loop, get_event_loop};

struct StubLoop;

impl EventLoop for StubLoop {
    fn time(&self) -> f64 {
        42.0
    }

    fn call_at(&self, when: f64, _callback: Callback) -> Result<TimerHandle, SchedulerError> {
        Ok(TimerHandle::new(when))
    }

    fn kind(&self) -> &'static str {
        "stub"
    }
}

#[test]
fn test_builder_defaults() {
    let builder = SchedulerBuilder::new(StubLoop);
    assert_eq!(builder.config(), &VirtualClockConfig::default());
    let sched = builder.build().unwrap();
    assert_eq!(sched.time(), 0.0);
}

#[test]
fn test_builder_start_time() {
    let sched = SchedulerBuilder::new(StubLoop).start_time(10.0).build().unwrap();
    assert_eq!(sched.time(), 10.0);
}

#[test]
fn test_builder_installs_current_loop() {
    let sched = SchedulerBuilder::new(StubLoop).install(true).build().unwrap();
    let current = get_event_loop().unwrap();
    assert_eq!(current.kind(), "stub");
    sched.advance(1.0).unwrap();
    assert_eq!(current.time(), 1.0);
    clear_event_loop();
}

#[test]
fn test_builder_rejects_invalid_config() {
    let config = VirtualClockConfig::default().with_max_callbacks_per_advance(0);
    let err = SchedulerBuilder::new(StubLoop)
        .with_config(config)
        .install(true)
        .build()
        .err()
        .unwrap();
    assert!(err.to_string().contains("config invalid"));
    assert!(get_event_loop().is_err());
}
