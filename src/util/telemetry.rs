//! Logging setup for programs and test suites using the scheduler.
//!
//! The scheduler logs clock movement and callback dispatch at `debug`, so
//! `RUST_LOG=prometheus_timeless_loop=debug` shows a timeline of a test.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, or `warn` when it is unset or malformed.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install a fmt subscriber filtered by [`env_filter`]. Leaves an existing
/// global subscriber in place.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("subscriber already installed; keeping it");
        return;
    }
    if tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .is_err()
    {
        tracing::debug!("subscriber installed concurrently; keeping it");
    }
}

/// Like [`init_tracing`], but writes through the test harness so output is
/// captured per test. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init();
}
