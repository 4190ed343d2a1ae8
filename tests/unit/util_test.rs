//! Tests for utility functions

use prometheus_timeless_loop::util::{init_test_tracing, init_tracing};

#[test]
fn test_init_tracing_is_idempotent() {
    init_test_tracing();
    init_tracing();
    init_tracing();
    tracing::debug!("subscriber installed");
}
