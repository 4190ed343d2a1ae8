//! Tests for the tokio event loop

#![cfg(feature = "tokio-runtime")]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use prometheus_timeless_loop::core::{sleep, EventLoop};
use prometheus_timeless_loop::runtime::TokioLoop;

#[test]
fn test_tokio_loop_fires_on_wall_clock() {
    let lp = TokioLoop::new().unwrap();
    assert_eq!(lp.kind(), "tokio");

    let fired = Rc::new(Cell::new(false));
    let f = Rc::clone(&fired);
    lp.call_later(
        0.005,
        Box::new(move || {
            f.set(true);
            Ok(())
        }),
    )
    .unwrap();

    assert!(!fired.get());
    lp.run_for(Duration::from_millis(100));
    assert!(fired.get());
    assert!(lp.time() >= 0.005);
}

#[test]
fn test_tokio_loop_cancelled_timer() {
    let lp = TokioLoop::new().unwrap();
    let fired = Rc::new(Cell::new(false));
    let f = Rc::clone(&fired);
    let handle = lp
        .call_later(
            0.005,
            Box::new(move || {
                f.set(true);
                Ok(())
            }),
        )
        .unwrap();
    handle.cancel();
    lp.run_for(Duration::from_millis(50));
    assert!(!fired.get());
    assert!(!handle.fired());
}

#[test]
fn test_tokio_loop_runs_sleep_and_tasks() {
    let lp = Rc::new(TokioLoop::new().unwrap());
    let dyn_loop: Rc<dyn EventLoop> = lp.clone();

    let done = Rc::new(Cell::new(false));
    let d = Rc::clone(&done);
    lp.spawn(Box::pin(async move { d.set(true) })).unwrap();

    lp.run_until_complete(sleep(&dyn_loop, 0.01)).unwrap();
    assert!(done.get());
}

#[test]
fn test_tokio_loop_rejects_non_finite_time() {
    let lp = TokioLoop::new().unwrap();
    assert!(lp.call_at(f64::NAN, Box::new(|| Ok(()))).is_err());
}
