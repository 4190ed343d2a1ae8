//! # Prometheus Timeless Loop
//!
//! A deterministic virtual-clock event loop for testing code that schedules
//! callbacks: timeouts, retries, backoff, keep-alives.
//!
//! Code under test talks to an [`EventLoop`](core::EventLoop). In production
//! that is a real loop; in a test it is a
//! [`VirtualClockScheduler`](core::VirtualClockScheduler) wrapping the real
//! loop. The scheduler keeps its own clock and its own queue of timed
//! callbacks, and nothing fires until the test moves time forward:
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use prometheus_timeless_loop::builders::SchedulerBuilder;
//! use prometheus_timeless_loop::core::EventLoop;
//! use prometheus_timeless_loop::runtime::TokioLoop;
//!
//! let sched = SchedulerBuilder::new(TokioLoop::new()?).install(true).build()?;
//!
//! // code under test, somewhere behind `get_event_loop()`:
//! sched.call_later(30.0, Box::new(|| { /* give up on the peer */ Ok(()) }))?;
//!
//! sched.advance(29.9)?; // nothing yet
//! sched.advance(0.1)?;  // timeout callback runs, time() == 30.0
//! ```
//!
//! ## What the scheduler owns and what it forwards
//!
//! - **Owned**: `time`, `call_at`, `call_later`, `call_soon`, and the tasks
//!   spawned on it (polled from the virtual queue, so `sleep` and `timeout`
//!   follow virtual time).
//! - **Forwarded**: readiness registration (`add_reader`, `add_writer`, and
//!   their removals) and `kind`. Readiness callbacks are rerouted through the
//!   virtual queue, so they run inside `advance` like everything else.
//!
//! ## Fixtures
//!
//! [`infra::BufferingTransport`] and [`infra::BufferingProtocol`] form an
//! in-memory duplex stream for driving protocol code without sockets.
//!
//! For complete scenarios, see `tests/virtual_clock_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Event loop capability set, virtual clock scheduler, and timer futures.
pub mod core;
/// Configuration for the virtual clock.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// In-memory stream fixtures.
pub mod infra;
/// Real event loops and the current-loop registry.
pub mod runtime;
/// Shared utilities.
pub mod util;
