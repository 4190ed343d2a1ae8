//! Event loop capability set and the handles it hands out.
//!
//! Consumers depend on [`EventLoop`] rather than on a concrete loop type, so a
//! [`VirtualClockScheduler`](crate::core::VirtualClockScheduler) is accepted
//! anywhere a real loop is.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use super::{AppResult, SchedulerError};

/// One-shot callback fired by a loop. Arguments are captured by the closure.
pub type Callback = Box<dyn FnOnce() -> AppResult<()> + 'static>;

/// Readiness callback; fired every time the descriptor is reported ready.
pub type ReadyCallback = Rc<dyn Fn() -> AppResult<()> + 'static>;

/// Raw descriptor used for readiness registration.
pub type Descriptor = i32;

/// Identifier of a task spawned on a loop.
pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Pending,
    Cancelled,
    Done,
}

/// Handle returned by every scheduling call.
///
/// Cancelling is only effective before the callback starts running.
#[derive(Clone)]
pub struct TimerHandle {
    when: f64,
    state: Rc<Cell<TimerState>>,
    live: Option<Rc<Cell<usize>>>,
}

impl TimerHandle {
    /// Create a live handle for a callback due at `when`.
    pub fn new(when: f64) -> Self {
        Self {
            when,
            state: Rc::new(Cell::new(TimerState::Pending)),
            live: None,
        }
    }

    /// Handle whose cancellation also decrements a queue's live counter.
    pub(crate) fn tracked(when: f64, live: Rc<Cell<usize>>) -> Self {
        Self {
            live: Some(live),
            ..Self::new(when)
        }
    }

    /// Time the callback was scheduled for.
    pub fn when(&self) -> f64 {
        self.when
    }

    /// Prevent the callback from firing. Idempotent, and a no-op once the
    /// callback has started.
    pub fn cancel(&self) {
        if self.state.get() != TimerState::Pending {
            return;
        }
        self.state.set(TimerState::Cancelled);
        if let Some(live) = &self.live {
            live.set(live.get().saturating_sub(1));
        }
    }

    /// Whether [`cancel`](Self::cancel) took effect.
    pub fn cancelled(&self) -> bool {
        self.state.get() == TimerState::Cancelled
    }

    /// Whether the callback was handed to the loop for execution.
    pub fn fired(&self) -> bool {
        self.state.get() == TimerState::Done
    }

    /// Record that the callback left the queue to run.
    pub(crate) fn mark_fired(&self) {
        if self.state.get() == TimerState::Pending {
            self.state.set(TimerState::Done);
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("when", &self.when)
            .field("state", &self.state.get())
            .finish()
    }
}

/// Everything a consumer needs from "an event loop".
///
/// `call_soon` and `call_later` are defined on top of [`call_at`](Self::call_at)
/// and [`time`](Self::time), so an implementor that overrides those two
/// primitives automatically receives every derived scheduling call too.
///
/// Capabilities a loop does not provide keep the default body and report
/// [`SchedulerError::Unsupported`].
pub trait EventLoop {
    /// Current loop time in seconds.
    fn time(&self) -> f64;

    /// Schedule `callback` at absolute loop time `when`.
    fn call_at(&self, when: f64, callback: Callback) -> Result<TimerHandle, SchedulerError>;

    /// Schedule `callback` after `delay` seconds.
    fn call_later(&self, delay: f64, callback: Callback) -> Result<TimerHandle, SchedulerError> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(SchedulerError::InvalidDelay(delay));
        }
        self.call_at(self.time() + delay, callback)
    }

    /// Schedule `callback` for the next loop iteration.
    fn call_soon(&self, callback: Callback) -> Result<TimerHandle, SchedulerError> {
        self.call_later(0.0, callback)
    }

    /// Spawn a local task onto the loop.
    fn spawn(&self, future: LocalBoxFuture<'static, ()>) -> Result<TaskId, SchedulerError> {
        drop(future);
        Err(SchedulerError::Unsupported("spawn"))
    }

    /// Watch `fd` for read readiness.
    fn add_reader(&self, fd: Descriptor, callback: ReadyCallback) -> Result<(), SchedulerError> {
        let _ = (fd, callback);
        Err(SchedulerError::Unsupported("add_reader"))
    }

    /// Stop watching `fd` for read readiness. Returns whether it was registered.
    fn remove_reader(&self, fd: Descriptor) -> Result<bool, SchedulerError> {
        let _ = fd;
        Err(SchedulerError::Unsupported("remove_reader"))
    }

    /// Watch `fd` for write readiness.
    fn add_writer(&self, fd: Descriptor, callback: ReadyCallback) -> Result<(), SchedulerError> {
        let _ = (fd, callback);
        Err(SchedulerError::Unsupported("add_writer"))
    }

    /// Stop watching `fd` for write readiness. Returns whether it was registered.
    fn remove_writer(&self, fd: Descriptor) -> Result<bool, SchedulerError> {
        let _ = fd;
        Err(SchedulerError::Unsupported("remove_writer"))
    }

    /// Identity of the loop implementation, compared by consumers that only
    /// accept particular loops.
    fn kind(&self) -> &'static str;
}
