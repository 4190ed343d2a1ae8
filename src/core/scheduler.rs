//! Virtual-clock scheduler wrapping a real event loop.
//!
//! [`VirtualClockScheduler`] owns virtual time and the pending-callback queue.
//! `call_at` (and with it `call_later` / `call_soon`) enqueue against virtual
//! time; nothing fires until the test calls [`advance`](VirtualClockScheduler::advance).
//! Everything else is forwarded to the wrapped loop:
//!
//! - Readiness registrations go to the wrapped loop, but the callback it
//!   receives only enqueues the user callback on the virtual queue, so
//!   readiness work runs on virtual time.
//! - Spawned tasks are polled by `call_soon` entries on the virtual queue, so a
//!   task awaiting a timer resumes inside the `advance` that reaches it.
//! - `kind()` reports the wrapped loop, so consumers that only accept a given
//!   loop accept the scheduler too.
//!
//! ```rust,ignore
//! use prometheus_timeless_loop::core::{EventLoop, VirtualClockScheduler};
//! use prometheus_timeless_loop::runtime::TokioLoop;
//!
//! let sched = VirtualClockScheduler::new(TokioLoop::new()?);
//! sched.call_later(3.0, Box::new(|| { println!("fired"); Ok(()) }))?;
//! sched.advance(1.0)?; // nothing yet
//! sched.advance(5.0)?; // "fired", time() == 6.0
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;

use crate::config::VirtualClockConfig;

use super::event_loop::{Callback, Descriptor, EventLoop, ReadyCallback, TaskId, TimerHandle};
use super::tasks::TaskSet;
use super::timer_queue::TimerQueue;
use super::SchedulerError;

/// Deterministic scheduler driven by explicit [`advance`](Self::advance) calls.
pub struct VirtualClockScheduler<L> {
    wrapped: L,
    config: VirtualClockConfig,
    now: Cell<f64>,
    pending: RefCell<TimerQueue>,
    tasks: Rc<TaskSet>,
    this: Weak<Self>,
}

impl<L> VirtualClockScheduler<L>
where
    L: EventLoop + 'static,
{
    /// Wrap `wrapped` with the default configuration. Time starts at `0.0`.
    pub fn new(wrapped: L) -> Rc<Self> {
        Self::build(wrapped, VirtualClockConfig::default())
    }

    /// Wrap `wrapped` with a validated configuration.
    pub fn with_config(wrapped: L, config: VirtualClockConfig) -> Result<Rc<Self>, SchedulerError> {
        config
            .validate()
            .map_err(|e| SchedulerError::Backend(format!("config invalid: {e}")))?;
        Ok(Self::build(wrapped, config))
    }

    fn build(wrapped: L, config: VirtualClockConfig) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            wrapped,
            now: Cell::new(config.start_time),
            pending: RefCell::new(TimerQueue::new(config.max_pending)),
            tasks: Rc::new(TaskSet::new()),
            config,
            this: this.clone(),
        })
    }

    /// The wrapped real loop, for capabilities outside [`EventLoop`].
    pub fn wrapped(&self) -> &L {
        &self.wrapped
    }

    /// Active configuration.
    pub fn config(&self) -> &VirtualClockConfig {
        &self.config
    }

    /// Move virtual time forward by `delta`, firing every due callback in
    /// `(time, insertion)` order. Returns the number of callbacks fired.
    ///
    /// Callbacks scheduled by a firing callback are picked up in the same call
    /// when they fall at or before the target time. Afterwards the clock sits
    /// exactly at the target time.
    ///
    /// # Errors
    ///
    /// - `InvalidDelay` when `delta` is negative or not finite; nothing fires.
    /// - `Callback` when a fired callback fails. The failing entry is already
    ///   gone and the clock stays at its scheduled time.
    /// - `RunawayAdvance` when more than `max_callbacks_per_advance` callbacks
    ///   would fire.
    pub fn advance(&self, delta: f64) -> Result<usize, SchedulerError> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(SchedulerError::InvalidDelay(delta));
        }
        let target = self.now.get() + delta;
        tracing::debug!(
            "advancing from {} by {} ({} in queue)",
            self.now.get(),
            delta,
            self.pending_len()
        );

        let mut fired = 0;
        loop {
            self.schedule_ready_tasks()?;

            if fired >= self.config.max_callbacks_per_advance {
                if self.next_deadline().is_some_and(|when| when <= target) {
                    tracing::warn!("advance stopped after {} callbacks", fired);
                    return Err(SchedulerError::RunawayAdvance { fired });
                }
                break;
            }

            let Some(entry) = self.pending.borrow_mut().pop_due(target) else {
                break;
            };
            // Entries scheduled in the past fire "now"; the clock never rewinds.
            self.now.set(self.now.get().max(entry.when));
            tracing::debug!("callback at {} (seq {})", entry.when, entry.seq);
            fired += 1;
            (entry.callback)().map_err(SchedulerError::Callback)?;
        }

        self.now.set(target);
        Ok(fired)
    }

    /// Advance to absolute virtual time `when`.
    ///
    /// # Errors
    ///
    /// `InvalidTime` if `when` lies before the current time or is not finite,
    /// otherwise the errors of [`advance`](Self::advance).
    pub fn advance_to(&self, when: f64) -> Result<usize, SchedulerError> {
        let now = self.now.get();
        if !when.is_finite() || when < now {
            return Err(SchedulerError::InvalidTime(when));
        }
        self.advance(when - now)
    }

    /// Live callbacks waiting in the queue.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Scheduled time of the earliest live callback.
    pub fn next_deadline(&self) -> Option<f64> {
        self.pending.borrow_mut().peek_when()
    }

    /// Whether no callback is pending and no task wakeup is outstanding.
    pub fn is_idle(&self) -> bool {
        self.pending_len() == 0 && !self.tasks.has_ready()
    }

    /// Number of spawned tasks that have not finished.
    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the spawned task is still running.
    pub fn task_alive(&self, id: TaskId) -> bool {
        self.tasks.contains(id)
    }

    /// Drop a spawned task. Returns whether it was still running.
    pub fn cancel_task(&self, id: TaskId) -> bool {
        self.tasks.cancel(id)
    }

    /// Discard every pending callback and task.
    ///
    /// Tasks and callbacks commonly hold a handle to the scheduler; closing
    /// breaks those cycles at the end of a test.
    pub fn close(&self) {
        let queue = self.pending.replace(TimerQueue::new(self.config.max_pending));
        drop(queue);
        self.tasks.clear();
        tracing::debug!("scheduler closed at {}", self.now.get());
    }

    /// Turn task wakeups into `call_soon` polls, in wake order.
    ///
    /// A wakeup that cannot be queued goes back to the front of the ready
    /// queue, so it is scheduled once the queue has room again.
    fn schedule_ready_tasks(&self) -> Result<(), SchedulerError> {
        while let Some(id) = self.tasks.pop_ready() {
            let tasks = Rc::clone(&self.tasks);
            let queued = self.call_soon(Box::new(move || {
                tasks.poll(id);
                Ok(())
            }));
            if let Err(e) = queued {
                self.tasks.requeue(id);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Wrap a readiness callback so the wrapped loop only enqueues it here.
    fn reroute(&self, callback: ReadyCallback) -> ReadyCallback {
        let this = self.this.clone();
        Rc::new(move || {
            let Some(scheduler) = this.upgrade() else {
                return Ok(());
            };
            let callback = Rc::clone(&callback);
            scheduler.call_soon(Box::new(move || callback()))?;
            Ok(())
        })
    }
}

impl<L> EventLoop for VirtualClockScheduler<L>
where
    L: EventLoop + 'static,
{
    fn time(&self) -> f64 {
        self.now.get()
    }

    fn call_at(&self, when: f64, callback: Callback) -> Result<TimerHandle, SchedulerError> {
        if !when.is_finite() {
            return Err(SchedulerError::InvalidTime(when));
        }
        tracing::debug!("scheduling callback at {}", when);
        self.pending.borrow_mut().push(when, callback)
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) -> Result<TaskId, SchedulerError> {
        let id = self.tasks.insert(future);
        if let Err(e) = self.schedule_ready_tasks() {
            self.tasks.cancel(id);
            return Err(e);
        }
        Ok(id)
    }

    fn add_reader(&self, fd: Descriptor, callback: ReadyCallback) -> Result<(), SchedulerError> {
        self.wrapped.add_reader(fd, self.reroute(callback))
    }

    fn remove_reader(&self, fd: Descriptor) -> Result<bool, SchedulerError> {
        self.wrapped.remove_reader(fd)
    }

    fn add_writer(&self, fd: Descriptor, callback: ReadyCallback) -> Result<(), SchedulerError> {
        self.wrapped.add_writer(fd, self.reroute(callback))
    }

    fn remove_writer(&self, fd: Descriptor) -> Result<bool, SchedulerError> {
        self.wrapped.remove_writer(fd)
    }

    fn kind(&self) -> &'static str {
        self.wrapped.kind()
    }
}
