//! Tokio-backed real event loop.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use futures::future::LocalBoxFuture;
use tokio::task::{JoinHandle, LocalSet};

use crate::core::{Callback, Descriptor, EventLoop, ReadyCallback, SchedulerError, TaskId, TimerHandle};

/// Real event loop running on a current-thread tokio runtime and a `LocalSet`.
///
/// Callbacks and tasks only make progress while the loop is driven with
/// [`run_for`](Self::run_for) or [`run_until_complete`](Self::run_until_complete).
/// A callback error is logged and swallowed, matching what a production loop
/// does with a failing callback.
pub struct TokioLoop {
    // Declared first so tasks drop while the runtime is still alive.
    local: LocalSet,
    runtime: tokio::runtime::Runtime,
    started: Instant,
    next_task: Cell<TaskId>,
    readers: RefCell<HashMap<Descriptor, JoinHandle<()>>>,
    writers: RefCell<HashMap<Descriptor, JoinHandle<()>>>,
}

impl TokioLoop {
    /// Create a loop with its own current-thread runtime.
    pub fn new() -> Result<Self, SchedulerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SchedulerError::Backend(e.to_string()))?;
        Ok(Self {
            local: LocalSet::new(),
            runtime,
            started: Instant::now(),
            next_task: Cell::new(0),
            readers: RefCell::new(HashMap::new()),
            writers: RefCell::new(HashMap::new()),
        })
    }

    /// Drive the loop for `duration` of wall-clock time.
    pub fn run_for(&self, duration: Duration) {
        self.runtime.block_on(self.local.run_until(async move {
            tokio::time::sleep(duration).await;
        }));
    }

    /// Drive the loop until `future` completes.
    pub fn run_until_complete<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(self.local.run_until(future))
    }

    #[cfg(unix)]
    fn watch(
        &self,
        fd: Descriptor,
        interest: tokio::io::Interest,
        callback: ReadyCallback,
        registry: &RefCell<HashMap<Descriptor, JoinHandle<()>>>,
    ) {
        use tokio::io::unix::AsyncFd;

        let task = self.local.spawn_local(async move {
            let watched = match AsyncFd::with_interest(fd, interest) {
                Ok(watched) => watched,
                Err(e) => {
                    tracing::error!("cannot watch fd {}: {}", fd, e);
                    return;
                }
            };
            loop {
                let mut guard = match watched.ready(interest).await {
                    Ok(guard) => guard,
                    Err(e) => {
                        tracing::error!("readiness failed on fd {}: {}", fd, e);
                        return;
                    }
                };
                if let Err(e) = callback() {
                    tracing::error!("readiness callback on fd {} failed: {:#}", fd, e);
                }
                guard.clear_ready();
            }
        });
        if let Some(previous) = registry.borrow_mut().insert(fd, task) {
            previous.abort();
        }
    }

    fn unwatch(fd: Descriptor, registry: &RefCell<HashMap<Descriptor, JoinHandle<()>>>) -> bool {
        registry
            .borrow_mut()
            .remove(&fd)
            .map(|task| task.abort())
            .is_some()
    }
}

impl EventLoop for TokioLoop {
    fn time(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn call_at(&self, when: f64, callback: Callback) -> Result<TimerHandle, SchedulerError> {
        if !when.is_finite() {
            return Err(SchedulerError::InvalidTime(when));
        }
        let delay = Duration::try_from_secs_f64((when - self.time()).max(0.0))
            .map_err(|_| SchedulerError::InvalidTime(when))?;
        let handle = TimerHandle::new(when);
        let guard = handle.clone();
        self.local.spawn_local(async move {
            tokio::time::sleep(delay).await;
            if guard.cancelled() {
                return;
            }
            guard.mark_fired();
            if let Err(e) = callback() {
                tracing::error!("callback scheduled at {} failed: {:#}", when, e);
            }
        });
        Ok(handle)
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) -> Result<TaskId, SchedulerError> {
        let id = self.next_task.get();
        self.next_task.set(id + 1);
        self.local.spawn_local(future);
        Ok(id)
    }

    #[cfg(unix)]
    fn add_reader(&self, fd: Descriptor, callback: ReadyCallback) -> Result<(), SchedulerError> {
        self.watch(fd, tokio::io::Interest::READABLE, callback, &self.readers);
        Ok(())
    }

    #[cfg(unix)]
    fn remove_reader(&self, fd: Descriptor) -> Result<bool, SchedulerError> {
        Ok(Self::unwatch(fd, &self.readers))
    }

    #[cfg(unix)]
    fn add_writer(&self, fd: Descriptor, callback: ReadyCallback) -> Result<(), SchedulerError> {
        self.watch(fd, tokio::io::Interest::WRITABLE, callback, &self.writers);
        Ok(())
    }

    #[cfg(unix)]
    fn remove_writer(&self, fd: Descriptor) -> Result<bool, SchedulerError> {
        Ok(Self::unwatch(fd, &self.writers))
    }

    fn kind(&self) -> &'static str {
        "tokio"
    }
}
