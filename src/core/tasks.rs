//! Local task set whose wakeups are turned into loop callbacks.
//!
//! Futures stay on the loop's thread; only the waker crosses into `Send` land,
//! and all it does is push the task id onto a shared ready queue. The owning
//! loop drains that queue into `call_soon` entries so task steps are ordered
//! with every other callback.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::task::{waker_ref, ArcWake};
use parking_lot::Mutex;

use super::event_loop::TaskId;

struct TaskWaker {
    id: TaskId,
    /// Set while the id sits in the ready queue, so repeated wakes collapse.
    queued: AtomicBool,
    ready: Arc<Mutex<VecDeque<TaskId>>>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        if !arc_self.queued.swap(true, Ordering::AcqRel) {
            arc_self.ready.lock().push_back(arc_self.id);
        }
    }
}

struct LocalTask {
    future: LocalBoxFuture<'static, ()>,
    waker: Arc<TaskWaker>,
}

/// Set of spawned futures polled on demand.
pub struct TaskSet {
    next_id: Cell<TaskId>,
    tasks: RefCell<HashMap<TaskId, LocalTask>>,
    ready: Arc<Mutex<VecDeque<TaskId>>>,
}

impl Default for TaskSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSet {
    /// Create an empty task set.
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            tasks: RefCell::new(HashMap::new()),
            ready: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Store a future and mark it ready for its first poll.
    pub fn insert(&self, future: LocalBoxFuture<'static, ()>) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let waker = Arc::new(TaskWaker {
            id,
            queued: AtomicBool::new(true),
            ready: Arc::clone(&self.ready),
        });
        self.ready.lock().push_back(id);
        self.tasks
            .borrow_mut()
            .insert(id, LocalTask { future, waker });
        tracing::trace!("task {} registered", id);
        id
    }

    /// Oldest outstanding wakeup.
    pub fn pop_ready(&self) -> Option<TaskId> {
        self.ready.lock().pop_front()
    }

    /// Put a wakeup taken with [`pop_ready`](Self::pop_ready) back at the front.
    pub fn requeue(&self, id: TaskId) {
        self.ready.lock().push_front(id);
    }

    /// Poll a task once. Returns `true` when the task is finished or gone.
    pub fn poll(&self, id: TaskId) -> bool {
        // Taken out of the map so the future may spawn or cancel other tasks.
        let Some(mut task) = self.tasks.borrow_mut().remove(&id) else {
            return true;
        };
        task.waker.queued.store(false, Ordering::Release);
        let waker = waker_ref(&task.waker);
        let mut cx = Context::from_waker(&waker);
        match task.future.as_mut().poll(&mut cx) {
            Poll::Ready(()) => {
                tracing::trace!("task {} completed", id);
                true
            }
            Poll::Pending => {
                self.tasks.borrow_mut().insert(id, task);
                false
            }
        }
    }

    /// Drop a task without polling it again. Returns whether it was live.
    pub fn cancel(&self, id: TaskId) -> bool {
        self.ready.lock().retain(|ready| *ready != id);
        self.tasks.borrow_mut().remove(&id).is_some()
    }

    /// Whether the task is still live.
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.borrow().contains_key(&id)
    }

    /// Number of live tasks.
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Whether no task is live.
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Whether any wakeup is waiting to be scheduled.
    pub fn has_ready(&self) -> bool {
        !self.ready.lock().is_empty()
    }

    /// Drop every task and pending wakeup.
    pub fn clear(&self) {
        let drained: Vec<_> = self.tasks.borrow_mut().drain().collect();
        self.ready.lock().clear();
        drop(drained);
    }
}
