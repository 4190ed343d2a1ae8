//! Shared test loops.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use prometheus_timeless_loop::core::{
    AppResult, Callback, Descriptor, EventLoop, ReadyCallback, SchedulerError, TimerHandle,
};

/// Stand-in real loop: records readiness registrations and lets the test
/// report readiness by hand. Its own timers never fire.
#[derive(Default)]
pub struct FakeLoop {
    readers: RefCell<HashMap<Descriptor, ReadyCallback>>,
    writers: RefCell<HashMap<Descriptor, ReadyCallback>>,
}

impl FakeLoop {
    /// Report `fd` readable, invoking whatever callback was registered.
    pub fn fire_readable(&self, fd: Descriptor) -> AppResult<bool> {
        let callback = self.readers.borrow().get(&fd).cloned();
        match callback {
            Some(callback) => callback().map(|()| true),
            None => Ok(false),
        }
    }

    /// Report `fd` writable.
    pub fn fire_writable(&self, fd: Descriptor) -> AppResult<bool> {
        let callback = self.writers.borrow().get(&fd).cloned();
        match callback {
            Some(callback) => callback().map(|()| true),
            None => Ok(false),
        }
    }
}

impl EventLoop for FakeLoop {
    fn time(&self) -> f64 {
        1_000_000.0
    }

    fn call_at(&self, when: f64, _callback: Callback) -> Result<TimerHandle, SchedulerError> {
        Ok(TimerHandle::new(when))
    }

    fn add_reader(&self, fd: Descriptor, callback: ReadyCallback) -> Result<(), SchedulerError> {
        self.readers.borrow_mut().insert(fd, callback);
        Ok(())
    }

    fn remove_reader(&self, fd: Descriptor) -> Result<bool, SchedulerError> {
        Ok(self.readers.borrow_mut().remove(&fd).is_some())
    }

    fn add_writer(&self, fd: Descriptor, callback: ReadyCallback) -> Result<(), SchedulerError> {
        self.writers.borrow_mut().insert(fd, callback);
        Ok(())
    }

    fn remove_writer(&self, fd: Descriptor) -> Result<bool, SchedulerError> {
        Ok(self.writers.borrow_mut().remove(&fd).is_some())
    }

    fn kind(&self) -> &'static str {
        "fake"
    }
}

/// Shared log of fired callback names.
pub type Log = Rc<RefCell<Vec<&'static str>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Callback appending `name` to `log`.
pub fn record(log: &Log, name: &'static str) -> Callback {
    let log = Rc::clone(log);
    Box::new(move || {
        log.borrow_mut().push(name);
        Ok(())
    })
}
