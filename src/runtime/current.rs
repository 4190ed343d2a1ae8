//! Per-thread "current event loop" slot.
//!
//! Code under test looks its loop up here instead of taking it as a parameter,
//! so a test can install a [`VirtualClockScheduler`](crate::core::VirtualClockScheduler)
//! in place of a real loop.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{EventLoop, SchedulerError};

thread_local! {
    static CURRENT: RefCell<Option<Rc<dyn EventLoop>>> = const { RefCell::new(None) };
}

/// Install `event_loop` as this thread's loop, returning the previous one.
pub fn set_event_loop(event_loop: Rc<dyn EventLoop>) -> Option<Rc<dyn EventLoop>> {
    tracing::debug!("installing {} event loop", event_loop.kind());
    CURRENT.with(|slot| slot.borrow_mut().replace(event_loop))
}

/// Remove and return this thread's loop.
pub fn clear_event_loop() -> Option<Rc<dyn EventLoop>> {
    CURRENT.with(|slot| slot.borrow_mut().take())
}

/// This thread's loop.
///
/// # Errors
///
/// `NoEventLoop` when nothing is installed.
pub fn get_event_loop() -> Result<Rc<dyn EventLoop>, SchedulerError> {
    CURRENT.with(|slot| slot.borrow().clone().ok_or(SchedulerError::NoEventLoop))
}
