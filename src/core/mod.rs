//! Core scheduling abstractions and the virtual clock.

pub mod error;
pub mod event_loop;
pub mod scheduler;
pub mod sleep;
pub mod tasks;
pub mod timer_queue;

pub use error::{AppResult, SchedulerError};
pub use event_loop::{Callback, Descriptor, EventLoop, ReadyCallback, TaskId, TimerHandle};
pub use scheduler::VirtualClockScheduler;
pub use sleep::{sleep, timeout, Sleep};
pub use tasks::TaskSet;
pub use timer_queue::{TimerEntry, TimerQueue};
