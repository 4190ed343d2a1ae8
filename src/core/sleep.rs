//! Timer futures built on `call_later`.
//!
//! Whatever loop is handed in decides what a second means: on a real loop it is
//! wall-clock time, on a [`VirtualClockScheduler`](super::VirtualClockScheduler)
//! it passes only when the test advances the clock.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use futures::future::{select, Either};

use super::event_loop::{EventLoop, TimerHandle};
use super::SchedulerError;

#[derive(Default)]
struct SleepState {
    done: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

/// Future completing `delay` loop-seconds after it is first polled.
///
/// Dropping it before completion cancels the underlying timer.
pub struct Sleep {
    event_loop: Rc<dyn EventLoop>,
    delay: f64,
    state: Rc<SleepState>,
    handle: Option<TimerHandle>,
}

/// Sleep for `delay` seconds of `event_loop` time.
pub fn sleep(event_loop: &Rc<dyn EventLoop>, delay: f64) -> Sleep {
    Sleep {
        event_loop: Rc::clone(event_loop),
        delay,
        state: Rc::new(SleepState::default()),
        handle: None,
    }
}

/// Run `future`, failing with [`SchedulerError::Elapsed`] if it has not
/// finished `delay` seconds of `event_loop` time after the first poll.
pub fn timeout<F>(
    event_loop: &Rc<dyn EventLoop>,
    delay: f64,
    future: F,
) -> impl Future<Output = Result<F::Output, SchedulerError>>
where
    F: Future,
{
    let timer = sleep(event_loop, delay);
    async move {
        let future = std::pin::pin!(future);
        match select(future, timer).await {
            Either::Left((output, _timer)) => Ok(output),
            Either::Right((Ok(()), _)) => Err(SchedulerError::Elapsed),
            Either::Right((Err(e), _)) => Err(e),
        }
    }
}

impl Future for Sleep {
    type Output = Result<(), SchedulerError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.state.done.get() {
            return Poll::Ready(Ok(()));
        }
        *this.state.waker.borrow_mut() = Some(cx.waker().clone());

        if this.handle.is_none() {
            let state = Rc::clone(&this.state);
            let handle = this.event_loop.call_later(
                this.delay,
                Box::new(move || {
                    state.done.set(true);
                    if let Some(waker) = state.waker.borrow_mut().take() {
                        waker.wake();
                    }
                    Ok(())
                }),
            );
            match handle {
                Ok(handle) => this.handle = Some(handle),
                Err(e) => return Poll::Ready(Err(e)),
            }
        }
        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.cancel();
        }
    }
}
