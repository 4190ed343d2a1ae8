//! Real event loops and the per-thread current-loop slot.

pub mod current;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_loop;

pub use current::{clear_event_loop, get_event_loop, set_event_loop};
#[cfg(feature = "tokio-runtime")]
pub use tokio_loop::TokioLoop;
