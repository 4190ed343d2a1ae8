//! Failures surfaced by event loops and the stream fixtures.

use thiserror::Error;

/// Every error a loop operation or `advance` can return.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Delay or advance delta was negative, NaN, or infinite.
    #[error("invalid delay: {0}")]
    InvalidDelay(f64),
    /// Absolute time was NaN or infinite, or lies in the past for `advance_to`.
    #[error("invalid time: {0}")]
    InvalidTime(f64),
    /// Pending queue reached its configured depth.
    #[error("queue full: {0}")]
    QueueFull(String),
    /// A single advance fired more callbacks than allowed.
    #[error("runaway advance: {fired} callbacks fired without reaching the target time")]
    RunawayAdvance {
        /// Callbacks fired before giving up.
        fired: usize,
    },
    /// A fired callback returned an error.
    #[error("callback failed: {0}")]
    Callback(#[source] anyhow::Error),
    /// The loop does not provide the requested capability.
    #[error("capability not supported: {0}")]
    Unsupported(&'static str),
    /// No event loop installed for the current thread.
    #[error("no current event loop")]
    NoEventLoop,
    /// Inbound data injected into a transport without a protocol.
    #[error("transport has no protocol attached")]
    NoProtocol,
    /// A timeout elapsed before the wrapped future finished.
    #[error("deadline elapsed")]
    Elapsed,
    /// Real loop or runtime failure, or a rejected configuration.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Return type of callback bodies; any error becomes `SchedulerError::Callback`.
pub type AppResult<T> = Result<T, anyhow::Error>;
