//! Collaborator fixtures for tests driven by the virtual clock.

pub mod stream;

pub use stream::{BufferingProtocol, BufferingTransport, Protocol, Transport};
