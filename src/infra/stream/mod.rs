//! Duplex stream fixtures.
//!
//! [`BufferingTransport`] stands in for a socket: writes land in a buffer the
//! test inspects, and the test pushes inbound bytes with
//! [`inject_inbound`](BufferingTransport::inject_inbound).
//! [`BufferingProtocol`] is the matching peer that records what it receives.

pub mod protocol;
pub mod transport;

pub use protocol::{BufferingProtocol, Protocol};
pub use transport::{BufferingTransport, Transport};
