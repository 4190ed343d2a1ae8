//! Write side of a duplex stream.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bytes::{Bytes, BytesMut};

use super::protocol::Protocol;
use crate::core::SchedulerError;

/// Byte transport a [`Protocol`] writes to.
pub trait Transport {
    /// Queue `data` for sending.
    fn write(&self, data: &[u8]);

    /// Half-close the write side.
    fn write_eof(&self);

    /// Whether [`write_eof`](Self::write_eof) is supported.
    fn can_write_eof(&self) -> bool;

    /// Close immediately, discarding nothing already written.
    fn abort(&self);

    /// Close gracefully.
    fn close(&self);

    /// Whether inbound data is being delivered.
    fn is_reading(&self) -> bool;

    /// Stop delivering inbound data.
    fn pause_reading(&self);

    /// Resume delivering inbound data.
    fn resume_reading(&self);

    /// Flow-control watermarks for the write buffer.
    fn set_write_buffer_limits(&self, high: Option<usize>, low: Option<usize>);

    /// Bytes written but not yet sent.
    fn get_write_buffer_size(&self) -> usize;
}

/// Transport that keeps every written byte and never sends anything.
#[derive(Default)]
pub struct BufferingTransport {
    buffer: RefCell<BytesMut>,
    eof: Cell<bool>,
    aborted: Cell<bool>,
    closed: Cell<bool>,
    protocol: RefCell<Option<Rc<dyn Protocol>>>,
}

impl BufferingTransport {
    /// Empty transport with no protocol attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the protocol that receives injected data.
    pub fn set_protocol(&self, protocol: Rc<dyn Protocol>) {
        *self.protocol.borrow_mut() = Some(protocol);
    }

    /// Attached protocol, if any.
    pub fn protocol(&self) -> Option<Rc<dyn Protocol>> {
        self.protocol.borrow().clone()
    }

    /// Deliver `data` to the attached protocol as if it arrived from the peer.
    ///
    /// # Errors
    ///
    /// `NoProtocol` when nothing is attached.
    pub fn inject_inbound(&self, data: &[u8]) -> Result<(), SchedulerError> {
        // The protocol may write back into this transport.
        let protocol = self.protocol().ok_or(SchedulerError::NoProtocol)?;
        protocol.data_received(data);
        Ok(())
    }

    /// Everything written so far.
    pub fn buffer(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buffer.borrow())
    }

    /// Whether `write_eof` was called.
    pub fn eof_written(&self) -> bool {
        self.eof.get()
    }

    /// Whether `abort` was called.
    pub fn aborted(&self) -> bool {
        self.aborted.get()
    }

    /// Whether `close` was called.
    pub fn closed(&self) -> bool {
        self.closed.get()
    }
}

impl Transport for BufferingTransport {
    fn write(&self, data: &[u8]) {
        self.buffer.borrow_mut().extend_from_slice(data);
    }

    fn write_eof(&self) {
        self.eof.set(true);
    }

    fn can_write_eof(&self) -> bool {
        true
    }

    fn abort(&self) {
        self.aborted.set(true);
    }

    fn close(&self) {
        self.closed.set(true);
    }

    fn is_reading(&self) -> bool {
        true
    }

    fn pause_reading(&self) {}

    fn resume_reading(&self) {}

    fn set_write_buffer_limits(&self, _high: Option<usize>, _low: Option<usize>) {}

    fn get_write_buffer_size(&self) -> usize {
        self.buffer.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_accumulate() {
        let transport = BufferingTransport::new();
        transport.write(b"he");
        transport.write(b"llo");
        assert_eq!(&transport.buffer()[..], b"hello");
        assert_eq!(transport.get_write_buffer_size(), 5);
    }

    #[test]
    fn test_flags() {
        let transport = BufferingTransport::new();
        assert!(!transport.eof_written());
        transport.write_eof();
        transport.abort();
        transport.close();
        assert!(transport.eof_written());
        assert!(transport.aborted());
        assert!(transport.closed());
        assert!(transport.can_write_eof());
        assert!(transport.is_reading());
    }

    #[test]
    fn test_inject_without_protocol() {
        let transport = BufferingTransport::new();
        assert!(matches!(
            transport.inject_inbound(b"x"),
            Err(SchedulerError::NoProtocol)
        ));
    }
}
