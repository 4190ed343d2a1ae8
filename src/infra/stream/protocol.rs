//! Read side of a duplex stream.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::{Bytes, BytesMut};

use super::transport::Transport;

/// Receiver of stream events.
pub trait Protocol {
    /// The transport is ready; the protocol may start writing.
    fn connection_made(&self, transport: Rc<dyn Transport>);

    /// Bytes arrived from the peer.
    fn data_received(&self, data: &[u8]);

    /// The connection is gone.
    fn connection_lost(&self) {}
}

/// Protocol that records inbound bytes and holds outbound bytes until a
/// transport is attached.
#[derive(Default)]
pub struct BufferingProtocol {
    received: RefCell<BytesMut>,
    to_transmit: RefCell<BytesMut>,
    transport: RefCell<Option<Rc<dyn Transport>>>,
}

impl BufferingProtocol {
    /// Protocol with no transport yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `data`, or hold it until `connection_made`.
    pub fn write(&self, data: &[u8]) {
        match self.transport() {
            Some(transport) => transport.write(data),
            None => self.to_transmit.borrow_mut().extend_from_slice(data),
        }
    }

    /// Everything received so far.
    pub fn received(&self) -> Bytes {
        Bytes::copy_from_slice(&self.received.borrow())
    }

    /// Bytes waiting for a transport.
    pub fn queued_len(&self) -> usize {
        self.to_transmit.borrow().len()
    }

    /// Current transport, if connected.
    pub fn transport(&self) -> Option<Rc<dyn Transport>> {
        self.transport.borrow().clone()
    }
}

impl Protocol for BufferingProtocol {
    fn connection_made(&self, transport: Rc<dyn Transport>) {
        let queued = self.to_transmit.borrow_mut().split().freeze();
        if !queued.is_empty() {
            transport.write(&queued);
        }
        *self.transport.borrow_mut() = Some(transport);
    }

    fn data_received(&self, data: &[u8]) {
        self.received.borrow_mut().extend_from_slice(data);
    }

    fn connection_lost(&self) {
        self.transport.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::stream::BufferingTransport;

    #[test]
    fn test_writes_before_connection_are_flushed_once() {
        let protocol = BufferingProtocol::new();
        protocol.write(b"early");
        assert_eq!(protocol.queued_len(), 5);

        let transport = Rc::new(BufferingTransport::new());
        protocol.connection_made(transport.clone());
        protocol.write(b"-late");
        assert_eq!(&transport.buffer()[..], b"early-late");
        assert_eq!(protocol.queued_len(), 0);
    }

    #[test]
    fn test_connection_lost_detaches() {
        let protocol = BufferingProtocol::new();
        protocol.connection_made(Rc::new(BufferingTransport::new()));
        protocol.connection_lost();
        assert!(protocol.transport().is_none());
        protocol.write(b"held");
        assert_eq!(protocol.queued_len(), 4);
    }
}
