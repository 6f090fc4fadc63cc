//! Serial transport seam.
//!
//! The hub does not own a serial device. It pulls received bytes and pushes
//! outgoing messages through [`Transport`], which the embedding application
//! implements over whatever link carries the GNSS output.

use std::collections::VecDeque;

/// A byte-oriented serial link.
pub trait Transport {
    /// Take the next received byte, if one is available right now.
    ///
    /// Must not block. `None` means nothing is pending at the moment.
    fn receive(&mut self) -> Option<u8>;

    /// Send a message back over the link.
    ///
    /// Line-oriented links terminate each message with CR LF.
    fn send(&mut self, data: &[u8]);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn receive(&mut self) -> Option<u8> {
        (**self).receive()
    }

    fn send(&mut self, data: &[u8]) {
        (**self).send(data)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn receive(&mut self) -> Option<u8> {
        (**self).receive()
    }

    fn send(&mut self, data: &[u8]) {
        (**self).send(data)
    }
}

/// An in-memory transport.
///
/// Received bytes are queued with [`push_rx`](Self::push_rx); sent messages
/// are kept in order for inspection.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    /// Bytes waiting to be received.
    rx: VecDeque<u8>,
    /// Messages sent, one entry per `send` call.
    sent: Vec<Vec<u8>>,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the hub to receive.
    pub fn push_rx(&mut self, data: &[u8]) {
        self.rx.extend(data);
    }

    /// Number of received bytes not yet consumed.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Messages sent so far.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Drain and return the messages sent so far.
    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.sent)
    }
}

impl Transport for MemoryTransport {
    fn receive(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn send(&mut self, data: &[u8]) {
        self.sent.push(data.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_transport_fifo() {
        let mut transport = MemoryTransport::new();
        transport.push_rx(b"ab");
        transport.push_rx(b"c");
        assert_eq!(transport.pending(), 3);
        assert_eq!(transport.receive(), Some(b'a'));
        assert_eq!(transport.receive(), Some(b'b'));
        assert_eq!(transport.receive(), Some(b'c'));
        assert_eq!(transport.receive(), None);
    }

    #[test]
    fn test_memory_transport_records_sends() {
        let mut transport = MemoryTransport::new();
        transport.send(b"one");
        transport.send(b"two");
        assert_eq!(transport.sent(), &[b"one".to_vec(), b"two".to_vec()]);
        assert_eq!(transport.take_sent().len(), 2);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_transport_through_mut_ref() {
        fn drain(mut transport: impl Transport) -> Vec<u8> {
            std::iter::from_fn(|| transport.receive()).collect()
        }

        let mut transport = MemoryTransport::new();
        transport.push_rx(b"xyz");
        assert_eq!(drain(&mut transport), b"xyz");
        assert_eq!(transport.pending(), 0);
    }
}
