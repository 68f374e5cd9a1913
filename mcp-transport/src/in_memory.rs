use crate::ReadOutcome;
use crate::Transport;
use crate::TransportError;
use async_trait::async_trait;
use mcp_types::JSONRPCMessage;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::sync::Mutex;
use tokio::sync::mpsc;

/// An in-process, channel-backed [`Transport`] used by `mcp-server`'s own
/// tests to drive a `Session` without a real byte-level transport. Two
/// instances returned by [`InMemoryTransport::pair`] are cross-wired: what
/// one side writes, the other reads.
pub struct InMemoryTransport {
    outgoing: mpsc::UnboundedSender<JSONRPCMessage>,
    incoming: Mutex<mpsc::UnboundedReceiver<JSONRPCMessage>>,
    connected: AtomicBool,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = Self {
            outgoing: a_tx,
            incoming: Mutex::new(a_rx),
            connected: AtomicBool::new(true),
        };
        let b = Self {
            outgoing: b_tx,
            incoming: Mutex::new(b_rx),
            connected: AtomicBool::new(true),
        };
        (a, b)
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn read_next(&self) -> Result<ReadOutcome, TransportError> {
        let mut incoming = self.incoming.lock().await;
        match incoming.recv().await {
            Some(message) => Ok(ReadOutcome::Message(message)),
            None => Ok(ReadOutcome::Eof),
        }
    }

    async fn write(&self, message: JSONRPCMessage) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.outgoing
            .send(message)
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire) && !self.outgoing.is_closed()
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }
}
