//! The framed-message transport interface (§4.2). A transport
//! is any bidirectional channel capable of producing and consuming whole
//! [`mcp_types::JSONRPCMessage`] values; concrete byte-level transports
//! (stdio pipes, HTTP+SSE, a subprocess's stdin/stdout) are out of scope for
//! this core and are expected to live in a downstream crate. This crate
//! supplies only the trait and an in-memory implementation used by
//! `mcp-server`'s own test suite.

mod in_memory;

pub use in_memory::InMemoryTransport;

use async_trait::async_trait;
use mcp_types::JSONRPCMessage;
use thiserror::Error;

/// Errors a [`Transport`] implementation may surface to the session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,
    #[error("failed to read from transport: {0}")]
    Read(String),
    #[error("failed to write to transport: {0}")]
    Write(String),
}

/// The result of [`Transport::read_next`]: either a message, a clean
/// end-of-stream, or an error. EOF is distinguished from an error so the
/// session can exit its run loop without logging a failure (§4.2).
#[derive(Debug)]
pub enum ReadOutcome {
    Message(JSONRPCMessage),
    Eof,
}

/// The asynchronous framed-message transport the session drives (§4.2).
///
/// `read_next` has a single-reader contract: the session never calls it
/// concurrently with itself. `write` may be called concurrently by many
/// session tasks; implementations must serialize their own writes so
/// messages land on the wire in write-completion order — the session does
/// not serialize on the caller's behalf.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn read_next(&self) -> Result<ReadOutcome, TransportError>;

    async fn write(&self, message: JSONRPCMessage) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;

    /// Idempotent: calling `close` more than once, or after EOF, is not an
    /// error.
    async fn close(&self) -> Result<(), TransportError>;
}
