//! The error taxonomy from spec §7 / SPEC_FULL §4.8.

use mcp_transport::TransportError;
use thiserror::Error;

/// Errors the session/facade produce locally (as distinct from protocol
/// errors, which are reported to the peer as JSON-RPC `Error` messages —
/// see [`crate::handlers::HandlerError`] — and tool/prompt invocation
/// errors, which are reported as successful responses with `isError: true`
/// — see `crate::invocation`).
#[derive(Debug, Error)]
pub enum SessionError {
    /// The facade was asked to advertise a capability without the handlers
    /// it requires, or to register two primitives under the same name.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("session is not connected")]
    NotConnected,

    /// A local caller's `SendRequest` was cancelled before a reply arrived.
    #[error("request was cancelled")]
    Cancelled,

    /// The session shut down while a `SendRequest`/`SendNotification` was
    /// outstanding.
    #[error("session has shut down")]
    ShuttingDown,

    /// An outbound `sampling`/`roots`/`elicitation` request was attempted
    /// without the client having advertised the corresponding capability.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
}
