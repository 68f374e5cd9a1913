//! Wire types for the Model Context Protocol's JSON-RPC 2.0 surface (§3, §4.1,
//! §6): the tagged message envelope, content blocks, capability
//! records, and a typed Params/Result pair for every method the server core
//! dispatches. Transport and session behavior live in `mcp-transport` and
//! `mcp-server`; this crate only knows about shapes on the wire.

pub mod capabilities;
pub mod content;
pub mod error;
pub mod message;
pub mod methods;
pub mod request_id;

pub use capabilities::ClientCapabilities;
pub use capabilities::Implementation;
pub use capabilities::ListChangedCapability;
pub use capabilities::ResourcesCapability;
pub use capabilities::ServerCapabilities;
pub use content::AudioContent;
pub use content::ContentBlock;
pub use content::EmbeddedResource;
pub use content::ImageContent;
pub use content::ResourceContents;
pub use content::TextContent;
pub use error::INTERNAL_ERROR_CODE;
pub use error::INVALID_PARAMS_ERROR_CODE;
pub use error::INVALID_REQUEST_ERROR_CODE;
pub use error::METHOD_NOT_FOUND_ERROR_CODE;
pub use error::PARSE_ERROR_CODE;
pub use error::ProtocolError;
pub use message::JSONRPC_VERSION;
pub use message::JSONRPCError;
pub use message::JSONRPCErrorError;
pub use message::JSONRPCMessage;
pub use message::JSONRPCNotification;
pub use message::JSONRPCRequest;
pub use message::JSONRPCResponse;
pub use methods::*;
pub use request_id::RequestId;

/// Default protocol version this core negotiates when the client proposes
/// one it does not otherwise recognize (§6).
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
