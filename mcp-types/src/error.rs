use thiserror::Error;

/// Reserved JSON-RPC 2.0 error codes (§6). Application codes may
/// use any other negative value.
pub const PARSE_ERROR_CODE: i64 = -32700;
pub const INVALID_REQUEST_ERROR_CODE: i64 = -32600;
pub const METHOD_NOT_FOUND_ERROR_CODE: i64 = -32601;
pub const INVALID_PARAMS_ERROR_CODE: i64 = -32602;
pub const INTERNAL_ERROR_CODE: i64 = -32603;

/// Errors produced while decoding a message off the wire, or while
/// converting a generic [`crate::JSONRPCRequest`]/[`crate::JSONRPCNotification`]
/// into a typed [`crate::ClientRequest`]/[`crate::ServerNotification`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed JSON-RPC message: {0}")]
    ParseError(String),

    #[error("unknown method: {method}")]
    UnknownMethod { method: String },

    #[error("invalid params for {method}: {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ProtocolError {
    pub fn code(&self) -> i64 {
        match self {
            ProtocolError::ParseError(_) => PARSE_ERROR_CODE,
            ProtocolError::UnknownMethod { .. } => METHOD_NOT_FOUND_ERROR_CODE,
            ProtocolError::InvalidParams { .. } => INVALID_PARAMS_ERROR_CODE,
        }
    }
}
