use crate::error::ProtocolError;
use crate::request_id::RequestId;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// A single field of a JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCErrorError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JSONRPCErrorError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// The tagged union of the four JSON-RPC message shapes (§3, §4.1). The
/// wire has no explicit tag field: shape is inferred by which of
/// `id`/`method`/`result`/`error` are present, per the rule in §4.1.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JSONRPCMessage {
    Request(JSONRPCRequest),
    Response(JSONRPCResponse),
    Error(JSONRPCError),
    Notification(JSONRPCNotification),
}

impl From<JSONRPCRequest> for JSONRPCMessage {
    fn from(value: JSONRPCRequest) -> Self {
        JSONRPCMessage::Request(value)
    }
}

impl From<JSONRPCResponse> for JSONRPCMessage {
    fn from(value: JSONRPCResponse) -> Self {
        JSONRPCMessage::Response(value)
    }
}

impl From<JSONRPCError> for JSONRPCMessage {
    fn from(value: JSONRPCError) -> Self {
        JSONRPCMessage::Error(value)
    }
}

impl From<JSONRPCNotification> for JSONRPCMessage {
    fn from(value: JSONRPCNotification) -> Self {
        JSONRPCMessage::Notification(value)
    }
}

impl<'de> Deserialize<'de> for JSONRPCMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        JSONRPCMessage::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl JSONRPCMessage {
    /// Shape detection per §4.1: `id`+`method` -> Request, `id`+`result` ->
    /// Response, `id`+`error` -> Error, `method` without `id` ->
    /// Notification. Anything else is a `ParseError`.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ProtocolError::ParseError("message must be a JSON object".into()))?;

        let has_id = obj.contains_key("id");
        let has_method = obj.contains_key("method");
        let has_result = obj.contains_key("result");
        let has_error = obj.contains_key("error");

        let shaped = if has_id && has_method {
            serde_json::from_value::<JSONRPCRequest>(value).map(JSONRPCMessage::Request)
        } else if has_id && has_result {
            serde_json::from_value::<JSONRPCResponse>(value).map(JSONRPCMessage::Response)
        } else if has_id && has_error {
            serde_json::from_value::<JSONRPCError>(value).map(JSONRPCMessage::Error)
        } else if has_method && !has_id {
            serde_json::from_value::<JSONRPCNotification>(value).map(JSONRPCMessage::Notification)
        } else {
            return Err(ProtocolError::ParseError(
                "message matches no known JSON-RPC shape".into(),
            ));
        };

        shaped.map_err(|e| ProtocolError::ParseError(e.to_string()))
    }

    pub fn from_str(s: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| ProtocolError::ParseError(e.to_string()))?;
        Self::from_value(value)
    }
}
