//! Typed Params/Result pairs for every method in the wire format table (§6),
//! plus the `ClientRequest`/`ServerOutboundRequest`/`Notification` tagged
//! unions used to convert a generic [`crate::JSONRPCRequest`] or
//! [`crate::JSONRPCNotification`] into a typed value once its method is
//! known.

use crate::JSONRPCError;
use crate::JSONRPCErrorError;
use crate::JSONRPCNotification;
use crate::JSONRPCRequest;
use crate::JSONRPCResponse;
use crate::RequestId;
use crate::capabilities::ClientCapabilities;
use crate::capabilities::Implementation;
use crate::capabilities::ServerCapabilities;
use crate::content::ContentBlock;
use crate::content::ResourceContents;
use crate::error::ProtocolError;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

pub type Cursor = String;

/// A type associated with a single JSON-RPC method: its wire name, its
/// `Params` shape, and its `Result` shape (§4.1's "method -> typed handler").
pub trait ModelContextProtocolRequest {
    const METHOD: &'static str;
    type Params: Serialize + for<'de> Deserialize<'de>;
    type Result: Serialize + for<'de> Deserialize<'de>;
}

pub trait ModelContextProtocolNotification {
    const METHOD: &'static str;
    type Params: Serialize + for<'de> Deserialize<'de>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyResult {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyParams {}

// ---------------------------------------------------------------------
// initialize
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequestParams {
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    pub client_info: Implementation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

pub struct InitializeRequest;
impl ModelContextProtocolRequest for InitializeRequest {
    const METHOD: &'static str = "initialize";
    type Params = InitializeRequestParams;
    type Result = InitializeResult;
}

// ---------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------

pub struct PingRequest;
impl ModelContextProtocolRequest for PingRequest {
    const METHOD: &'static str = "ping";
    type Params = EmptyParams;
    type Result = EmptyResult;
}

// ---------------------------------------------------------------------
// tools
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListToolsRequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

pub struct ListToolsRequest;
impl ModelContextProtocolRequest for ListToolsRequest {
    const METHOD: &'static str = "tools/list";
    type Params = ListToolsRequestParams;
    type Result = ListToolsResult;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolRequestParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    pub fn ok(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            is_error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(message)],
            is_error: Some(true),
        }
    }
}

pub struct CallToolRequest;
impl ModelContextProtocolRequest for CallToolRequest {
    const METHOD: &'static str = "tools/call";
    type Params = CallToolRequestParams;
    type Result = CallToolResult;
}

// ---------------------------------------------------------------------
// prompts
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<PromptArgument>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPromptsRequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPromptsResult {
    pub prompts: Vec<Prompt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

pub struct ListPromptsRequest;
impl ModelContextProtocolRequest for ListPromptsRequest {
    const METHOD: &'static str = "prompts/list";
    type Params = ListPromptsRequestParams;
    type Result = ListPromptsResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: ContentBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPromptRequestParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPromptResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

pub struct GetPromptRequest;
impl ModelContextProtocolRequest for GetPromptRequest {
    const METHOD: &'static str = "prompts/get";
    type Params = GetPromptRequestParams;
    type Result = GetPromptResult;
}

// ---------------------------------------------------------------------
// resources
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub uri: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResourcesRequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesResult {
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

pub struct ListResourcesRequest;
impl ModelContextProtocolRequest for ListResourcesRequest {
    const METHOD: &'static str = "resources/list";
    type Params = ListResourcesRequestParams;
    type Result = ListResourcesResult;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    pub uri_template: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResourceTemplatesRequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourceTemplatesResult {
    pub resource_templates: Vec<ResourceTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

pub struct ListResourceTemplatesRequest;
impl ModelContextProtocolRequest for ListResourceTemplatesRequest {
    const METHOD: &'static str = "resources/templates/list";
    type Params = ListResourceTemplatesRequestParams;
    type Result = ListResourceTemplatesResult;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResourceRequestParams {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
}

pub struct ReadResourceRequest;
impl ModelContextProtocolRequest for ReadResourceRequest {
    const METHOD: &'static str = "resources/read";
    type Params = ReadResourceRequestParams;
    type Result = ReadResourceResult;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeRequestParams {
    pub uri: String,
}

pub struct SubscribeRequest;
impl ModelContextProtocolRequest for SubscribeRequest {
    const METHOD: &'static str = "resources/subscribe";
    type Params = SubscribeRequestParams;
    type Result = EmptyResult;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsubscribeRequestParams {
    pub uri: String,
}

pub struct UnsubscribeRequest;
impl ModelContextProtocolRequest for UnsubscribeRequest {
    const METHOD: &'static str = "resources/unsubscribe";
    type Params = UnsubscribeRequestParams;
    type Result = EmptyResult;
}

// ---------------------------------------------------------------------
// completion/complete
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteRequestParams {
    #[serde(rename = "ref")]
    pub reference: serde_json::Value,
    pub argument: CompleteArgument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteArgument {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionInfo {
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteResult {
    pub completion: CompletionInfo,
}

pub struct CompleteRequest;
impl ModelContextProtocolRequest for CompleteRequest {
    const METHOD: &'static str = "completion/complete";
    type Params = CompleteRequestParams;
    type Result = CompleteResult;
}

// ---------------------------------------------------------------------
// logging/setLevel
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLevelRequestParams {
    pub level: LoggingLevel,
}

pub struct SetLevelRequest;
impl ModelContextProtocolRequest for SetLevelRequest {
    const METHOD: &'static str = "logging/setLevel";
    type Params = SetLevelRequestParams;
    type Result = EmptyResult;
}

// ---------------------------------------------------------------------
// Outbound-from-server requests: sampling/createMessage, roots/list,
// elicitation/create
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingMessage {
    pub role: Role,
    pub content: ContentBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequestParams {
    pub messages: Vec<SamplingMessage>,
    pub max_tokens: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_preferences: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageResult {
    pub role: Role,
    pub content: ContentBlock,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

pub struct CreateMessageRequest;
impl ModelContextProtocolRequest for CreateMessageRequest {
    const METHOD: &'static str = "sampling/createMessage";
    type Params = CreateMessageRequestParams;
    type Result = CreateMessageResult;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRootsResult {
    pub roots: Vec<Root>,
}

pub struct ListRootsRequest;
impl ModelContextProtocolRequest for ListRootsRequest {
    const METHOD: &'static str = "roots/list";
    type Params = EmptyParams;
    type Result = ListRootsResult;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElicitCreateRequestParams {
    pub message: String,
    pub requested_schema: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElicitAction {
    Accept,
    Decline,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElicitCreateResult {
    pub action: ElicitAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

pub struct ElicitCreateRequest;
impl ModelContextProtocolRequest for ElicitCreateRequest {
    const METHOD: &'static str = "elicitation/create";
    type Params = ElicitCreateRequestParams;
    type Result = ElicitCreateResult;
}

// ---------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressToken {
    Integer(i64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledNotificationParams {
    pub request_id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub struct CancelledNotification;
impl ModelContextProtocolNotification for CancelledNotification {
    const METHOD: &'static str = "notifications/cancelled";
    type Params = CancelledNotificationParams;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNotificationParams {
    pub progress_token: ProgressToken,
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub struct ProgressNotification;
impl ModelContextProtocolNotification for ProgressNotification {
    const METHOD: &'static str = "notifications/progress";
    type Params = ProgressNotificationParams;
}

pub struct InitializedNotification;
impl ModelContextProtocolNotification for InitializedNotification {
    const METHOD: &'static str = "notifications/initialized";
    type Params = EmptyParams;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingMessageNotificationParams {
    pub level: LoggingLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    pub data: serde_json::Value,
}

pub struct LoggingMessageNotification;
impl ModelContextProtocolNotification for LoggingMessageNotification {
    const METHOD: &'static str = "notifications/message";
    type Params = LoggingMessageNotificationParams;
}

pub struct ToolListChangedNotification;
impl ModelContextProtocolNotification for ToolListChangedNotification {
    const METHOD: &'static str = "notifications/tools/list_changed";
    type Params = EmptyParams;
}

pub struct PromptListChangedNotification;
impl ModelContextProtocolNotification for PromptListChangedNotification {
    const METHOD: &'static str = "notifications/prompts/list_changed";
    type Params = EmptyParams;
}

pub struct ResourceListChangedNotification;
impl ModelContextProtocolNotification for ResourceListChangedNotification {
    const METHOD: &'static str = "notifications/resources/list_changed";
    type Params = EmptyParams;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUpdatedNotificationParams {
    pub uri: String,
}

pub struct ResourceUpdatedNotification;
impl ModelContextProtocolNotification for ResourceUpdatedNotification {
    const METHOD: &'static str = "notifications/resources/updated";
    type Params = ResourceUpdatedNotificationParams;
}

// ---------------------------------------------------------------------
// ClientRequest: every method inbound to the server (§6 table).
// ---------------------------------------------------------------------

macro_rules! client_request_enum {
    ($( $variant:ident($params:ty) => $method:expr ),+ $(,)?) => {
        /// A JSON-RPC request inbound to the server, already classified by
        /// method and with its `params` decoded to the matching typed
        /// shape.
        #[derive(Debug, Clone, PartialEq)]
        pub enum ClientRequest {
            $( $variant($params) ),+
        }

        impl ClientRequest {
            pub fn method(&self) -> &'static str {
                match self {
                    $( ClientRequest::$variant(_) => $method ),+
                }
            }
        }

        impl TryFrom<JSONRPCRequest> for ClientRequest {
            type Error = ProtocolError;

            fn try_from(request: JSONRPCRequest) -> Result<Self, Self::Error> {
                let params = request.params.unwrap_or(serde_json::Value::Null);
                match request.method.as_str() {
                    $(
                        $method => {
                            let parsed: $params = if params.is_null() {
                                serde_json::from_value(serde_json::json!({}))
                            } else {
                                serde_json::from_value(params)
                            }
                            .map_err(|source| ProtocolError::InvalidParams {
                                method: request.method.clone(),
                                source,
                            })?;
                            Ok(ClientRequest::$variant(parsed))
                        }
                    )+
                    other => Err(ProtocolError::UnknownMethod {
                        method: other.to_string(),
                    }),
                }
            }
        }
    };
}

client_request_enum! {
    Initialize(InitializeRequestParams) => InitializeRequest::METHOD,
    Ping(EmptyParams) => PingRequest::METHOD,
    ListTools(ListToolsRequestParams) => ListToolsRequest::METHOD,
    CallTool(CallToolRequestParams) => CallToolRequest::METHOD,
    ListPrompts(ListPromptsRequestParams) => ListPromptsRequest::METHOD,
    GetPrompt(GetPromptRequestParams) => GetPromptRequest::METHOD,
    ListResources(ListResourcesRequestParams) => ListResourcesRequest::METHOD,
    ReadResource(ReadResourceRequestParams) => ReadResourceRequest::METHOD,
    ListResourceTemplates(ListResourceTemplatesRequestParams) => ListResourceTemplatesRequest::METHOD,
    Subscribe(SubscribeRequestParams) => SubscribeRequest::METHOD,
    Unsubscribe(UnsubscribeRequestParams) => UnsubscribeRequest::METHOD,
    Complete(CompleteRequestParams) => CompleteRequest::METHOD,
    SetLevel(SetLevelRequestParams) => SetLevelRequest::METHOD,
}

// ---------------------------------------------------------------------
// Notification: either direction, classified by method.
// ---------------------------------------------------------------------

macro_rules! notification_enum {
    ($( $variant:ident($params:ty) => $method:expr ),+ $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Notification {
            $( $variant($params) ),+
        }

        impl Notification {
            pub fn method(&self) -> &'static str {
                match self {
                    $( Notification::$variant(_) => $method ),+
                }
            }

            pub fn params_value(&self) -> Option<serde_json::Value> {
                let value = match self {
                    $( Notification::$variant(p) => serde_json::to_value(p) ),+
                }
                .ok()?;
                if value == serde_json::json!({}) {
                    None
                } else {
                    Some(value)
                }
            }
        }

        impl TryFrom<JSONRPCNotification> for Notification {
            type Error = ProtocolError;

            fn try_from(notification: JSONRPCNotification) -> Result<Self, Self::Error> {
                let params = notification.params.unwrap_or(serde_json::Value::Null);
                match notification.method.as_str() {
                    $(
                        $method => {
                            let parsed: $params = if params.is_null() {
                                serde_json::from_value(serde_json::json!({}))
                            } else {
                                serde_json::from_value(params)
                            }
                            .map_err(|source| ProtocolError::InvalidParams {
                                method: notification.method.clone(),
                                source,
                            })?;
                            Ok(Notification::$variant(parsed))
                        }
                    )+
                    other => Err(ProtocolError::UnknownMethod {
                        method: other.to_string(),
                    }),
                }
            }
        }
    };
}

notification_enum! {
    Initialized(EmptyParams) => InitializedNotification::METHOD,
    Cancelled(CancelledNotificationParams) => CancelledNotification::METHOD,
    Progress(ProgressNotificationParams) => ProgressNotification::METHOD,
    Message(LoggingMessageNotificationParams) => LoggingMessageNotification::METHOD,
    ToolListChanged(EmptyParams) => ToolListChangedNotification::METHOD,
    PromptListChanged(EmptyParams) => PromptListChangedNotification::METHOD,
    ResourceListChanged(EmptyParams) => ResourceListChangedNotification::METHOD,
    ResourceUpdated(ResourceUpdatedNotificationParams) => ResourceUpdatedNotification::METHOD,
}

/// Build a response envelope for a typed request/result pair.
pub fn into_response<T: ModelContextProtocolRequest>(
    id: RequestId,
    result: T::Result,
) -> Result<JSONRPCResponse, serde_json::Error> {
    Ok(JSONRPCResponse {
        jsonrpc: crate::message::JSONRPC_VERSION.to_string(),
        id,
        result: serde_json::to_value(result)?,
    })
}

pub fn error_response(id: RequestId, code: i64, message: impl Into<String>) -> JSONRPCError {
    JSONRPCError {
        jsonrpc: crate::message::JSONRPC_VERSION.to_string(),
        id,
        error: JSONRPCErrorError {
            code,
            message: message.into(),
            data: None,
        },
    }
}
