//! The invocation adapter (C6, §4.6): turns a typed tool/prompt callable
//! into something the facade can expose over `tools/call`/`prompts/get`.
//! Rust's type system already does the "context parameters vs data
//! parameters" split this calls for in a reflection-based host: data
//! parameters are the single `arguments` JSON object every tool/prompt
//! callable receives, and context parameters (server handle, progress
//! reporter, cancellation, services) are fields on [`InvocationContext`]
//! rather than separate positional arguments.

use crate::context::InvocationContext;
use crate::handlers::HandlerError;
use crate::registry::Named;
use async_trait::async_trait;
use mcp_types::CallToolResult;
use mcp_types::ContentBlock;
use mcp_types::GetPromptResult;
use mcp_types::Prompt;
use mcp_types::PromptArgument;
use mcp_types::PromptMessage;
use mcp_types::Role;
use mcp_types::Tool;
use mcp_types::ToolAnnotations;
use std::collections::HashMap;
use std::sync::Arc;

pub type InvocationError = Box<dyn std::error::Error + Send + Sync>;

/// A registered tool's callable (§4.6). Any `Err` it returns is a
/// *tool-level* failure: the adapter reports it to the peer as a successful
/// response with `isError: true`, never as a JSON-RPC `Error` (that's
/// reserved for protocol-level problems like an unknown tool name).
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(
        &self,
        arguments: serde_json::Value,
        ctx: InvocationContext,
    ) -> Result<ToolOutcome, InvocationError>;
}

/// Every shape a tool callable may return, each mapped to `CallToolResult`
/// content per §4.6's table.
pub enum ToolOutcome {
    Empty,
    Text(String),
    Texts(Vec<String>),
    Content(ContentBlock),
    Contents(Vec<ContentBlock>),
    Result(CallToolResult),
    Json(serde_json::Value),
}

impl ToolOutcome {
    fn into_call_tool_result(self) -> CallToolResult {
        match self {
            ToolOutcome::Empty => CallToolResult::ok(Vec::new()),
            ToolOutcome::Text(text) => CallToolResult::ok(vec![ContentBlock::text(text)]),
            ToolOutcome::Texts(texts) => {
                CallToolResult::ok(texts.into_iter().map(ContentBlock::text).collect())
            }
            ToolOutcome::Content(block) => CallToolResult::ok(vec![block]),
            ToolOutcome::Contents(blocks) => CallToolResult::ok(blocks),
            ToolOutcome::Result(result) => result,
            ToolOutcome::Json(value) => {
                let text = serde_json::to_string(&value)
                    .unwrap_or_else(|_| value.to_string());
                CallToolResult::ok(vec![ContentBlock::text(text)])
            }
        }
    }
}

/// A tool's descriptor plus its callable (§3's "Tool / Prompt descriptor").
pub struct ToolDescriptor {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
    pub annotations: Option<ToolAnnotations>,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        input_schema: serde_json::Value,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            input_schema,
            annotations: None,
            handler,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    /// Checks `arguments` against `input_schema`'s `required` array (§4.6),
    /// so a missing required parameter fails at the protocol boundary with
    /// `InvalidParams` instead of reaching the callable, which would
    /// otherwise have to hand-validate or silently default it.
    pub fn validate_arguments(&self, arguments: &serde_json::Value) -> Result<(), HandlerError> {
        let Some(required) = self.input_schema.get("required").and_then(|v| v.as_array()) else {
            return Ok(());
        };
        for name in required {
            let Some(name) = name.as_str() else { continue };
            if arguments.get(name).is_none() {
                return Err(HandlerError::InvalidParams(format!(
                    "missing required argument '{name}' for tool '{}'",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// The wire-facing descriptor published by `tools/list` (§6). Only data
    /// parameters appear in `inputSchema`; context parameters are never
    /// reflected here (§4.6).
    pub fn as_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            annotations: self.annotations.clone(),
        }
    }

    /// Invokes the callable, mapping any failure to a tool-level
    /// `isError: true` result with a generic message (§4.6, §7). Failure
    /// details are logged but never reach the peer.
    pub async fn invoke(&self, arguments: serde_json::Value, ctx: InvocationContext) -> CallToolResult {
        match self.handler.call(arguments, ctx).await {
            Ok(outcome) => outcome.into_call_tool_result(),
            Err(err) => {
                tracing::error!(tool = %self.name, error = %err, "tool invocation failed");
                CallToolResult::error(format!("An error occurred invoking '{}'.", self.name))
            }
        }
    }
}

impl Named for ToolDescriptor {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A registered prompt's callable (§4.6). Unlike tools, a prompt failure has
/// no `isError` channel on the wire (`GetPromptResult` carries none), so it
/// is reported as an ordinary JSON-RPC `Error` (`InternalError`) at the
/// facade boundary.
#[async_trait]
pub trait PromptHandler: Send + Sync {
    async fn get(
        &self,
        arguments: HashMap<String, String>,
        ctx: InvocationContext,
    ) -> Result<PromptOutcome, InvocationError>;
}

pub enum PromptOutcome {
    Text(String),
    Message(PromptMessage),
    Messages(Vec<PromptMessage>),
    Result(GetPromptResult),
}

impl PromptOutcome {
    fn into_get_prompt_result(self) -> GetPromptResult {
        match self {
            PromptOutcome::Text(text) => GetPromptResult {
                description: None,
                messages: vec![PromptMessage {
                    role: Role::User,
                    content: ContentBlock::text(text),
                }],
            },
            PromptOutcome::Message(message) => GetPromptResult {
                description: None,
                messages: vec![message],
            },
            PromptOutcome::Messages(messages) => GetPromptResult {
                description: None,
                messages,
            },
            PromptOutcome::Result(result) => result,
        }
    }
}

pub struct PromptDescriptor {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub arguments: Option<Vec<PromptArgument>>,
    handler: Arc<dyn PromptHandler>,
}

impl PromptDescriptor {
    pub fn new(name: impl Into<String>, handler: Arc<dyn PromptHandler>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            arguments: None,
            handler,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<PromptArgument>) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn as_prompt(&self) -> Prompt {
        Prompt {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            arguments: self.arguments.clone(),
        }
    }

    pub async fn invoke(
        &self,
        arguments: HashMap<String, String>,
        ctx: InvocationContext,
    ) -> Result<GetPromptResult, HandlerError> {
        self.handler
            .get(arguments, ctx)
            .await
            .map(PromptOutcome::into_get_prompt_result)
            .map_err(|err| {
                tracing::error!(prompt = %self.name, error = %err, "prompt invocation failed");
                HandlerError::Internal(err.to_string())
            })
    }
}

impl Named for PromptDescriptor {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use mcp_transport::InMemoryTransport;
    use pretty_assertions::assert_eq;

    fn test_ctx() -> InvocationContext {
        let (transport, _peer) = InMemoryTransport::pair();
        InvocationContext::root(Session::new(Arc::new(transport)))
    }

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(
            &self,
            arguments: serde_json::Value,
            _ctx: InvocationContext,
        ) -> Result<ToolOutcome, InvocationError> {
            let i = arguments.get("i").and_then(|v| v.as_i64()).unwrap_or(0);
            Ok(ToolOutcome::Text(format!("Method4 Result {i}")))
        }
    }

    #[tokio::test]
    async fn tool_text_outcome_becomes_a_single_text_content() {
        let tool = ToolDescriptor::new(
            "Method4",
            serde_json::json!({"type": "object", "properties": {"i": {"type": "integer"}}, "required": ["i"]}),
            Arc::new(Echo),
        );
        let result = tool.invoke(serde_json::json!({"i": 42}), test_ctx()).await;
        assert_eq!(result.content, vec![ContentBlock::text("Method4 Result 42")]);
        assert_eq!(result.is_error, None);
    }

    struct Throwy;

    #[async_trait]
    impl ToolHandler for Throwy {
        async fn call(
            &self,
            _arguments: serde_json::Value,
            _ctx: InvocationContext,
        ) -> Result<ToolOutcome, InvocationError> {
            Err("boom".into())
        }
    }

    #[tokio::test]
    async fn tool_failure_becomes_is_error_with_a_generic_message() {
        let tool = ToolDescriptor::new("throwy", serde_json::json!({}), Arc::new(Throwy));
        let result = tool.invoke(serde_json::json!({}), test_ctx()).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            result.content,
            vec![ContentBlock::text("An error occurred invoking 'throwy'.")]
        );
    }

    #[tokio::test]
    async fn json_outcome_is_wrapped_in_a_single_text_block() {
        struct JsonTool;
        #[async_trait]
        impl ToolHandler for JsonTool {
            async fn call(
                &self,
                _arguments: serde_json::Value,
                _ctx: InvocationContext,
            ) -> Result<ToolOutcome, InvocationError> {
                Ok(ToolOutcome::Json(serde_json::json!({"ok": true})))
            }
        }
        let tool = ToolDescriptor::new("json", serde_json::json!({}), Arc::new(JsonTool));
        let result = tool.invoke(serde_json::json!({}), test_ctx()).await;
        assert_eq!(result.content.len(), 1);
    }
}
