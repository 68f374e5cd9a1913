use async_trait::async_trait;
use mcp_server::InvocationContext;
use mcp_server::InvocationError;
use mcp_server::PrimitiveCollection;
use mcp_server::ServerOptions;
use mcp_server::ToolDescriptor;
use mcp_server::ToolHandler;
use mcp_server::ToolOutcome;
use mcp_transport::InMemoryTransport;
use mcp_transport::ReadOutcome;
use mcp_transport::Transport;
use mcp_types::CallToolRequestParams;
use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCRequest;
use mcp_types::ListToolsRequestParams;
use mcp_types::RequestId;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

struct Echo;

#[async_trait]
impl ToolHandler for Echo {
    async fn call(
        &self,
        arguments: serde_json::Value,
        _ctx: InvocationContext,
    ) -> Result<ToolOutcome, InvocationError> {
        let text = arguments
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(ToolOutcome::Text(text))
    }
}

struct Throwy;

#[async_trait]
impl ToolHandler for Throwy {
    async fn call(
        &self,
        _arguments: serde_json::Value,
        _ctx: InvocationContext,
    ) -> Result<ToolOutcome, InvocationError> {
        Err("division by zero".into())
    }
}

fn request(id: i64, method: &str, params: serde_json::Value) -> JSONRPCMessage {
    JSONRPCMessage::Request(JSONRPCRequest {
        jsonrpc: "2.0".into(),
        id: RequestId::Integer(id),
        method: method.into(),
        params: Some(params),
    })
}

async fn server_with_tools() -> (Arc<mcp_server::McpServer>, InMemoryTransport) {
    let tools = Arc::new(PrimitiveCollection::new());
    tools.try_add(ToolDescriptor::new(
        "echo",
        serde_json::json!({
            "type": "object",
            "properties": {"text": {"type": "string"}},
            "required": ["text"],
        }),
        Arc::new(Echo),
    ));
    tools.try_add(ToolDescriptor::new(
        "throwy",
        serde_json::json!({"type": "object"}),
        Arc::new(Throwy),
    ));
    let (server_transport, client_transport) = InMemoryTransport::pair();
    let server = ServerOptions {
        tools,
        ..Default::default()
    }
    .build(Arc::new(server_transport))
    .await
    .unwrap();
    (server, client_transport)
}

#[tokio::test]
async fn tools_list_reflects_registered_tools_in_insertion_order() {
    let (server, client_transport) = server_with_tools().await;
    let run_handle = tokio::spawn(Arc::clone(&server).serve());

    client_transport
        .write(request(
            1,
            "tools/list",
            serde_json::to_value(ListToolsRequestParams { cursor: None }).unwrap(),
        ))
        .await
        .unwrap();
    match client_transport.read_next().await.unwrap() {
        ReadOutcome::Message(JSONRPCMessage::Response(response)) => {
            let names: Vec<&str> = response.result["tools"]
                .as_array()
                .unwrap()
                .iter()
                .map(|t| t["name"].as_str().unwrap())
                .collect();
            assert_eq!(names, vec!["echo", "throwy"]);
        }
        other => panic!("expected a response, got {other:?}"),
    }

    client_transport.close().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle).await;
}

#[tokio::test]
async fn successful_tool_call_returns_its_text_outcome() {
    let (server, client_transport) = server_with_tools().await;
    let run_handle = tokio::spawn(Arc::clone(&server).serve());

    client_transport
        .write(request(
            1,
            "tools/call",
            serde_json::to_value(CallToolRequestParams {
                name: "echo".into(),
                arguments: Some(serde_json::json!({"text": "hello"})),
            })
            .unwrap(),
        ))
        .await
        .unwrap();
    match client_transport.read_next().await.unwrap() {
        ReadOutcome::Message(JSONRPCMessage::Response(response)) => {
            assert_eq!(response.result["isError"], serde_json::Value::Null);
            assert_eq!(response.result["content"][0]["text"], "hello");
        }
        other => panic!("expected a response, got {other:?}"),
    }

    client_transport.close().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle).await;
}

#[tokio::test]
async fn a_failing_tool_is_reported_as_iserror_not_a_protocol_error() {
    let (server, client_transport) = server_with_tools().await;
    let run_handle = tokio::spawn(Arc::clone(&server).serve());

    client_transport
        .write(request(
            1,
            "tools/call",
            serde_json::to_value(CallToolRequestParams {
                name: "throwy".into(),
                arguments: None,
            })
            .unwrap(),
        ))
        .await
        .unwrap();
    match client_transport.read_next().await.unwrap() {
        ReadOutcome::Message(JSONRPCMessage::Response(response)) => {
            assert_eq!(response.result["isError"], true);
            let text = response.result["content"][0]["text"].as_str().unwrap();
            assert!(text.contains("throwy"));
            assert!(!text.contains("division by zero"));
        }
        other => panic!("expected a response, got {other:?}"),
    }

    client_transport.close().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle).await;
}

#[tokio::test]
async fn calling_a_tool_without_a_required_argument_is_invalid_params() {
    let (server, client_transport) = server_with_tools().await;
    let run_handle = tokio::spawn(Arc::clone(&server).serve());

    client_transport
        .write(request(
            1,
            "tools/call",
            serde_json::to_value(CallToolRequestParams {
                name: "echo".into(),
                arguments: Some(serde_json::json!({})),
            })
            .unwrap(),
        ))
        .await
        .unwrap();
    match client_transport.read_next().await.unwrap() {
        ReadOutcome::Message(JSONRPCMessage::Error(error)) => {
            assert_eq!(error.error.code, mcp_types::INVALID_PARAMS_ERROR_CODE);
            assert!(error.error.message.contains("text"));
        }
        other => panic!("expected an error, got {other:?}"),
    }

    client_transport.close().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle).await;
}

#[tokio::test]
async fn calling_an_unknown_tool_is_a_protocol_level_error() {
    let (server, client_transport) = server_with_tools().await;
    let run_handle = tokio::spawn(Arc::clone(&server).serve());

    client_transport
        .write(request(
            1,
            "tools/call",
            serde_json::to_value(CallToolRequestParams {
                name: "nope".into(),
                arguments: None,
            })
            .unwrap(),
        ))
        .await
        .unwrap();
    match client_transport.read_next().await.unwrap() {
        ReadOutcome::Message(JSONRPCMessage::Error(error)) => {
            assert_eq!(error.error.code, mcp_types::METHOD_NOT_FOUND_ERROR_CODE);
        }
        other => panic!("expected an error, got {other:?}"),
    }

    client_transport.close().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle).await;
}
