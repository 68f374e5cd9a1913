use mcp_types::CallToolRequestParams;
use mcp_types::CallToolResult;
use mcp_types::ClientRequest;
use mcp_types::ContentBlock;
use mcp_types::Implementation;
use mcp_types::InitializeResult;
use mcp_types::JSONRPCError;
use mcp_types::JSONRPCErrorError;
use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCRequest;
use mcp_types::ListToolsResult;
use mcp_types::RequestId;
use mcp_types::ServerCapabilities;
use mcp_types::Tool;
use pretty_assertions::assert_eq;

#[test]
fn every_message_shape_round_trips() {
    let request = JSONRPCMessage::Request(JSONRPCRequest {
        jsonrpc: mcp_types::JSONRPC_VERSION.into(),
        id: RequestId::Integer(1),
        method: "tools/list".into(),
        params: None,
    });
    let error = JSONRPCMessage::Error(JSONRPCError {
        jsonrpc: mcp_types::JSONRPC_VERSION.into(),
        id: RequestId::String("x".into()),
        error: JSONRPCErrorError {
            code: mcp_types::METHOD_NOT_FOUND_ERROR_CODE,
            message: "nope".into(),
            data: None,
        },
    });

    for msg in [request, error] {
        let json = serde_json::to_string(&msg).unwrap();
        let back = JSONRPCMessage::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}

#[test]
fn call_tool_result_marshals_text_content() {
    let result = CallToolResult::ok(vec![ContentBlock::text("hi")]);
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["content"][0]["type"], "text");
    assert_eq!(value["content"][0]["text"], "hi");
    assert!(value.get("isError").is_none());
}

#[test]
fn call_tool_result_marshals_is_error_as_camel_case() {
    let result = CallToolResult::error("boom");
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["isError"], true);
    assert!(value.get("is_error").is_none());
}

#[test]
fn initialize_result_marshals_protocol_version_and_server_info_as_camel_case() {
    let result = InitializeResult {
        protocol_version: "2025-06-18".into(),
        capabilities: ServerCapabilities::default(),
        server_info: Implementation {
            name: "acme-server".into(),
            version: "0.1.0".into(),
            title: None,
        },
        instructions: None,
    };
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["protocolVersion"], "2025-06-18");
    assert_eq!(value["serverInfo"]["name"], "acme-server");
    assert!(value.get("protocol_version").is_none());
    assert!(value.get("server_info").is_none());
}

#[test]
fn list_tools_result_marshals_input_schema_and_next_cursor_as_camel_case() {
    let result = ListToolsResult {
        tools: vec![Tool {
            name: "echo".into(),
            title: None,
            description: None,
            input_schema: serde_json::json!({"type": "object"}),
            annotations: None,
        }],
        next_cursor: Some("page-2".into()),
    };
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["tools"][0]["inputSchema"], serde_json::json!({"type": "object"}));
    assert_eq!(value["nextCursor"], "page-2");
    assert!(value["tools"][0].get("input_schema").is_none());
    assert!(value.get("next_cursor").is_none());
}

#[test]
fn call_tool_request_round_trips_through_client_request() {
    let req = JSONRPCRequest {
        jsonrpc: "2.0".into(),
        id: RequestId::Integer(42),
        method: "tools/call".into(),
        params: Some(serde_json::json!({"name": "search", "arguments": {"q": "rust"}})),
    };
    let parsed = ClientRequest::try_from(req.clone()).unwrap();
    let ClientRequest::CallTool(CallToolRequestParams { name, arguments }) = parsed else {
        panic!("expected CallTool");
    };
    assert_eq!(name, "search");
    assert_eq!(arguments, Some(serde_json::json!({"q": "rust"})));
}
