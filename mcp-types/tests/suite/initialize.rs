use mcp_types::ClientCapabilities;
use mcp_types::ClientRequest;
use mcp_types::Implementation;
use mcp_types::InitializeRequestParams;
use mcp_types::JSONRPC_VERSION;
use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCRequest;
use mcp_types::RequestId;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn deserialize_initialize_request() {
    let raw = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "capabilities": {},
            "clientInfo": { "name": "acme-client", "title": "Acme", "version": "1.2.3" },
            "protocolVersion": "2025-06-18"
        }
    }"#;

    let msg = JSONRPCMessage::from_str(raw).expect("failed to deserialize JSONRPCMessage");

    let JSONRPCMessage::Request(json_req) = msg else {
        unreachable!()
    };

    let expected_req = JSONRPCRequest {
        jsonrpc: JSONRPC_VERSION.into(),
        id: RequestId::Integer(1),
        method: "initialize".into(),
        params: Some(json!({
            "capabilities": {},
            "clientInfo": { "name": "acme-client", "title": "Acme", "version": "1.2.3" },
            "protocolVersion": "2025-06-18"
        })),
    };

    assert_eq!(json_req, expected_req);

    let client_req: ClientRequest =
        ClientRequest::try_from(json_req).expect("conversion must succeed");
    let ClientRequest::Initialize(init_params) = client_req else {
        unreachable!()
    };

    assert_eq!(
        init_params,
        InitializeRequestParams {
            capabilities: ClientCapabilities {
                experimental: None,
                roots: None,
                sampling: None,
                elicitation: None,
            },
            client_info: Implementation {
                name: "acme-client".into(),
                title: Some("Acme".to_string()),
                version: "1.2.3".into(),
            },
            protocol_version: "2025-06-18".into(),
        }
    );
}

#[test]
fn rejects_a_second_initialize_is_a_session_concern_not_a_type_concern() {
    // mcp-types only classifies the message; enforcing "initialize may only
    // be accepted once" is the session's job (see mcp-server::facade tests).
    let raw = r#"{"jsonrpc":"2.0","id":2,"method":"initialize","params":{"capabilities":{},"clientInfo":{"name":"c","version":"0"},"protocolVersion":"2024-11-05"}}"#;
    let msg = JSONRPCMessage::from_str(raw).unwrap();
    assert!(matches!(msg, JSONRPCMessage::Request(_)));
}
