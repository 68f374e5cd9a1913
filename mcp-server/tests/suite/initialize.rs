use mcp_server::Lifecycle;
use mcp_server::ServerOptions;
use mcp_transport::InMemoryTransport;
use mcp_transport::ReadOutcome;
use mcp_transport::Transport;
use mcp_types::ClientCapabilities;
use mcp_types::Implementation;
use mcp_types::INVALID_REQUEST_ERROR_CODE;
use mcp_types::InitializeRequestParams;
use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCRequest;
use mcp_types::RequestId;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn initialize_request(id: i64) -> JSONRPCMessage {
    let params = InitializeRequestParams {
        protocol_version: "2024-11-05".into(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "acme-client".into(),
            version: "1.0.0".into(),
            title: None,
        },
    };
    JSONRPCMessage::Request(JSONRPCRequest {
        jsonrpc: "2.0".into(),
        id: RequestId::Integer(id),
        method: "initialize".into(),
        params: Some(serde_json::to_value(params).unwrap()),
    })
}

#[tokio::test]
async fn handshake_negotiates_version_and_advances_lifecycle() {
    let (server_transport, client_transport) = InMemoryTransport::pair();
    let server = ServerOptions {
        server_info: Implementation {
            name: "demo-server".into(),
            version: "0.1.0".into(),
            title: None,
        },
        ..Default::default()
    }
    .build(Arc::new(server_transport))
    .await
    .expect("default options have no capability wiring to violate");

    let run_handle = tokio::spawn(Arc::clone(&server).serve());

    client_transport.write(initialize_request(1)).await.unwrap();
    match client_transport.read_next().await.unwrap() {
        ReadOutcome::Message(JSONRPCMessage::Response(response)) => {
            assert_eq!(response.id, RequestId::Integer(1));
            let protocol_version = response.result["protocolVersion"].as_str().unwrap();
            assert_eq!(protocol_version, "2024-11-05");
            assert_eq!(response.result["serverInfo"]["name"], "demo-server");
        }
        other => panic!("expected a response, got {other:?}"),
    }
    assert_eq!(server.lifecycle(), Lifecycle::Initialized);

    client_transport.write(initialize_request(2)).await.unwrap();
    match client_transport.read_next().await.unwrap() {
        ReadOutcome::Message(JSONRPCMessage::Error(error)) => {
            assert_eq!(error.error.code, INVALID_REQUEST_ERROR_CODE);
        }
        other => panic!("expected a second initialize to be rejected, got {other:?}"),
    }

    client_transport.close().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle).await;
}

#[tokio::test]
async fn unrecognized_protocol_version_falls_back_to_the_first_configured_one() {
    let (server_transport, client_transport) = InMemoryTransport::pair();
    let server = ServerOptions::default()
        .build(Arc::new(server_transport))
        .await
        .unwrap();
    let run_handle = tokio::spawn(Arc::clone(&server).serve());

    let params = InitializeRequestParams {
        protocol_version: "1999-01-01".into(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "acme-client".into(),
            version: "1.0.0".into(),
            title: None,
        },
    };
    client_transport
        .write(JSONRPCMessage::Request(JSONRPCRequest {
            jsonrpc: "2.0".into(),
            id: RequestId::Integer(1),
            method: "initialize".into(),
            params: Some(serde_json::to_value(params).unwrap()),
        }))
        .await
        .unwrap();

    match client_transport.read_next().await.unwrap() {
        ReadOutcome::Message(JSONRPCMessage::Response(response)) => {
            assert_eq!(
                response.result["protocolVersion"],
                mcp_types::DEFAULT_PROTOCOL_VERSION
            );
        }
        other => panic!("expected a response, got {other:?}"),
    }

    client_transport.close().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle).await;
}
