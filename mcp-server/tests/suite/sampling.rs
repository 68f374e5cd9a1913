use mcp_server::SendRequestError;
use mcp_server::ServerOptions;
use mcp_server::SessionError;
use mcp_transport::InMemoryTransport;
use mcp_transport::ReadOutcome;
use mcp_transport::Transport;
use mcp_types::ClientCapabilities;
use mcp_types::CreateMessageRequestParams;
use mcp_types::Implementation;
use mcp_types::InitializeRequestParams;
use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCRequest;
use mcp_types::RequestId;
use mcp_types::Role;
use mcp_types::SamplingMessage;
use mcp_types::TextContent;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn sampling_params() -> CreateMessageRequestParams {
    CreateMessageRequestParams {
        messages: vec![SamplingMessage {
            role: Role::User,
            content: mcp_types::ContentBlock::Text(TextContent {
                text: "hi".into(),
                annotations: None,
            }),
        }],
        max_tokens: 16,
        system_prompt: None,
        temperature: None,
        stop_sequences: None,
        metadata: None,
        model_preferences: None,
    }
}

#[tokio::test]
async fn sampling_before_initialize_is_a_precondition_failure() {
    let (server_transport, _client_transport) = InMemoryTransport::pair();
    let server = ServerOptions::default()
        .build(Arc::new(server_transport))
        .await
        .unwrap();

    let result = server
        .request_sampling(sampling_params(), CancellationToken::new())
        .await;

    match result {
        Err(SendRequestError::Session(SessionError::PreconditionFailed(message))) => {
            assert!(message.contains("not yet initialized"));
        }
        other => panic!("expected a precondition failure, got {other:?}"),
    }
}

#[tokio::test]
async fn sampling_without_the_negotiated_capability_is_also_a_precondition_failure() {
    let (server_transport, client_transport) = InMemoryTransport::pair();
    let server = ServerOptions::default()
        .build(Arc::new(server_transport))
        .await
        .unwrap();
    let run_handle = tokio::spawn(Arc::clone(&server).serve());

    let params = InitializeRequestParams {
        protocol_version: "2024-11-05".into(),
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
        ReadOutcome::Message(JSONRPCMessage::Response(_)) => {}
        other => panic!("expected initialize to succeed, got {other:?}"),
    }

    let result = server
        .request_sampling(sampling_params(), CancellationToken::new())
        .await;
    match result {
        Err(SendRequestError::Session(SessionError::PreconditionFailed(message))) => {
            assert_eq!(message, "client did not advertise the 'sampling' capability");
        }
        other => panic!("expected a precondition failure, got {other:?}"),
    }

    client_transport.close().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle).await;
}
