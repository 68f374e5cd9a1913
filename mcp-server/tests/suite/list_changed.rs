use mcp_server::PrimitiveCollection;
use mcp_server::ServerOptions;
use mcp_server::ToolDescriptor;
use mcp_transport::InMemoryTransport;
use mcp_transport::ReadOutcome;
use mcp_transport::Transport;
use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCNotification;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

async fn make_tool_eventually(tools: &Arc<PrimitiveCollection<ToolDescriptor>>, name: &str) {
    use async_trait::async_trait;
    use mcp_server::InvocationContext;
    use mcp_server::InvocationError;
    use mcp_server::ToolHandler;
    use mcp_server::ToolOutcome;

    struct Noop;
    #[async_trait]
    impl ToolHandler for Noop {
        async fn call(
            &self,
            _arguments: serde_json::Value,
            _ctx: InvocationContext,
        ) -> Result<ToolOutcome, InvocationError> {
            Ok(ToolOutcome::Empty)
        }
    }
    tools.try_add(ToolDescriptor::new(name, serde_json::json!({}), Arc::new(Noop)));
}

#[tokio::test]
async fn list_changed_is_suppressed_until_the_client_announces_initialized() {
    let tools = Arc::new(PrimitiveCollection::new());
    let (server_transport, client_transport) = InMemoryTransport::pair();
    let server = ServerOptions {
        tools: Arc::clone(&tools),
        ..Default::default()
    }
    .build(Arc::new(server_transport))
    .await
    .unwrap();
    let run_handle = tokio::spawn(Arc::clone(&server).serve());

    make_tool_eventually(&tools, "early").await;
    let result = tokio::time::timeout(Duration::from_millis(50), client_transport.read_next()).await;
    assert!(
        result.is_err(),
        "expected no notification before notifications/initialized, got {result:?}"
    );

    client_transport
        .write(JSONRPCMessage::Notification(JSONRPCNotification {
            jsonrpc: "2.0".into(),
            method: "notifications/initialized".into(),
            params: None,
        }))
        .await
        .unwrap();
    // Give the session a moment to dispatch the notification before the
    // next mutation, since dispatch and the collection mutation below race
    // otherwise.
    tokio::time::sleep(Duration::from_millis(20)).await;

    make_tool_eventually(&tools, "late").await;
    match client_transport.read_next().await.unwrap() {
        ReadOutcome::Message(JSONRPCMessage::Notification(notification)) => {
            assert_eq!(notification.method, "notifications/tools/list_changed");
        }
        other => panic!("expected a list_changed notification, got {other:?}"),
    }

    client_transport.close().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle).await;
}
