//! `RequestContext<TParams>` and its pieces (§3): the transient record
//! passed to every inbound handler — the server handle, the request's
//! cancellation token, a progress reporter, and an optional scoped service
//! resolver.

use crate::session::Session;
use mcp_types::JSONRPC_VERSION;
use mcp_types::JSONRPCNotification;
use mcp_types::ModelContextProtocolNotification;
use mcp_types::ProgressNotification;
use mcp_types::ProgressNotificationParams;
use mcp_types::ProgressToken;
use std::ops::Deref;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A per-request lookup of host-supplied services, resolved by type name
/// rather than Rust's type system so it stays object-safe (§9: "the core
/// exposes a scoped service resolver per request context; no process-wide
/// resolver is required").
pub trait ServiceResolver: Send + Sync {
    fn resolve(&self, type_name: &str) -> Option<Arc<dyn std::any::Any + Send + Sync>>;
}

/// Forwards `notifications/progress` tagged with the caller's
/// `progressToken`, or does nothing if the caller supplied none (§3, §4.7).
#[derive(Clone)]
pub struct ProgressReporter {
    server: ServerHandle,
    token: Option<ProgressToken>,
}

impl ProgressReporter {
    pub(crate) fn new(server: ServerHandle, token: Option<ProgressToken>) -> Self {
        Self { server, token }
    }

    pub(crate) fn none(server: ServerHandle) -> Self {
        Self {
            server,
            token: None,
        }
    }

    pub async fn report(&self, progress: f64, total: Option<f64>, message: Option<String>) {
        let Some(token) = self.token.clone() else {
            return;
        };
        let params = ProgressNotificationParams {
            progress_token: token,
            progress,
            total,
            message,
        };
        let Ok(value) = serde_json::to_value(params) else {
            return;
        };
        let _ = self
            .server
            .send_notification(ProgressNotification::METHOD, Some(value))
            .await;
    }
}

/// Looks for MCP's conventional `_meta.progressToken` field inside a
/// request's raw params.
pub(crate) fn extract_progress_token(params: &serde_json::Value) -> Option<ProgressToken> {
    let token = params.get("_meta")?.get("progressToken")?;
    serde_json::from_value(token.clone()).ok()
}

/// A cheap, cloneable handle back into the owning [`Session`], given to
/// handlers so they can issue outbound requests/notifications (e.g. a tool
/// that itself triggers `sampling/createMessage`).
#[derive(Clone)]
pub struct ServerHandle(pub(crate) Arc<Session>);

impl ServerHandle {
    pub async fn send_notification(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), crate::error::SessionError> {
        self.0.send_notification(method, params).await
    }

    pub async fn send_request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
        cancellation: CancellationToken,
    ) -> Result<serde_json::Value, crate::session::SendRequestError> {
        self.0.send_request(method, params, cancellation).await
    }

    /// Raw JSON-RPC notification construction, used internally by helpers
    /// that already have a fully-formed params payload keyed under
    /// `JSONRPC_VERSION`.
    pub(crate) fn notification_envelope(
        method: &str,
        params: Option<serde_json::Value>,
    ) -> JSONRPCNotification {
        JSONRPCNotification {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
        }
    }
}

/// The untyped part of a request context, shared by every handler
/// regardless of its params type.
#[derive(Clone)]
pub struct InvocationContext {
    pub server: ServerHandle,
    pub progress: ProgressReporter,
    pub cancellation: CancellationToken,
    pub services: Option<Arc<dyn ServiceResolver>>,
}

impl InvocationContext {
    pub(crate) fn new(
        server: ServerHandle,
        progress_token: Option<ProgressToken>,
        cancellation: CancellationToken,
    ) -> Self {
        let progress = ProgressReporter::new(server.clone(), progress_token);
        Self {
            server,
            progress,
            cancellation,
            services: None,
        }
    }

    /// A context detached from any particular inbound request, for handlers
    /// the session invokes on its own behalf (and for tests).
    pub fn root(session: Arc<Session>) -> Self {
        let server = ServerHandle(session);
        Self {
            progress: ProgressReporter::none(server.clone()),
            cancellation: CancellationToken::new(),
            services: None,
            server,
        }
    }

    pub fn with_services(mut self, resolver: Arc<dyn ServiceResolver>) -> Self {
        self.services = Some(resolver);
        self
    }
}

/// A transient record passed to each inbound handler (§3): the deserialized
/// params plus everything in [`InvocationContext`].
pub struct RequestContext<P> {
    pub params: P,
    pub inner: InvocationContext,
}

impl<P> RequestContext<P> {
    pub fn new(params: P, inner: InvocationContext) -> Self {
        Self { params, inner }
    }
}

impl<P> Deref for RequestContext<P> {
    type Target = InvocationContext;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
