//! The Session (C3, §4.3): correlates outbound requests with responses,
//! fans incoming messages out to request/notification dispatch, propagates
//! cancellation in both directions via `notifications/cancelled`, and tears
//! down in an orderly way. The run loop is a method on `Session` rather than
//! living inline against one fixed transport, so it composes with any
//! `Transport` implementation.

use crate::context::InvocationContext;
use crate::context::ServerHandle;
use crate::context::extract_progress_token;
use crate::error::SessionError;
use crate::handlers::NotificationHandlerTable;
use crate::handlers::RequestHandlerTable;
use crate::id_gen::RequestIdGenerator;
use crate::inflight::InflightInbound;
use crate::pending::PendingOutbound;
use crate::pending::PendingOutcome;
use mcp_types::CancelledNotification;
use mcp_types::CancelledNotificationParams;
use mcp_types::JSONRPC_VERSION;
use mcp_types::JSONRPCError;
use mcp_types::JSONRPCErrorError;
use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCNotification;
use mcp_types::JSONRPCRequest;
use mcp_types::JSONRPCResponse;
use mcp_types::METHOD_NOT_FOUND_ERROR_CODE;
use mcp_types::ModelContextProtocolNotification;
use mcp_types::RequestId;
use mcp_transport::Transport;
use mcp_transport::ReadOutcome;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::warn;

/// Error from [`Session::send_request`]: either the peer answered with a
/// JSON-RPC `Error` frame, or the request never got a reply for a local
/// reason (§4.3, §7).
#[derive(Debug, Error)]
pub enum SendRequestError {
    #[error("peer returned error {}: {}", .0.code, .0.message)]
    Peer(JSONRPCErrorError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct Session {
    transport: Arc<dyn Transport>,
    id_gen: RequestIdGenerator,
    pending: PendingOutbound,
    inflight: InflightInbound,
    requests: RequestHandlerTable,
    notifications: NotificationHandlerTable,
    shutdown: CancellationToken,
    connected: AtomicBool,
    /// Handles for tasks spawned by `run()` to dispatch one inbound message
    /// each; drained in `shut_down()` so no handler is still writing to the
    /// transport after it closes.
    tasks: Mutex<JoinSet<()>>,
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            id_gen: RequestIdGenerator::new(),
            pending: PendingOutbound::new(),
            inflight: InflightInbound::new(),
            requests: RequestHandlerTable::new(),
            notifications: NotificationHandlerTable::new(),
            shutdown: CancellationToken::new(),
            connected: AtomicBool::new(true),
            tasks: Mutex::new(JoinSet::new()),
        })
    }

    pub fn requests(&self) -> &RequestHandlerTable {
        &self.requests
    }

    pub fn notifications(&self) -> &NotificationHandlerTable {
        &self.notifications
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire) && self.transport.is_connected()
    }

    /// `SendRequest(req, ctx)` (§4.3). Stamps a fresh id, writes the
    /// request, then awaits either a reply, the caller's cancellation, or
    /// session shutdown. A `$/cancelled` is only emitted if the caller
    /// cancels *after* the write has completed; cancellation observed while
    /// the write itself is still in flight produces no notification.
    pub async fn send_request(
        self: &Arc<Self>,
        method: &str,
        params: Option<serde_json::Value>,
        cancellation: CancellationToken,
    ) -> Result<serde_json::Value, SendRequestError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected.into());
        }
        let id = self.id_gen.next();
        let rx = self.pending.insert(id.clone());
        let request = JSONRPCRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.clone(),
            method: method.to_string(),
            params,
        };

        let write_outcome = tokio::select! {
            result = self.transport.write(JSONRPCMessage::Request(request)) => Some(result),
            _ = cancellation.cancelled() => None,
        };
        match write_outcome {
            None => {
                self.pending.remove(&id);
                return Err(SessionError::Cancelled.into());
            }
            Some(Err(err)) => {
                self.pending.remove(&id);
                return Err(SessionError::Transport(err).into());
            }
            Some(Ok(())) => {}
        }
        debug!(method, id = ?id, "-> request");

        tokio::select! {
            outcome = rx => match outcome {
                Ok(PendingOutcome::Response(value)) => Ok(value),
                Ok(PendingOutcome::Error(error)) => Err(SendRequestError::Peer(error)),
                Ok(PendingOutcome::Cancelled) => Err(SessionError::Cancelled.into()),
                Ok(PendingOutcome::ShuttingDown) | Err(_) => Err(SessionError::ShuttingDown.into()),
            },
            _ = cancellation.cancelled() => {
                self.pending.remove(&id);
                let notif = JSONRPCNotification {
                    jsonrpc: JSONRPC_VERSION.to_string(),
                    method: CancelledNotification::METHOD.to_string(),
                    params: serde_json::to_value(CancelledNotificationParams {
                        request_id: id,
                        reason: None,
                    })
                    .ok(),
                };
                let _ = self.transport.write(JSONRPCMessage::Notification(notif)).await;
                Err(SessionError::Cancelled.into())
            }
            _ = self.shutdown.cancelled() => {
                self.pending.remove(&id);
                Err(SessionError::ShuttingDown.into())
            }
        }
    }

    /// `SendNotification(notif, ctx)` (§4.3). If `method` is
    /// `notifications/cancelled`, also completes the local Waiter for the
    /// referenced id, so a caller that cancels by sending this notification
    /// directly does not separately block on that id's response.
    pub async fn send_notification(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        if method == CancelledNotification::METHOD
            && let Some(parsed) = params
                .as_ref()
                .and_then(|p| serde_json::from_value::<CancelledNotificationParams>(p.clone()).ok())
        {
            self.pending
                .complete(&parsed.request_id, PendingOutcome::Cancelled);
        }
        let notif = ServerHandle::notification_envelope(method, params);
        self.transport
            .write(JSONRPCMessage::Notification(notif))
            .await
            .map_err(SessionError::from)
    }

    /// The driver loop (§4.3): reads one message at a time; for a Request,
    /// installs its InflightInbound entry *before* dispatch so an
    /// out-of-order `$/cancelled` can never race handler startup, then hands
    /// it to a fresh task so the reader is never blocked by handler
    /// execution.
    pub async fn run(self: Arc<Self>) {
        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            let read = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                read = self.transport.read_next() => read,
            };
            match read {
                Ok(ReadOutcome::Eof) => break,
                Ok(ReadOutcome::Message(JSONRPCMessage::Request(request))) => {
                    let entry = self.inflight.insert(request.id.clone());
                    let this = Arc::clone(&self);
                    self.tasks.lock().await.spawn(async move {
                        this.handle_request(request, entry).await;
                    });
                }
                Ok(ReadOutcome::Message(message)) => {
                    let this = Arc::clone(&self);
                    self.tasks.lock().await.spawn(async move {
                        this.dispatch_non_request(message).await;
                    });
                }
                Err(err) => {
                    error!(error = %err, "transport read failed; ending session");
                    break;
                }
            }
        }
        self.shut_down().await;
    }

    async fn handle_request(
        self: Arc<Self>,
        request: JSONRPCRequest,
        entry: crate::inflight::InflightEntry,
    ) {
        let JSONRPCRequest {
            id, method, params, ..
        } = request;
        debug!(%method, id = ?id, "<- request");

        let Some(handler) = self.requests.get(&method) else {
            self.inflight.take(&id);
            let _ = self
                .transport
                .write(JSONRPCMessage::Error(mcp_types::error_response(
                    id,
                    METHOD_NOT_FOUND_ERROR_CODE,
                    format!("unknown method '{method}'"),
                )))
                .await;
            return;
        };

        let raw_params = params.clone().unwrap_or(serde_json::json!({}));
        let progress_token = params.as_ref().and_then(extract_progress_token);
        let ctx = InvocationContext::new(
            ServerHandle(Arc::clone(&self)),
            progress_token,
            entry.token.clone(),
        );

        let outcome = handler.handle(raw_params, ctx).await;

        let peer_cancelled = self
            .inflight
            .take(&id)
            .map(|e| e.is_peer_cancelled())
            .unwrap_or(false);
        if peer_cancelled {
            debug!(id = ?id, "peer cancelled before completion; suppressing response");
            return;
        }

        let message = match outcome {
            Ok(result) => JSONRPCMessage::Response(JSONRPCResponse {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id,
                result,
            }),
            Err(err) => {
                warn!(%method, error = %err, "handler returned an error");
                JSONRPCMessage::Error(mcp_types::error_response(id, err.code(), err.message()))
            }
        };
        let _ = self.transport.write(message).await;
    }

    async fn dispatch_non_request(self: Arc<Self>, message: JSONRPCMessage) {
        match message {
            JSONRPCMessage::Notification(notification) => {
                self.handle_notification(notification).await;
            }
            JSONRPCMessage::Response(JSONRPCResponse { id, result, .. }) => {
                if !self.pending.complete(&id, PendingOutcome::Response(result)) {
                    warn!(id = ?id, "response for unknown or already-completed request id");
                }
            }
            JSONRPCMessage::Error(JSONRPCError { id, error, .. }) => {
                if !self.pending.complete(&id, PendingOutcome::Error(error)) {
                    warn!(id = ?id, "error for unknown or already-completed request id");
                }
            }
            JSONRPCMessage::Request(_) => unreachable!("requests are dispatched in `run`"),
        }
    }

    async fn handle_notification(self: Arc<Self>, notification: JSONRPCNotification) {
        if notification.method == CancelledNotification::METHOD {
            match notification
                .params
                .as_ref()
                .map(|p| serde_json::from_value::<CancelledNotificationParams>(p.clone()))
            {
                Some(Ok(parsed)) => {
                    if !self.inflight.cancel(&parsed.request_id) {
                        debug!(request_id = ?parsed.request_id, "cancelled notification for unknown or completed request");
                    }
                }
                _ => warn!("malformed notifications/cancelled payload; ignoring"),
            }
        }

        let ctx = InvocationContext::new(
            ServerHandle(Arc::clone(&self)),
            None,
            self.shutdown.clone(),
        );
        self.notifications
            .dispatch(
                &notification.method,
                notification.params.unwrap_or(serde_json::json!({})),
                ctx,
            )
            .await;
    }

    /// Orderly teardown (§4.3): stop reading, fail every outstanding
    /// Waiter, cancel every in-flight handler, join every dispatch task so
    /// none is still mid-write, then close the transport. After this,
    /// `send_request`/`send_notification` fail with
    /// [`SessionError::NotConnected`].
    pub async fn shut_down(&self) {
        self.shutdown.cancel();
        self.connected.store(false, Ordering::Release);
        self.pending.shut_down_all();
        self.inflight.cancel_all();
        let mut tasks = self.tasks.lock().await;
        while tasks.join_next().await.is_some() {}
        drop(tasks);
        let _ = self.transport.close().await;
    }
}
