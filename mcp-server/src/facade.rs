//! The server facade (C7, §4.7): builds a [`Session`] from [`ServerOptions`],
//! installs the fixed protocol handler set, validates capability/handler
//! wiring at construction, and wires primitive-collection `Changed` events
//! to `list_changed` notifications.

use crate::context::InvocationContext;
use crate::context::ServerHandle;
use crate::context::ServiceResolver;
use crate::error::SessionError;
use crate::handlers::HandlerError;
use crate::handlers::typed_request_handler;
use crate::handlers::NotificationHandler;
use crate::invocation::PromptDescriptor;
use crate::invocation::ToolDescriptor;
use crate::registry::Change;
use crate::registry::PrimitiveCollection;
use crate::session::SendRequestError;
use crate::session::Session;
use async_trait::async_trait;
use mcp_transport::Transport;
use mcp_types::CallToolRequestParams;
use mcp_types::CallToolResult;
use mcp_types::ClientCapabilities;
use mcp_types::CompleteRequest;
use mcp_types::CompleteRequestParams;
use mcp_types::CompleteResult;
use mcp_types::CreateMessageRequest;
use mcp_types::CreateMessageRequestParams;
use mcp_types::CreateMessageResult;
use mcp_types::DEFAULT_PROTOCOL_VERSION;
use mcp_types::EmptyParams;
use mcp_types::EmptyResult;
use mcp_types::GetPromptRequestParams;
use mcp_types::GetPromptResult;
use mcp_types::Implementation;
use mcp_types::InitializeRequestParams;
use mcp_types::InitializeResult;
use mcp_types::InitializedNotification;
use mcp_types::ListPromptsRequestParams;
use mcp_types::ListPromptsResult;
use mcp_types::ListResourceTemplatesRequestParams;
use mcp_types::ListResourceTemplatesResult;
use mcp_types::ListResourcesRequestParams;
use mcp_types::ListResourcesResult;
use mcp_types::ListRootsRequest;
use mcp_types::ListRootsResult;
use mcp_types::ListToolsRequestParams;
use mcp_types::ListToolsResult;
use mcp_types::LoggingLevel;
use mcp_types::METHOD_NOT_FOUND_ERROR_CODE;
use mcp_types::ModelContextProtocolNotification;
use mcp_types::ModelContextProtocolRequest;
use mcp_types::PromptListChangedNotification;
use mcp_types::ReadResourceRequestParams;
use mcp_types::ReadResourceResult;
use mcp_types::ServerCapabilities;
use mcp_types::SetLevelRequestParams;
use mcp_types::SubscribeRequestParams;
use mcp_types::ToolListChangedNotification;
use mcp_types::UnsubscribeRequestParams;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

/// Reads the resource collection: `resources/list` and `resources/read`
/// (§4.7 bundles these as the minimal pair a `resources` capability needs).
#[async_trait]
pub trait ResourceReader: Send + Sync {
    async fn list(&self, cursor: Option<String>) -> Result<ListResourcesResult, HandlerError>;
    async fn read(&self, uri: &str) -> Result<ReadResourceResult, HandlerError>;
}

#[async_trait]
pub trait ResourceTemplateReader: Send + Sync {
    async fn list(
        &self,
        cursor: Option<String>,
    ) -> Result<ListResourceTemplatesResult, HandlerError>;
}

#[async_trait]
pub trait ResourceSubscriber: Send + Sync {
    async fn subscribe(&self, uri: &str) -> Result<(), HandlerError>;
    async fn unsubscribe(&self, uri: &str) -> Result<(), HandlerError>;
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, params: CompleteRequestParams) -> Result<CompleteResult, HandlerError>;
}

/// Produces a scoped [`ServiceResolver`] for each inbound request (§3's
/// "optional scoped service resolver").
pub trait ServiceResolverFactory: Send + Sync {
    fn create(&self) -> Arc<dyn ServiceResolver>;
}

/// The entire configuration surface of the facade (§4.10): everything a
/// consuming binary supplies to stand up a server over a given transport.
/// Config *loading* (files, env, flags) is explicitly out of scope; this is
/// just the in-memory shape.
pub struct ServerOptions {
    pub server_info: Implementation,
    pub capabilities: ServerCapabilities,
    pub protocol_versions: Vec<String>,
    pub instructions: Option<String>,
    pub tools: Arc<PrimitiveCollection<ToolDescriptor>>,
    pub prompts: Arc<PrimitiveCollection<PromptDescriptor>>,
    pub resources: Option<Arc<dyn ResourceReader>>,
    pub resource_templates: Option<Arc<dyn ResourceTemplateReader>>,
    pub resource_subscriptions: Option<Arc<dyn ResourceSubscriber>>,
    pub completion: Option<Arc<dyn CompletionProvider>>,
    pub services: Option<Arc<dyn ServiceResolverFactory>>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            server_info: Implementation::default(),
            capabilities: ServerCapabilities::default(),
            protocol_versions: vec![DEFAULT_PROTOCOL_VERSION.to_string()],
            instructions: None,
            tools: Arc::new(PrimitiveCollection::new()),
            prompts: Arc::new(PrimitiveCollection::new()),
            resources: None,
            resource_templates: None,
            resource_subscriptions: None,
            completion: None,
            services: None,
        }
    }
}

impl ServerOptions {
    /// Validates the wiring rules of §4.7 and, if they hold, builds the
    /// [`Session`], installs every fixed handler, and wires list-changed
    /// notifications.
    pub async fn build(self, transport: Arc<dyn Transport>) -> Result<Arc<McpServer>, SessionError> {
        if let Some(resources) = &self.capabilities.resources {
            if self.resources.is_none() && self.resource_templates.is_none() {
                return Err(SessionError::Configuration(
                    "resources capability declared without a listResources/readResource or listResourceTemplates handler".into(),
                ));
            }
            if resources.subscribe == Some(true) && self.resource_subscriptions.is_none() {
                return Err(SessionError::Configuration(
                    "resources.subscribe capability declared without subscribe/unsubscribe handlers".into(),
                ));
            }
        }

        let session = Session::new(transport);
        let server = Arc::new(McpServer {
            session: Arc::clone(&session),
            server_info: self.server_info,
            capabilities: self.capabilities,
            protocol_versions: self.protocol_versions,
            instructions: self.instructions,
            tools: self.tools,
            prompts: self.prompts,
            resources: self.resources,
            resource_templates: self.resource_templates,
            resource_subscriptions: self.resource_subscriptions,
            completion: self.completion,
            services: self.services,
            client: OnceLock::new(),
            lifecycle: AtomicU8::new(Lifecycle::New as u8),
            ready_for_notifications: AtomicBool::new(false),
            log_level: std::sync::Mutex::new(None),
        });

        server.install_handlers().await;
        server.wire_list_changed();
        Ok(server)
    }
}

/// The server lifecycle (§3): New → Running → Initialized → Closing →
/// Closed. `Closing`/`Closed` mirror the session's own teardown, driven from
/// [`McpServer::serve`] rather than tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    New = 0,
    Running = 1,
    Initialized = 2,
    Closing = 3,
    Closed = 4,
}

impl From<u8> for Lifecycle {
    fn from(value: u8) -> Self {
        match value {
            0 => Lifecycle::New,
            1 => Lifecycle::Running,
            2 => Lifecycle::Initialized,
            3 => Lifecycle::Closing,
            _ => Lifecycle::Closed,
        }
    }
}

struct NegotiatedClient {
    capabilities: ClientCapabilities,
    #[allow(dead_code)]
    info: Implementation,
    protocol_version: String,
}

/// The constructed server (C7). Holds the negotiated client record (set
/// once, at `initialize`), the primitive collections, and everything needed
/// to answer the fixed method set.
pub struct McpServer {
    session: Arc<Session>,
    server_info: Implementation,
    capabilities: ServerCapabilities,
    protocol_versions: Vec<String>,
    instructions: Option<String>,
    tools: Arc<PrimitiveCollection<ToolDescriptor>>,
    prompts: Arc<PrimitiveCollection<PromptDescriptor>>,
    resources: Option<Arc<dyn ResourceReader>>,
    resource_templates: Option<Arc<dyn ResourceTemplateReader>>,
    resource_subscriptions: Option<Arc<dyn ResourceSubscriber>>,
    completion: Option<Arc<dyn CompletionProvider>>,
    services: Option<Arc<dyn ServiceResolverFactory>>,
    client: OnceLock<NegotiatedClient>,
    lifecycle: AtomicU8,
    ready_for_notifications: AtomicBool,
    log_level: std::sync::Mutex<Option<LoggingLevel>>,
}

impl McpServer {
    pub fn tools(&self) -> &Arc<PrimitiveCollection<ToolDescriptor>> {
        &self.tools
    }

    pub fn prompts(&self) -> &Arc<PrimitiveCollection<PromptDescriptor>> {
        &self.prompts
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from(self.lifecycle.load(Ordering::Acquire))
    }

    fn set_lifecycle(&self, state: Lifecycle) {
        self.lifecycle.store(state as u8, Ordering::Release);
    }

    /// The negotiated client capabilities, available once `initialize` has
    /// completed (§3: immutable for the remainder of the session).
    pub fn client_capabilities(&self) -> Option<&ClientCapabilities> {
        self.client.get().map(|c| &c.capabilities)
    }

    pub fn current_log_level(&self) -> Option<LoggingLevel> {
        *self.log_level.lock().unwrap()
    }

    /// A handle back into the owning session, for sinks and helpers outside
    /// the facade (e.g. [`crate::logging::LoggerSink`]) that need to send
    /// notifications without holding a full [`Arc<McpServer>`] reference cycle.
    pub(crate) fn handle(&self) -> ServerHandle {
        ServerHandle(Arc::clone(&self.session))
    }

    /// Builds the log sink that forwards records gated on this server's
    /// negotiated `logging/setLevel` state (§4.9).
    pub fn logger_sink(self: &Arc<Self>) -> crate::logging::LoggerSink {
        crate::logging::LoggerSink::new(Arc::clone(self))
    }

    /// Runs the session's read loop until shutdown (§3, §4.3).
    pub async fn serve(self: Arc<Self>) {
        self.set_lifecycle(Lifecycle::Running);
        Arc::clone(&self.session).run().await;
        self.set_lifecycle(Lifecycle::Closed);
    }

    pub async fn request_sampling(
        &self,
        params: CreateMessageRequestParams,
        cancellation: CancellationToken,
    ) -> Result<CreateMessageResult, SendRequestError> {
        self.require_client_capability(|caps| caps.sampling.is_some(), "sampling")?;
        let value = serde_json::to_value(params).map_err(|e| {
            SendRequestError::Session(SessionError::Configuration(format!(
                "failed to serialize sampling params: {e}"
            )))
        })?;
        let result = self
            .session
            .send_request(CreateMessageRequest::METHOD, Some(value), cancellation)
            .await?;
        serde_json::from_value(result).map_err(|e| {
            SendRequestError::Session(SessionError::Configuration(format!(
                "peer returned a malformed sampling/createMessage result: {e}"
            )))
        })
    }

    pub async fn request_roots(
        &self,
        cancellation: CancellationToken,
    ) -> Result<ListRootsResult, SendRequestError> {
        self.require_client_capability(|caps| caps.roots.is_some(), "roots")?;
        let result = self
            .session
            .send_request(ListRootsRequest::METHOD, None, cancellation)
            .await?;
        serde_json::from_value(result).map_err(|e| {
            SendRequestError::Session(SessionError::Configuration(format!(
                "peer returned a malformed roots/list result: {e}"
            )))
        })
    }

    fn require_client_capability(
        &self,
        has: impl Fn(&ClientCapabilities) -> bool,
        name: &str,
    ) -> Result<(), SendRequestError> {
        let client = self.client.get().ok_or_else(|| {
            SessionError::PreconditionFailed("session is not yet initialized".into())
        })?;
        if has(&client.capabilities) {
            Ok(())
        } else {
            Err(SessionError::PreconditionFailed(format!(
                "client did not advertise the '{name}' capability"
            ))
            .into())
        }
    }

    fn negotiate_protocol_version(&self, proposed: &str) -> String {
        if self.protocol_versions.iter().any(|v| v == proposed) {
            proposed.to_string()
        } else {
            self.protocol_versions
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string())
        }
    }

    /// Subscribes each primitive collection's `Changed` event to its
    /// `list_changed` notification (§4.5, §4.7). Emission is gated on having
    /// observed `notifications/initialized`; changes before that edge are
    /// simply not announced, not queued.
    fn wire_list_changed(self: &Arc<Self>) {
        let server = Arc::clone(self);
        self.tools.on_changed(move |_change: &Change<ToolDescriptor>| {
            server.emit_list_changed(ToolListChangedNotification::METHOD);
        });
        let server = Arc::clone(self);
        self.prompts
            .on_changed(move |_change: &Change<PromptDescriptor>| {
                server.emit_list_changed(PromptListChangedNotification::METHOD);
            });
    }

    fn emit_list_changed(self: &Arc<Self>, method: &'static str) {
        if !self.ready_for_notifications.load(Ordering::Acquire) {
            return;
        }
        let handle = self.handle();
        tokio::spawn(async move {
            let _ = handle.send_notification(method, None).await;
        });
    }

    async fn install_handlers(self: &Arc<Self>) {
        let requests = self.session.requests();

        let server = Arc::clone(self);
        requests.register(
            "initialize",
            typed_request_handler(move |params: InitializeRequestParams, _ctx| {
                let server = Arc::clone(&server);
                async move { server.handle_initialize(params).await }
            }),
        );

        requests.register(
            "ping",
            typed_request_handler(|_: EmptyParams, _ctx| async {
                Ok::<_, HandlerError>(EmptyResult {})
            }),
        );

        let server = Arc::clone(self);
        requests.register(
            "tools/list",
            typed_request_handler(move |_: ListToolsRequestParams, _ctx| {
                let server = Arc::clone(&server);
                async move {
                    Ok::<_, HandlerError>(ListToolsResult {
                        tools: server.tools.snapshot().iter().map(|t| t.as_tool()).collect(),
                        next_cursor: None,
                    })
                }
            }),
        );

        let server = Arc::clone(self);
        requests.register(
            "tools/call",
            typed_request_handler(move |params: CallToolRequestParams, ctx| {
                let server = Arc::clone(&server);
                async move { server.handle_call_tool(params, ctx).await }
            }),
        );

        let server = Arc::clone(self);
        requests.register(
            "prompts/list",
            typed_request_handler(move |_: ListPromptsRequestParams, _ctx| {
                let server = Arc::clone(&server);
                async move {
                    Ok::<_, HandlerError>(ListPromptsResult {
                        prompts: server
                            .prompts
                            .snapshot()
                            .iter()
                            .map(|p| p.as_prompt())
                            .collect(),
                        next_cursor: None,
                    })
                }
            }),
        );

        let server = Arc::clone(self);
        requests.register(
            "prompts/get",
            typed_request_handler(move |params: GetPromptRequestParams, ctx| {
                let server = Arc::clone(&server);
                async move { server.handle_get_prompt(params, ctx).await }
            }),
        );

        if let Some(resources) = self.resources.clone() {
            let r = Arc::clone(&resources);
            requests.register(
                "resources/list",
                typed_request_handler(move |params: ListResourcesRequestParams, _ctx| {
                    let r = Arc::clone(&r);
                    async move { r.list(params.cursor).await }
                }),
            );
            let r = resources;
            requests.register(
                "resources/read",
                typed_request_handler(move |params: ReadResourceRequestParams, _ctx| {
                    let r = Arc::clone(&r);
                    async move { r.read(&params.uri).await }
                }),
            );
        }

        if let Some(templates) = self.resource_templates.clone() {
            requests.register(
                "resources/templates/list",
                typed_request_handler(move |params: ListResourceTemplatesRequestParams, _ctx| {
                    let templates = Arc::clone(&templates);
                    async move { templates.list(params.cursor).await }
                }),
            );
        }

        if let Some(subscriptions) = self.resource_subscriptions.clone() {
            let s = Arc::clone(&subscriptions);
            requests.register(
                "resources/subscribe",
                typed_request_handler(move |params: SubscribeRequestParams, _ctx| {
                    let s = Arc::clone(&s);
                    async move {
                        s.subscribe(&params.uri).await?;
                        Ok::<_, HandlerError>(EmptyResult {})
                    }
                }),
            );
            let s = subscriptions;
            requests.register(
                "resources/unsubscribe",
                typed_request_handler(move |params: UnsubscribeRequestParams, _ctx| {
                    let s = Arc::clone(&s);
                    async move {
                        s.unsubscribe(&params.uri).await?;
                        Ok::<_, HandlerError>(EmptyResult {})
                    }
                }),
            );
        }

        if let Some(completion) = self.completion.clone() {
            requests.register(
                CompleteRequest::METHOD,
                typed_request_handler(move |params: CompleteRequestParams, _ctx| {
                    let completion = Arc::clone(&completion);
                    async move { completion.complete(params).await }
                }),
            );
        }

        let server = Arc::clone(self);
        requests.register(
            "logging/setLevel",
            typed_request_handler(move |params: SetLevelRequestParams, _ctx| {
                let server = Arc::clone(&server);
                async move {
                    *server.log_level.lock().unwrap() = Some(params.level);
                    Ok::<_, HandlerError>(EmptyResult {})
                }
            }),
        );

        self.session
            .notifications()
            .register(
                InitializedNotification::METHOD,
                Arc::new(InitializedEdge {
                    server: Arc::clone(self),
                }),
            )
            .await;
    }

    async fn handle_initialize(
        self: Arc<Self>,
        params: InitializeRequestParams,
    ) -> Result<InitializeResult, HandlerError> {
        let protocol_version = self.negotiate_protocol_version(&params.protocol_version);
        let negotiated = NegotiatedClient {
            capabilities: params.capabilities,
            info: params.client_info,
            protocol_version: protocol_version.clone(),
        };
        if self.client.set(negotiated).is_err() {
            return Err(HandlerError::Protocol {
                code: mcp_types::INVALID_REQUEST_ERROR_CODE,
                message: "the session has already been initialized".into(),
            });
        }
        self.set_lifecycle(Lifecycle::Initialized);
        Ok(InitializeResult {
            protocol_version,
            capabilities: self.capabilities.clone(),
            server_info: self.server_info.clone(),
            instructions: self.instructions.clone(),
        })
    }

    async fn handle_call_tool(
        &self,
        params: CallToolRequestParams,
        ctx: InvocationContext,
    ) -> Result<CallToolResult, HandlerError> {
        let Some(tool) = self.tools.try_get(&params.name) else {
            return Err(HandlerError::Protocol {
                code: METHOD_NOT_FOUND_ERROR_CODE,
                message: format!("unknown tool '{}'", params.name),
            });
        };
        let arguments = params.arguments.unwrap_or_else(|| serde_json::json!({}));
        tool.validate_arguments(&arguments)?;
        Ok(tool.invoke(arguments, self.scoped(ctx)).await)
    }

    async fn handle_get_prompt(
        &self,
        params: GetPromptRequestParams,
        ctx: InvocationContext,
    ) -> Result<GetPromptResult, HandlerError> {
        let Some(prompt) = self.prompts.try_get(&params.name) else {
            return Err(HandlerError::Protocol {
                code: METHOD_NOT_FOUND_ERROR_CODE,
                message: format!("unknown prompt '{}'", params.name),
            });
        };
        prompt
            .invoke(params.arguments.unwrap_or_default(), self.scoped(ctx))
            .await
    }

    /// Attaches this facade's scoped-resolver factory (if any) to a
    /// request's context before handing it to a tool/prompt callable (§3).
    fn scoped(&self, ctx: InvocationContext) -> InvocationContext {
        match &self.services {
            Some(factory) => ctx.with_services(factory.create()),
            None => ctx,
        }
    }
}

struct InitializedEdge {
    server: Arc<McpServer>,
}

#[async_trait]
impl NotificationHandler for InitializedEdge {
    async fn handle(&self, _params: serde_json::Value, _ctx: InvocationContext) {
        self.server.ready_for_notifications.store(true, Ordering::Release);
    }
}
