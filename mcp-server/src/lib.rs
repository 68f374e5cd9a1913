//! The session/routing core of a Model Context Protocol server endpoint
//! (§1-§4): JSON-RPC 2.0 message multiplexing over a
//! [`mcp_transport::Transport`], the server state machine, typed tool/prompt
//! registries, and the invocation adapter that turns a registered callable
//! into a `tools/call`/`prompts/get` response. Byte-level transports and
//! configuration *loading* are out of scope; see [`facade::ServerOptions`]
//! for the in-memory configuration surface a host assembles itself.

pub mod context;
pub mod error;
pub mod facade;
pub mod handlers;
mod id_gen;
mod inflight;
pub mod invocation;
pub mod logging;
mod pending;
pub mod registry;
pub mod session;

pub use context::InvocationContext;
pub use context::ProgressReporter;
pub use context::RequestContext;
pub use context::ServerHandle;
pub use context::ServiceResolver;
pub use error::SessionError;
pub use facade::CompletionProvider;
pub use facade::Lifecycle;
pub use facade::McpServer;
pub use facade::ResourceReader;
pub use facade::ResourceSubscriber;
pub use facade::ResourceTemplateReader;
pub use facade::ServerOptions;
pub use facade::ServiceResolverFactory;
pub use handlers::HandlerError;
pub use handlers::NotificationHandler;
pub use handlers::NotificationHandlerTable;
pub use handlers::Registration;
pub use handlers::RequestHandler;
pub use handlers::RequestHandlerTable;
pub use handlers::typed_request_handler;
pub use invocation::InvocationError;
pub use invocation::PromptDescriptor;
pub use invocation::PromptHandler;
pub use invocation::PromptOutcome;
pub use invocation::ToolDescriptor;
pub use invocation::ToolHandler;
pub use invocation::ToolOutcome;
pub use logging::LoggerSink;
pub use registry::Change;
pub use registry::Named;
pub use registry::PrimitiveCollection;
pub use session::SendRequestError;
pub use session::Session;
