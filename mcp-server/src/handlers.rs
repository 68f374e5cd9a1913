//! Handler registries (C4, §4.4): the request-method table (one handler per
//! method, replaceable) and the notification-method table (an ordered list
//! of handlers per method, supporting safe removal under concurrency).

use crate::context::InvocationContext;
use async_trait::async_trait;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::Notify;

/// A typed error a [`RequestHandler`] reports at the protocol boundary. This
/// is distinct from a tool/prompt invocation failure (§4.6), which is
/// reported as a *successful* response with `isError: true` rather than one
/// of these.
#[derive(Debug, Clone)]
pub enum HandlerError {
    /// Failed binding of `params`/`arguments` (§4.6's data-parameter rule).
    InvalidParams(String),
    /// A handler-chosen JSON-RPC error code, for cases like "tool not
    /// found" that the facade maps to a specific code rather than
    /// `InternalError`.
    Protocol { code: i64, message: String },
    /// Anything else uncaught; mapped to `InternalError` (−32603).
    Internal(String),
}

impl HandlerError {
    pub fn code(&self) -> i64 {
        match self {
            HandlerError::InvalidParams(_) => mcp_types::INVALID_PARAMS_ERROR_CODE,
            HandlerError::Protocol { code, .. } => *code,
            HandlerError::Internal(_) => mcp_types::INTERNAL_ERROR_CODE,
        }
    }

    pub fn message(&self) -> String {
        match self {
            HandlerError::InvalidParams(m) => m.clone(),
            HandlerError::Protocol { message, .. } => message.clone(),
            HandlerError::Internal(m) => m.clone(),
        }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for HandlerError {}

/// A method → handler entry in the request table (§4.4).
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(
        &self,
        params: serde_json::Value,
        ctx: InvocationContext,
    ) -> Result<serde_json::Value, HandlerError>;
}

/// `map<method, Func(params, ctx) -> result | error>`. Exactly one handler
/// per method; later registration replaces earlier (§4.4).
#[derive(Default)]
pub struct RequestHandlerTable {
    handlers: DashMap<String, Arc<dyn RequestHandler>>,
}

impl RequestHandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, method: impl Into<String>, handler: Arc<dyn RequestHandler>) {
        self.handlers.insert(method.into(), handler);
    }

    pub fn get(&self, method: &str) -> Option<Arc<dyn RequestHandler>> {
        self.handlers.get(method).map(|h| Arc::clone(h.value()))
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }
}

/// A registered notification handler, invoked for every matching
/// notification in registration order (§4.4).
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn handle(&self, params: serde_json::Value, ctx: InvocationContext);
}

struct Entry {
    handler: Arc<dyn NotificationHandler>,
    active: AtomicUsize,
    idle: Notify,
    removed: std::sync::atomic::AtomicBool,
}

impl Entry {
    fn enter(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    fn exit(&self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }

    async fn wait_idle(&self) {
        loop {
            if self.active.load(Ordering::Acquire) == 0 {
                return;
            }
            let notified = self.idle.notified();
            if self.active.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// A token identifying one registration, returned by
/// [`NotificationHandlerTable::register`] so callers can later
/// [`NotificationHandlerTable::remove`] it.
pub struct Registration {
    method: String,
    entry: Arc<Entry>,
}

tokio::task_local! {
    /// Set for the duration of a notification handler invocation. Lets
    /// [`NotificationHandlerTable::remove`] detect when the removing caller
    /// is itself running inside a handler, in which case it must not await
    /// its own completion (§4.4 point 1's "ambient re-entry counter").
    static IN_NOTIFICATION_HANDLER: ();
}

/// `map<method, ordered list of Func(notification, ctx)>` with the removal
/// semantics of §4.4: a removal awaits only invocations that began before it
/// was requested, never deadlocks a handler removing itself or another
/// handler for the same notification, and dispatch always sees a clean
/// snapshot of the list as of when it started.
#[derive(Default)]
pub struct NotificationHandlerTable {
    lists: DashMap<String, Arc<AsyncMutex<Vec<Arc<Entry>>>>>,
}

impl NotificationHandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(
        &self,
        method: impl Into<String>,
        handler: Arc<dyn NotificationHandler>,
    ) -> Registration {
        let method = method.into();
        let entry = Arc::new(Entry {
            handler,
            active: AtomicUsize::new(0),
            idle: Notify::new(),
            removed: std::sync::atomic::AtomicBool::new(false),
        });
        let list = self
            .lists
            .entry(method.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(Vec::new())))
            .clone();
        list.lock().await.push(Arc::clone(&entry));
        Registration { method, entry }
    }

    /// Detaches the registration from the list (so no dispatch that starts
    /// after this call observes it) and, unless the caller is itself
    /// currently inside a notification handler, waits for any invocation
    /// that began before this call to finish.
    pub async fn remove(&self, registration: Registration) {
        registration.entry.removed.store(true, Ordering::Release);
        if let Some(list) = self.lists.get(&registration.method) {
            let mut guard = list.lock().await;
            guard.retain(|e| !Arc::ptr_eq(e, &registration.entry));
        }
        let reentrant = IN_NOTIFICATION_HANDLER.try_with(|_| ()).is_ok();
        if !reentrant {
            registration.entry.wait_idle().await;
        }
    }

    /// Invokes every handler registered for `method` as of this call, in
    /// registration order, sequentially. Handlers added concurrently are not
    /// observed by this dispatch (§4.4 point 3).
    pub async fn dispatch(&self, method: &str, params: serde_json::Value, ctx: InvocationContext) {
        let Some(list) = self.lists.get(method).map(|l| Arc::clone(l.value())) else {
            return;
        };
        let snapshot: Vec<Arc<Entry>> = {
            let guard = list.lock().await;
            guard
                .iter()
                .filter(|e| !e.removed.load(Ordering::Acquire))
                .cloned()
                .collect()
        };
        for entry in snapshot {
            entry.enter();
            let result = IN_NOTIFICATION_HANDLER
                .scope((), entry.handler.handle(params.clone(), ctx.clone()))
                .await;
            entry.exit();
            let _ = result;
        }
    }
}

/// Adapts a plain async closure into a [`RequestHandler`], deserializing
/// `params` to `P` and serializing the closure's typed result back to JSON.
/// Missing/malformed params become [`HandlerError::InvalidParams`] (§4.6).
pub fn typed_request_handler<P, R, F, Fut>(f: F) -> Arc<dyn RequestHandler>
where
    P: serde::de::DeserializeOwned + Send + 'static,
    R: serde::Serialize + Send + 'static,
    F: Fn(P, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, HandlerError>> + Send,
{
    struct Typed<P, F> {
        f: F,
        _params: std::marker::PhantomData<fn() -> P>,
    }

    #[async_trait]
    impl<P, R, F, Fut> RequestHandler for Typed<P, F>
    where
        P: serde::de::DeserializeOwned + Send + 'static,
        R: serde::Serialize + Send + 'static,
        F: Fn(P, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send,
    {
        async fn handle(
            &self,
            params: serde_json::Value,
            ctx: InvocationContext,
        ) -> Result<serde_json::Value, HandlerError> {
            let parsed: P = serde_json::from_value(params)
                .map_err(|e| HandlerError::InvalidParams(e.to_string()))?;
            let result = (self.f)(parsed, ctx).await?;
            serde_json::to_value(result).map_err(|e| HandlerError::Internal(e.to_string()))
        }
    }

    Arc::new(Typed {
        f,
        _params: std::marker::PhantomData,
    })
}
