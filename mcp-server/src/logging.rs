//! `AsLoggerSink()` (§4.7, §4.9): forwards log records to the peer as
//! `notifications/message`, gated by the level the client most recently set
//! via `logging/setLevel`. Doubles as a `tracing_subscriber::Layer` so a
//! host's own `tracing` events can be routed the same way, grounded in
//! `tracing-subscriber`'s `Layer` being the extension point the corpus
//! already depends on for structured logging.

use crate::facade::McpServer;
use mcp_types::LoggingLevel;
use mcp_types::LoggingMessageNotification;
use mcp_types::LoggingMessageNotificationParams;
use mcp_types::ModelContextProtocolNotification;
use std::sync::Arc;
use tracing::field::Field;
use tracing::field::Visit;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// A log sink bound to one server's negotiated level and outbound channel.
#[derive(Clone)]
pub struct LoggerSink {
    server: Arc<McpServer>,
}

impl LoggerSink {
    pub(crate) fn new(server: Arc<McpServer>) -> Self {
        Self { server }
    }

    /// Forwards one record as `notifications/message`, unless it falls below
    /// the level the client has set (or the client has not set one yet, in
    /// which case nothing is forwarded — §4.7's "when the client has
    /// established a minimum level").
    pub fn log(&self, level: LoggingLevel, logger: Option<String>, data: serde_json::Value) {
        let Some(threshold) = self.server.current_log_level() else {
            return;
        };
        if level < threshold {
            return;
        }
        let server = Arc::clone(&self.server);
        tokio::spawn(async move {
            let params = LoggingMessageNotificationParams {
                level,
                logger,
                data,
            };
            let Ok(value) = serde_json::to_value(params) else {
                return;
            };
            let _ = server
                .handle()
                .send_notification(LoggingMessageNotification::METHOD, Some(value))
                .await;
        });
    }
}

fn tracing_level_to_mcp(level: &tracing::Level) -> LoggingLevel {
    match *level {
        tracing::Level::ERROR => LoggingLevel::Error,
        tracing::Level::WARN => LoggingLevel::Warning,
        tracing::Level::INFO => LoggingLevel::Info,
        tracing::Level::DEBUG => LoggingLevel::Debug,
        tracing::Level::TRACE => LoggingLevel::Debug,
    }
}

/// Collects an event's fields into a JSON object, pulling `message` out to
/// the top level the way `tracing`'s own formatters do.
#[derive(Default)]
struct FieldCollector {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::json!(value));
    }
}

impl<S> Layer<S> for LoggerSink
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let Some(threshold) = self.server.current_log_level() else {
            return;
        };
        let level = tracing_level_to_mcp(event.metadata().level());
        if level < threshold {
            return;
        }
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        self.log(
            level,
            Some(event.metadata().target().to_string()),
            serde_json::Value::Object(collector.fields),
        );
    }
}
