//! Tracing layer capturing migration log events.
//!
//! The migration engine logs through `tracing` under the
//! [`LOG_TARGET`] target. This layer picks those events out of the stream
//! and forwards them as [`MigrationEvent`]s over a tokio channel, e.g. to
//! write an audit trail next to a migrated export.

use migra_core::migration::LOG_TARGET;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// A captured migration log event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MigrationEvent {
    /// Event target (always [`LOG_TARGET`] unless the layer is widened)
    pub target: String,
    /// Log level (INFO, DEBUG, ERROR)
    pub level: String,
    /// The full log line, including the `[MIGRATION::{id}]` tag
    pub message: String,
    /// Structured fields other than the message
    pub fields: HashMap<String, Value>,
    /// Timestamp
    pub timestamp: String,
}

/// A tracing layer that sends migration events to a channel.
pub struct MigrationEventLayer {
    sender: mpsc::UnboundedSender<MigrationEvent>,
}

impl MigrationEventLayer {
    /// Create a new layer with the given channel sender
    pub fn new(sender: mpsc::UnboundedSender<MigrationEvent>) -> Self {
        Self { sender }
    }

    /// Creates a layer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MigrationEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl<S> Layer<S> for MigrationEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() != LOG_TARGET {
            return;
        }

        let mut fields = HashMap::new();
        let mut visitor = FieldVisitor(&mut fields);
        event.record(&mut visitor);

        let message = match fields.remove("message") {
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let migration_event = MigrationEvent {
            target: metadata.target().to_string(),
            level: metadata.level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Non-blocking send - if the receiver is dropped, we just skip
        let _ = self.sender.send(migration_event);
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}
