//! Event types, envelope schema, and event bus for state change notifications.
//!
//! The document store and query session publish every change they apply to a
//! single broadcast channel. Renderers subscribe independently and read the
//! current state through snapshots; events tell them when to look.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{DocumentStatus, Role};
use crate::validation::ValidationError;

// ============================================================================
// Event Envelope
// ============================================================================

/// Versioned envelope around a [`CourtifyEvent`].
///
/// `event_type` uses dot-namespaced names (e.g. `"document.progress"`).
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type.
    pub event_type: String,
    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    /// Type of entity this event relates to (`"document"` or `"message"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// ID of the entity this event relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
    /// Payload schema version.
    pub payload_version: u32,
    pub payload: CourtifyEvent,
}

impl EventEnvelope {
    pub fn new(event: CourtifyEvent) -> Self {
        Self {
            event_id: crate::uuid_utils::new_v7(),
            event_type: event.namespaced_event_type().to_string(),
            occurred_at: Utc::now(),
            entity_type: event.entity_type().map(String::from),
            entity_id: event.entity_id(),
            payload_version: 1,
            payload: event,
        }
    }
}

// ============================================================================
// Domain events
// ============================================================================

/// Notifications emitted by the intake controller and query sessions.
///
/// Serialized with a `type` tag, e.g.
/// `{"type":"DocumentProgress","document_id":"...","progress":40}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CourtifyEvent {
    /// A candidate passed validation and a Document was created.
    DocumentAccepted { document_id: Uuid, name: String },
    /// A candidate was rejected; no Document exists for it.
    DocumentRejected { reason: ValidationError },
    /// Upload progress advanced.
    DocumentProgress { document_id: Uuid, progress: u8 },
    /// Status moved along the lifecycle.
    DocumentStatusChanged {
        document_id: Uuid,
        status: DocumentStatus,
    },
    /// Analysis finished and the result is attached.
    DocumentCompleted { document_id: Uuid, name: String },
    /// The document reached `Failed`.
    DocumentFailed {
        document_id: Uuid,
        name: String,
        error: String,
    },
    /// A transcript entry was appended.
    MessageAppended { message_id: Uuid, role: Role },
    /// The session started or stopped waiting for an answer.
    TypingChanged { is_typing: bool },
}

impl CourtifyEvent {
    /// Namespaced event type for the envelope.
    pub fn namespaced_event_type(&self) -> &'static str {
        match self {
            CourtifyEvent::DocumentAccepted { .. } => "document.accepted",
            CourtifyEvent::DocumentRejected { .. } => "document.rejected",
            CourtifyEvent::DocumentProgress { .. } => "document.progress",
            CourtifyEvent::DocumentStatusChanged { .. } => "document.status",
            CourtifyEvent::DocumentCompleted { .. } => "document.completed",
            CourtifyEvent::DocumentFailed { .. } => "document.failed",
            CourtifyEvent::MessageAppended { .. } => "message.appended",
            CourtifyEvent::TypingChanged { .. } => "session.typing",
        }
    }

    /// Entity type this event relates to.
    pub fn entity_type(&self) -> Option<&'static str> {
        match self {
            CourtifyEvent::DocumentAccepted { .. }
            | CourtifyEvent::DocumentProgress { .. }
            | CourtifyEvent::DocumentStatusChanged { .. }
            | CourtifyEvent::DocumentCompleted { .. }
            | CourtifyEvent::DocumentFailed { .. } => Some("document"),
            CourtifyEvent::MessageAppended { .. } => Some("message"),
            CourtifyEvent::DocumentRejected { .. } | CourtifyEvent::TypingChanged { .. } => None,
        }
    }

    /// Primary entity ID this event relates to.
    pub fn entity_id(&self) -> Option<Uuid> {
        match self {
            CourtifyEvent::DocumentAccepted { document_id, .. }
            | CourtifyEvent::DocumentProgress { document_id, .. }
            | CourtifyEvent::DocumentStatusChanged { document_id, .. }
            | CourtifyEvent::DocumentCompleted { document_id, .. }
            | CourtifyEvent::DocumentFailed { document_id, .. } => Some(*document_id),
            CourtifyEvent::MessageAppended { message_id, .. } => Some(*message_id),
            CourtifyEvent::DocumentRejected { .. } | CourtifyEvent::TypingChanged { .. } => None,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based event bus shared by the intake controller and sessions.
///
/// Slow receivers that fall behind get a `Lagged` error and skip events; they
/// recover by re-reading the current snapshot.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped silently when nobody listens.
    pub fn emit(&self, event: CourtifyEvent) {
        let envelope = EventEnvelope::new(event);
        tracing::trace!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to receive enveloped events.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_emit_subscribe() {
        let bus = EventBus::new(32);
        let mut rx = bus.subscribe();
        let id = Uuid::new_v4();

        bus.emit(CourtifyEvent::DocumentProgress {
            document_id: id,
            progress: 40,
        });

        let envelope = rx.recv().await.unwrap();
        assert!(matches!(
            envelope.payload,
            CourtifyEvent::DocumentProgress { progress: 40, .. }
        ));
        assert_eq!(envelope.event_type, "document.progress");
        assert_eq!(envelope.entity_type.as_deref(), Some("document"));
        assert_eq!(envelope.entity_id, Some(id));
        assert_eq!(envelope.payload_version, 1);
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(32);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(CourtifyEvent::TypingChanged { is_typing: true });

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.event_type, "session.typing");
        assert_eq!(e2.event_type, "session.typing");
        assert!(e1.entity_id.is_none());
    }

    #[test]
    fn test_event_bus_no_subscribers_ok() {
        let bus = EventBus::default();
        bus.emit(CourtifyEvent::TypingChanged { is_typing: false });
    }

    #[test]
    fn test_rejected_event_serialization() {
        let event = CourtifyEvent::DocumentRejected {
            reason: ValidationError::TooLarge {
                name: "big.pdf".to_string(),
                size: 20,
                limit: 10,
            },
        };
        let json = serde_json::to_value(EventEnvelope::new(event)).unwrap();
        assert_eq!(json["event_type"], "document.rejected");
        assert_eq!(json["payload"]["type"], "DocumentRejected");
        assert_eq!(json["payload"]["reason"]["kind"], "too_large");
        assert_eq!(json["payload"]["reason"]["name"], "big.pdf");
        assert!(json.get("entity_id").is_none());
    }

    #[test]
    fn test_status_event_serialization() {
        let event = CourtifyEvent::DocumentStatusChanged {
            document_id: Uuid::nil(),
            status: DocumentStatus::Processing,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "DocumentStatusChanged");
        assert_eq!(json["status"], "processing");
    }
}
