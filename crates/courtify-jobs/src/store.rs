//! Owned document collection with a single mutation path.
//!
//! Tasks never touch a [`Document`] directly: they send a [`DocumentUpdate`]
//! for an id and the store applies it under one lock. Every applied change is
//! published on the [`EventBus`] while the lock is held, so subscribers see
//! updates in the order they were applied.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use courtify_core::{
    CourtifyEvent, Document, DocumentStatus, DocumentUpdate, Error, EventBus, EventEnvelope,
    Result,
};

/// Shared handle to the document collection. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    documents: Arc<RwLock<Vec<Document>>>,
    events: EventBus,
}

impl DocumentStore {
    pub fn new(events: EventBus) -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    /// Add a newly accepted document.
    pub async fn insert(&self, document: Document) {
        let mut documents = self.documents.write().await;
        self.events.emit(CourtifyEvent::DocumentAccepted {
            document_id: document.id,
            name: document.name.clone(),
        });
        documents.push(document);
    }

    /// Apply one update to one document and return the resulting state.
    ///
    /// Rejected updates leave the document unchanged and emit nothing.
    pub async fn apply(&self, id: Uuid, update: DocumentUpdate) -> Result<Document> {
        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Error::DocumentNotFound(id))?;

        let before = document.status;
        let changed = document.apply(update)?;
        if changed {
            self.publish(document, before);
        }
        Ok(document.clone())
    }

    fn publish(&self, document: &Document, before: DocumentStatus) {
        let document_id = document.id;
        if document.status != before {
            debug!(%document_id, from = %before, to = %document.status, "Document status changed");
            self.events.emit(CourtifyEvent::DocumentStatusChanged {
                document_id,
                status: document.status,
            });
        }
        match document.status {
            DocumentStatus::Uploading => self.events.emit(CourtifyEvent::DocumentProgress {
                document_id,
                progress: document.upload_progress,
            }),
            DocumentStatus::Completed => self.events.emit(CourtifyEvent::DocumentCompleted {
                document_id,
                name: document.name.clone(),
            }),
            DocumentStatus::Failed => self.events.emit(CourtifyEvent::DocumentFailed {
                document_id,
                name: document.name.clone(),
                error: document.failure.clone().unwrap_or_default(),
            }),
            DocumentStatus::Queued | DocumentStatus::Processing => {}
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<Document> {
        self.documents
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// All documents in submission order.
    pub async fn snapshot(&self) -> Vec<Document> {
        self.documents.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtify_core::AnalysisResult;

    fn store() -> DocumentStore {
        DocumentStore::new(EventBus::new(64))
    }

    #[tokio::test]
    async fn test_insert_emits_accepted() {
        let store = store();
        let mut rx = store.subscribe();
        let doc = Document::new("a.pdf", 10, "application/pdf");
        let id = doc.id;
        store.insert(doc).await;

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event_type, "document.accepted");
        assert_eq!(envelope.entity_id, Some(id));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_apply_unknown_id() {
        let store = store();
        let err = store
            .apply(Uuid::new_v4(), DocumentUpdate::StartUpload)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn test_apply_publishes_status_then_progress() {
        let store = store();
        let doc = Document::new("a.pdf", 10, "application/pdf");
        let id = doc.id;
        store.insert(doc).await;
        let mut rx = store.subscribe();

        store.apply(id, DocumentUpdate::StartUpload).await.unwrap();
        store.apply(id, DocumentUpdate::Progress(30)).await.unwrap();

        let types: Vec<String> = (0..3)
            .map(|_| rx.try_recv().unwrap().event_type)
            .collect();
        assert_eq!(
            types,
            vec!["document.status", "document.progress", "document.progress"]
        );
    }

    #[tokio::test]
    async fn test_rejected_update_emits_nothing() {
        let store = store();
        let doc = Document::new("a.pdf", 10, "application/pdf");
        let id = doc.id;
        store.insert(doc).await;
        let mut rx = store.subscribe();

        let err = store
            .apply(
                id,
                DocumentUpdate::Complete(AnalysisResult {
                    summary: "x".into(),
                    key_points: vec![],
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert!(rx.try_recv().is_err());
        assert_eq!(store.get(id).await.unwrap().status, DocumentStatus::Queued);
    }

    #[tokio::test]
    async fn test_fail_emits_failed_with_reason() {
        let store = store();
        let doc = Document::new("a.pdf", 10, "application/pdf");
        let id = doc.id;
        store.insert(doc).await;
        let mut rx = store.subscribe();

        store
            .apply(id, DocumentUpdate::Fail("Cancelled".into()))
            .await
            .unwrap();
        let _status = rx.try_recv().unwrap();
        match rx.try_recv().unwrap().payload {
            CourtifyEvent::DocumentFailed { error, .. } => assert_eq!(error, "Cancelled"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_snapshot_preserves_submission_order() {
        let store = store();
        for name in ["one.txt", "two.txt", "three.txt"] {
            store.insert(Document::new(name, 1, "text/plain")).await;
        }
        let names: Vec<String> = store.snapshot().await.into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["one.txt", "two.txt", "three.txt"]);
    }
}
