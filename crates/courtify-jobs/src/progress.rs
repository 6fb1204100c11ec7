//! Upload progress sources.
//!
//! A [`ProgressSource`] drives a document's upload percentage from 0 to 100
//! through a [`ProgressReporter`]. The reporter writes every value through the
//! [`DocumentStore`] and resolves a one-shot completion signal the first time
//! 100 is reached; the owning task awaits that signal instead of polling.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::time::{interval, MissedTickBehavior};
use tracing::trace;
use uuid::Uuid;

use courtify_core::defaults::{PROGRESS_INTERVAL_MS, PROGRESS_STEP};
use courtify_core::{DocumentUpdate, Result};

use crate::store::DocumentStore;

/// Advances upload progress for one document.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    /// Report progress until 100 is reached or an update is rejected.
    async fn drive(&self, size: u64, reporter: ProgressReporter) -> Result<()>;
}

/// Write side of a document's upload progress.
#[derive(Debug)]
pub struct ProgressReporter {
    document_id: Uuid,
    store: DocumentStore,
    completed: Option<oneshot::Sender<()>>,
}

impl ProgressReporter {
    pub fn new(document_id: Uuid, store: DocumentStore, completed: oneshot::Sender<()>) -> Self {
        Self {
            document_id,
            store,
            completed: Some(completed),
        }
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    /// Record a percentage (clamped to 100). Lower or equal values are ignored.
    pub async fn report(&mut self, percent: u8) -> Result<()> {
        let document = self
            .store
            .apply(self.document_id, DocumentUpdate::Progress(percent))
            .await?;
        trace!(document_id = %self.document_id, progress = document.upload_progress, "Upload progress");

        if document.upload_progress >= 100 {
            if let Some(completed) = self.completed.take() {
                let _ = completed.send(());
            }
        }
        Ok(())
    }

    /// Record progress as a share of bytes sent. An empty upload is complete.
    pub async fn report_bytes(&mut self, sent: u64, total: u64) -> Result<()> {
        let percent = if total == 0 {
            100
        } else {
            (sent.min(total).saturating_mul(100) / total) as u8
        };
        self.report(percent).await
    }

    /// Whether the completion signal has fired.
    pub fn is_complete(&self) -> bool {
        self.completed.is_none()
    }
}

/// Fixed-step timer progress: `step` points every `interval`.
#[derive(Debug, Clone)]
pub struct TimerProgress {
    step: u8,
    interval: Duration,
}

impl Default for TimerProgress {
    fn default() -> Self {
        Self::new(PROGRESS_STEP, Duration::from_millis(PROGRESS_INTERVAL_MS))
    }
}

impl TimerProgress {
    /// A zero step is raised to 1 so the drive always terminates.
    pub fn new(step: u8, interval: Duration) -> Self {
        Self {
            step: step.clamp(1, 100),
            interval,
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl ProgressSource for TimerProgress {
    async fn drive(&self, _size: u64, mut reporter: ProgressReporter) -> Result<()> {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        let mut percent: u8 = 0;
        while percent < 100 {
            ticker.tick().await;
            percent = percent.saturating_add(self.step).min(100);
            reporter.report(percent).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtify_core::{Document, EventBus};
    use tokio::time::Instant;

    async fn uploading_document(store: &DocumentStore) -> Uuid {
        let doc = Document::new("a.pdf", 2048, "application/pdf");
        let id = doc.id;
        store.insert(doc).await;
        store.apply(id, DocumentUpdate::StartUpload).await.unwrap();
        id
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_reaches_100_in_ten_ticks() {
        let store = DocumentStore::new(EventBus::new(64));
        let id = uploading_document(&store).await;
        let (tx, rx) = oneshot::channel();

        let start = Instant::now();
        TimerProgress::default()
            .drive(2048, ProgressReporter::new(id, store.clone(), tx))
            .await
            .unwrap();

        assert!(rx.await.is_ok());
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
        assert_eq!(store.get(id).await.unwrap().upload_progress, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uneven_step_clamps_at_100() {
        let store = DocumentStore::new(EventBus::new(64));
        let id = uploading_document(&store).await;
        let (tx, rx) = oneshot::channel();

        TimerProgress::new(30, Duration::from_millis(10))
            .drive(1, ProgressReporter::new(id, store.clone(), tx))
            .await
            .unwrap();

        assert!(rx.await.is_ok());
        assert_eq!(store.get(id).await.unwrap().upload_progress, 100);
    }

    #[test]
    fn test_zero_step_raised() {
        assert_eq!(TimerProgress::new(0, Duration::from_millis(1)).step(), 1);
        assert_eq!(TimerProgress::new(250, Duration::from_millis(1)).step(), 100);
    }

    #[tokio::test]
    async fn test_signal_fires_once() {
        let store = DocumentStore::new(EventBus::new(64));
        let id = uploading_document(&store).await;
        let (tx, rx) = oneshot::channel();
        let mut reporter = ProgressReporter::new(id, store.clone(), tx);

        reporter.report(60).await.unwrap();
        assert!(!reporter.is_complete());
        reporter.report(100).await.unwrap();
        assert!(reporter.is_complete());
        reporter.report(100).await.unwrap();
        assert!(rx.await.is_ok());
    }

    #[tokio::test]
    async fn test_report_bytes() {
        let store = DocumentStore::new(EventBus::new(64));
        let id = uploading_document(&store).await;
        let (tx, _rx) = oneshot::channel();
        let mut reporter = ProgressReporter::new(id, store.clone(), tx);

        reporter.report_bytes(512, 2048).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().upload_progress, 25);
        reporter.report_bytes(4096, 2048).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().upload_progress, 100);
        assert!(reporter.is_complete());
    }

    #[tokio::test]
    async fn test_report_rejected_outside_upload() {
        let store = DocumentStore::new(EventBus::new(64));
        let doc = Document::new("a.pdf", 1, "application/pdf");
        let id = doc.id;
        store.insert(doc).await;
        let (tx, _rx) = oneshot::channel();
        let mut reporter = ProgressReporter::new(id, store, tx);

        assert!(reporter.report(10).await.is_err());
        assert!(!reporter.is_complete());
    }
}
