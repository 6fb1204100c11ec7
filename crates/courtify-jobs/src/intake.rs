//! Intake controller: validation, document creation and the bounded task pool.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use courtify_core::defaults;
use courtify_core::{
    AnalysisService, CourtifyEvent, Document, DocumentUpdate, Error, EventBus, FileCandidate,
    Result, ValidationGate,
};

use crate::progress::{ProgressSource, TimerProgress};
use crate::store::DocumentStore;
use crate::task::DocumentTask;

/// Configuration for the intake controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Maximum number of documents uploading or processing at once.
    pub max_concurrent_tasks: usize,
    /// Percentage points added per progress tick.
    pub progress_step: u8,
    /// Interval between progress ticks in milliseconds.
    pub progress_interval_ms: u64,
    /// Upload size ceiling in bytes.
    pub max_upload_bytes: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: defaults::MAX_CONCURRENT_TASKS,
            progress_step: defaults::PROGRESS_STEP,
            progress_interval_ms: defaults::PROGRESS_INTERVAL_MS,
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }
}

impl IntakeConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `COURTIFY_MAX_CONCURRENT_TASKS` | `1` | Task pool size |
    /// | `COURTIFY_PROGRESS_STEP` | `10` | Percent per tick |
    /// | `COURTIFY_PROGRESS_INTERVAL_MS` | `200` | Tick interval |
    pub fn from_env() -> Self {
        Self {
            max_concurrent_tasks: defaults::env_or(
                defaults::ENV_MAX_CONCURRENT_TASKS,
                defaults::MAX_CONCURRENT_TASKS,
            )
            .max(1),
            progress_step: defaults::env_or(defaults::ENV_PROGRESS_STEP, defaults::PROGRESS_STEP),
            progress_interval_ms: defaults::env_or(
                defaults::ENV_PROGRESS_INTERVAL_MS,
                defaults::PROGRESS_INTERVAL_MS,
            ),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_tasks = max;
        self
    }

    pub fn with_progress(mut self, step: u8, interval_ms: u64) -> Self {
        self.progress_step = step;
        self.progress_interval_ms = interval_ms;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_tasks == 0 {
            return Err(Error::Config(
                "max_concurrent_tasks must be at least 1".to_string(),
            ));
        }
        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(Error::Config(format!(
                "progress_step must be between 1 and 100, got: {}",
                self.progress_step
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes cannot be 0".to_string()));
        }
        Ok(())
    }

    fn timer(&self) -> TimerProgress {
        TimerProgress::new(
            self.progress_step,
            Duration::from_millis(self.progress_interval_ms),
        )
    }
}

/// Accepts file candidates and runs each accepted one as a [`DocumentTask`].
pub struct IntakeController {
    gate: ValidationGate,
    store: DocumentStore,
    analyzer: Arc<dyn AnalysisService>,
    progress: Arc<dyn ProgressSource>,
    pool: Arc<Semaphore>,
    tokens: Arc<Mutex<HashMap<Uuid, CancellationToken>>>,
    shutdown: CancellationToken,
}

impl IntakeController {
    pub fn new(
        config: IntakeConfig,
        analyzer: Arc<dyn AnalysisService>,
        events: EventBus,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            max_concurrent_tasks = config.max_concurrent_tasks,
            progress_step = config.progress_step,
            progress_interval_ms = config.progress_interval_ms,
            "Initializing intake controller"
        );
        Ok(Self {
            gate: ValidationGate::new().with_max_size(config.max_upload_bytes),
            store: DocumentStore::new(events),
            analyzer,
            progress: Arc::new(config.timer()),
            pool: Arc::new(Semaphore::new(config.max_concurrent_tasks)),
            tokens: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        })
    }

    /// Replace the progress source (e.g. byte counting).
    pub fn with_progress_source(mut self, progress: Arc<dyn ProgressSource>) -> Self {
        self.progress = progress;
        self
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Validate candidates and start a task for each accepted one.
    ///
    /// Returns the accepted documents in `Queued` state. Rejections are
    /// published as `DocumentRejected` events and never create a document.
    pub async fn submit(&self, candidates: Vec<FileCandidate>) -> Vec<Document> {
        let (accepted, rejected) = self.gate.partition(candidates);

        for reason in rejected {
            warn!(file_name = reason.file_name(), error = %reason, "File rejected");
            self.store
                .events()
                .emit(CourtifyEvent::DocumentRejected { reason });
        }

        let mut documents = Vec::with_capacity(accepted.len());
        for file in accepted {
            let document = Document::new(&file.name, file.size(), &file.media_type);
            let document_id = document.id;
            info!(
                %document_id,
                file_name = %file.name,
                size = file.size(),
                media_type = %file.media_type,
                "Document accepted"
            );
            self.store.insert(document.clone()).await;

            let cancel = self.shutdown.child_token();
            self.tokens.lock().await.insert(document_id, cancel.clone());

            let task = DocumentTask::new(
                document_id,
                file,
                self.store.clone(),
                self.analyzer.clone(),
                self.progress.clone(),
                self.pool.clone(),
                cancel,
            );
            self.spawn(task);
            documents.push(document);
        }
        documents
    }

    /// Spawn a task under a supervisor that records panics as failures.
    fn spawn(&self, task: DocumentTask) {
        let document_id = task.document_id();
        let store = self.store.clone();
        let tokens = self.tokens.clone();

        tokio::spawn(async move {
            let outcome = tokio::spawn(task.run()).await;
            if let Err(e) = outcome {
                error!(%document_id, error = %e, "Document task panicked");
                let reason = format!("Internal error: {}", e);
                if let Err(e) = store.apply(document_id, DocumentUpdate::Fail(reason)).await {
                    error!(%document_id, error = %e, "Failed to record task panic");
                }
            }
            tokens.lock().await.remove(&document_id);
        });
    }

    /// Request cancellation of a document's task.
    ///
    /// `Ok(true)` means cancellation was requested, not that it took effect: a
    /// task already recording its result still ends `Completed`. Read the final
    /// state with [`IntakeController::wait`]. Returns `Ok(false)` when the
    /// document already reached a terminal state.
    pub async fn cancel(&self, id: Uuid) -> Result<bool> {
        let document = self.store.get(id).await.ok_or(Error::DocumentNotFound(id))?;
        if document.status.is_terminal() {
            return Ok(false);
        }
        match self.tokens.lock().await.get(&id) {
            Some(token) => {
                debug!(document_id = %id, status = %document.status, "Cancelling document task");
                token.cancel();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Cancel every running or queued task.
    pub fn shutdown(&self) {
        info!("Cancelling all document tasks");
        self.shutdown.cancel();
    }

    /// Wait until a document reaches a terminal state.
    pub async fn wait(&self, id: Uuid) -> Result<Document> {
        let mut events = self.store.subscribe();
        loop {
            let document = self.store.get(id).await.ok_or(Error::DocumentNotFound(id))?;
            if document.status.is_terminal() {
                return Ok(document);
            }
            match events.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => {
                    return Err(Error::Internal("event bus closed".to_string()))
                }
            }
        }
    }

    /// Wait for every document submitted so far.
    pub async fn wait_all(&self) -> Result<Vec<Document>> {
        let ids: Vec<Uuid> = self.store.snapshot().await.iter().map(|d| d.id).collect();
        futures::future::try_join_all(ids.into_iter().map(|id| self.wait(id))).await
    }

    /// All documents in submission order.
    pub async fn documents(&self) -> Vec<Document> {
        self.store.snapshot().await
    }

    pub async fn get(&self, id: Uuid) -> Option<Document> {
        self.store.get(id).await
    }
}
