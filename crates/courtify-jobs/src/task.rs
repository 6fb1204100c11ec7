//! Per-document lifecycle: Queued -> Uploading -> Processing -> Completed | Failed.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{oneshot, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use courtify_core::{
    AcceptedFile, AnalysisResult, AnalysisService, Document, DocumentUpdate, Error, Result,
    UploadRef,
};

use crate::progress::{ProgressReporter, ProgressSource};
use crate::store::DocumentStore;

/// Failure reason recorded for cancelled documents.
pub const CANCELLED_REASON: &str = "Cancelled";

/// Drives one accepted file to a terminal state.
pub struct DocumentTask {
    document_id: Uuid,
    file: AcceptedFile,
    store: DocumentStore,
    analyzer: Arc<dyn AnalysisService>,
    progress: Arc<dyn ProgressSource>,
    pool: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl DocumentTask {
    pub fn new(
        document_id: Uuid,
        file: AcceptedFile,
        store: DocumentStore,
        analyzer: Arc<dyn AnalysisService>,
        progress: Arc<dyn ProgressSource>,
        pool: Arc<Semaphore>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            document_id,
            file,
            store,
            analyzer,
            progress,
            pool,
            cancel,
        }
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    /// Run to a terminal state and return the final document.
    ///
    /// Never returns an error: every failure, cancellation included, is
    /// recorded on the document as `Failed`.
    #[instrument(skip(self), fields(document_id = %self.document_id, file_name = %self.file.name))]
    pub async fn run(self) -> Option<Document> {
        let start = Instant::now();

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled(self.document_id)),
            result = self.execute() => result,
        };

        let update = match outcome {
            Ok(result) => DocumentUpdate::Complete(result),
            Err(Error::Cancelled(_)) => DocumentUpdate::Fail(CANCELLED_REASON.to_string()),
            Err(e) => DocumentUpdate::Fail(e.to_string()),
        };

        match self.store.apply(self.document_id, update).await {
            Ok(document) => {
                match document.failure.as_deref() {
                    None => info!(
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Document completed"
                    ),
                    Some(reason) => warn!(
                        duration_ms = start.elapsed().as_millis() as u64,
                        reason,
                        "Document failed"
                    ),
                }
                Some(document)
            }
            Err(e) => {
                warn!(error = %e, "Failed to record terminal state");
                self.store.get(self.document_id).await
            }
        }
    }

    async fn execute(&self) -> Result<AnalysisResult> {
        let _permit = self
            .pool
            .acquire()
            .await
            .map_err(|_| Error::Internal("task pool closed".to_string()))?;

        self.store
            .apply(self.document_id, DocumentUpdate::StartUpload)
            .await?;

        let (completed_tx, completed_rx) = oneshot::channel();
        let reporter = ProgressReporter::new(self.document_id, self.store.clone(), completed_tx);
        let (driven, completed) =
            tokio::join!(self.progress.drive(self.file.size(), reporter), completed_rx);
        driven?;
        completed.map_err(|_| {
            Error::Processing("upload ended before reaching 100%".to_string())
        })?;

        self.store
            .apply(self.document_id, DocumentUpdate::StartProcessing)
            .await?;

        self.analyzer
            .analyze(UploadRef {
                file_name: &self.file.name,
                media_type: &self.file.media_type,
                data: &self.file.data,
            })
            .await
    }
}
