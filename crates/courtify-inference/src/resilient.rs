//! Remote-first client that degrades to the local responder.
//!
//! `chat` and `analyze` never fail: a transport error, a non-success status
//! or an unexpected body shape is logged, counted and replaced by the
//! [`LocalKnowledgeResponder`] answer. Callers cannot tell a degraded answer
//! from a remote one by the returned value; [`ResilientClient::fallback_count`]
//! exists for diagnostics only.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{info, warn};

use courtify_core::{AnalysisResult, AnalysisService, ChatReply, ChatService, Result, UploadRef};

use crate::config::ClientConfig;
use crate::fallback::LocalKnowledgeResponder;
use crate::remote::RemoteBackend;

/// Resilient response resolver for chat and document analysis.
#[derive(Debug)]
pub struct ResilientClient {
    remote: RemoteBackend,
    fallback: LocalKnowledgeResponder,
    fallback_count: AtomicU64,
}

impl ResilientClient {
    /// Create a client for the given remote configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            "Initializing resilient client"
        );
        Ok(Self {
            remote: RemoteBackend::new(config)?,
            fallback: LocalKnowledgeResponder::new(),
            fallback_count: AtomicU64::new(0),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Replace the local responder (custom rule tables).
    pub fn with_fallback(mut self, fallback: LocalKnowledgeResponder) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.remote.config().base_url
    }

    /// Answer a question, remotely if possible.
    pub async fn chat(&self, message: &str) -> ChatReply {
        match self.remote.chat(message).await {
            Ok(reply) => reply,
            Err(e) => {
                self.record_fallback("/chat", &e);
                self.fallback.chat(message)
            }
        }
    }

    /// Summarize a document, remotely if possible.
    pub async fn analyze(&self, upload: UploadRef<'_>) -> AnalysisResult {
        match self.remote.upload(upload).await {
            Ok(result) => result,
            Err(e) => {
                self.record_fallback("/upload", &e);
                self.fallback.analyze_fallback()
            }
        }
    }

    /// Whether the remote service currently answers its health probe.
    pub async fn health_check(&self) -> bool {
        self.remote.health_check().await
    }

    /// Number of answers substituted by the local responder so far.
    pub fn fallback_count(&self) -> u64 {
        self.fallback_count.load(Ordering::Relaxed)
    }

    fn record_fallback(&self, endpoint: &'static str, error: &courtify_core::Error) {
        self.fallback_count.fetch_add(1, Ordering::Relaxed);
        warn!(
            endpoint,
            fallback = true,
            transport = error.is_transport(),
            error = %error,
            "Remote call failed, using local fallback"
        );
    }
}

#[async_trait]
impl ChatService for ResilientClient {
    async fn chat(&self, message: &str) -> Result<ChatReply> {
        Ok(ResilientClient::chat(self, message).await)
    }
}

#[async_trait]
impl AnalysisService for ResilientClient {
    async fn analyze(&self, upload: UploadRef<'_>) -> Result<AnalysisResult> {
        Ok(ResilientClient::analyze(self, upload).await)
    }
}
