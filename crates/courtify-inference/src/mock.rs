//! Mock analysis/chat services for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use courtify_inference::mock::MockService;
//!
//! let service = MockService::new()
//!     .with_summary("Short summary", &["point"])
//!     .with_latency_ms(50);
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use courtify_core::{AnalysisResult, AnalysisService, ChatReply, ChatService, Error, Result, UploadRef};

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub operation: &'static str,
    pub input: String,
}

#[derive(Debug, Clone)]
struct MockConfig {
    analysis: AnalysisResult,
    reply: ChatReply,
    failure: Option<String>,
    latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisResult {
                summary: "Mock summary".to_string(),
                key_points: vec!["Mock point".to_string()],
            },
            reply: ChatReply {
                content: "Mock response".to_string(),
                reference: Some("Mock reference".to_string()),
                sources: None,
            },
            failure: None,
            latency_ms: 0,
        }
    }
}

/// Configurable stand-in for the resilient client.
#[derive(Debug, Clone, Default)]
pub struct MockService {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed analysis result.
    pub fn with_summary(mut self, summary: impl Into<String>, key_points: &[&str]) -> Self {
        Arc::make_mut(&mut self.config).analysis = AnalysisResult {
            summary: summary.into(),
            key_points: key_points.iter().map(|p| p.to_string()).collect(),
        };
        self
    }

    /// Fixed chat reply.
    pub fn with_reply(mut self, content: impl Into<String>, reference: Option<&str>) -> Self {
        Arc::make_mut(&mut self.config).reply = ChatReply {
            content: content.into(),
            reference: reference.map(String::from),
            sources: None,
        };
        self
    }

    /// Make every call fail with a processing error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    /// Simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    async fn enter(&self, operation: &'static str, input: &str) -> Result<()> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(MockCall {
                operation,
                input: input.to_string(),
            });
        }
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        match &self.config.failure {
            Some(message) => Err(Error::Processing(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AnalysisService for MockService {
    async fn analyze(&self, upload: UploadRef<'_>) -> Result<AnalysisResult> {
        self.enter("analyze", upload.file_name).await?;
        Ok(self.config.analysis.clone())
    }
}

#[async_trait]
impl ChatService for MockService {
    async fn chat(&self, message: &str) -> Result<ChatReply> {
        self.enter("chat", message).await?;
        Ok(self.config.reply.clone())
    }
}
