//! Service traits consumed by document tasks and query sessions.
//!
//! The resilient client implements both; tests substitute mocks.

use async_trait::async_trait;

use crate::models::{AnalysisResult, ChatReply};
use crate::Result;

/// Payload handed to an analysis service.
#[derive(Debug, Clone, Copy)]
pub struct UploadRef<'a> {
    pub file_name: &'a str,
    pub media_type: &'a str,
    pub data: &'a [u8],
}

/// Produces a summary and key points for a document.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Analyze a document. An `Err` is a processing failure, not a transport one.
    async fn analyze(&self, upload: UploadRef<'_>) -> Result<AnalysisResult>;
}

/// Answers free-text legal questions.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn chat(&self, message: &str) -> Result<ChatReply>;
}
