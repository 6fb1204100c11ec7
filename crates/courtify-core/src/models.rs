//! Data model for documents, analysis results, and conversation messages.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::uuid_utils::new_v7;

// =============================================================================
// DOCUMENT
// =============================================================================

/// Lifecycle status of a submitted document.
///
/// The only legal path is `Queued -> Uploading -> Processing -> {Completed, Failed}`,
/// with `Failed` also reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Queued,
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    /// Completed and Failed documents are immutable.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, next),
            (Queued, Uploading)
                | (Uploading, Processing)
                | (Processing, Completed)
                | (Queued | Uploading | Processing, Failed)
        )
    }

    /// Human-readable label as shown next to a document.
    pub fn label(self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Uploading => "Uploading...",
            Self::Processing => "Processing...",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Summary and key points produced for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// One user-submitted file tracked through upload and processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub media_type: String,
    pub status: DocumentStatus,
    pub upload_progress: u8,
    /// Set iff `status == Completed`.
    pub result: Option<AnalysisResult>,
    /// User-facing reason, set iff `status == Failed`.
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single mutation applied to a [`Document`] by its owning task.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentUpdate {
    /// Queued -> Uploading, progress 0.
    StartUpload,
    /// New upload percentage while Uploading.
    Progress(u8),
    /// Uploading -> Processing (progress must already be 100).
    StartProcessing,
    /// Processing -> Completed with the analysis result.
    Complete(AnalysisResult),
    /// Any non-terminal state -> Failed.
    Fail(String),
}

impl Document {
    /// Create a freshly accepted document in `Queued` with a new id.
    pub fn new(name: impl Into<String>, size: u64, media_type: impl Into<String>) -> Self {
        Self {
            id: new_v7(),
            name: name.into(),
            size,
            media_type: media_type.into(),
            status: DocumentStatus::Queued,
            upload_progress: 0,
            result: None,
            failure: None,
            created_at: Utc::now(),
        }
    }

    /// Apply an update, enforcing the lifecycle invariants.
    ///
    /// Returns `Ok(true)` when the document changed and `Ok(false)` for an
    /// idempotent progress report. On error the document is left untouched.
    pub fn apply(&mut self, update: DocumentUpdate) -> Result<bool> {
        match update {
            DocumentUpdate::StartUpload => {
                self.transition(DocumentStatus::Uploading)?;
                self.upload_progress = 0;
                Ok(true)
            }
            DocumentUpdate::Progress(percent) => {
                if self.status != DocumentStatus::Uploading {
                    return Err(self.invalid(DocumentStatus::Uploading));
                }
                let percent = percent.min(100);
                if percent <= self.upload_progress {
                    return Ok(false);
                }
                self.upload_progress = percent;
                Ok(true)
            }
            DocumentUpdate::StartProcessing => {
                if self.status == DocumentStatus::Uploading && self.upload_progress < 100 {
                    return Err(Error::Processing(format!(
                        "document {} left upload at {}%",
                        self.id, self.upload_progress
                    )));
                }
                self.transition(DocumentStatus::Processing)?;
                Ok(true)
            }
            DocumentUpdate::Complete(result) => {
                self.transition(DocumentStatus::Completed)?;
                self.result = Some(result);
                Ok(true)
            }
            DocumentUpdate::Fail(reason) => {
                self.transition(DocumentStatus::Failed)?;
                self.failure = Some(reason);
                Ok(true)
            }
        }
    }

    fn transition(&mut self, next: DocumentStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(self.invalid(next));
        }
        self.status = next;
        Ok(())
    }

    fn invalid(&self, to: DocumentStatus) -> Error {
        Error::InvalidTransition {
            id: self.id,
            from: self.status,
            to,
        }
    }

    /// Human-readable size, e.g. `"1.5 KB"`.
    pub fn display_size(&self) -> String {
        format_file_size(self.size)
    }

    /// Plain-text summary report for a completed document.
    pub fn summary_report(&self) -> Option<String> {
        let result = self.result.as_ref()?;
        let mut report = format!(
            "Document: {}\nSize: {}\n\nSummary\n{}\n",
            self.name,
            self.display_size(),
            result.summary
        );
        if !result.key_points.is_empty() {
            report.push_str("\nKey Points\n");
            for point in &result.key_points {
                report.push_str("  • ");
                report.push_str(point);
                report.push('\n');
            }
        }
        Some(report)
    }
}

/// Format a byte count using base-1024 units and at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

// =============================================================================
// CHAT
// =============================================================================

/// Answer returned for a free-text legal question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in a legal-query conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>, reference: Option<String>) -> Self {
        Self::new(Role::Assistant, content.into(), reference)
    }

    fn new(role: Role, content: String, reference: Option<String>) -> Self {
        Self {
            id: new_v7(),
            role,
            content,
            created_at: Utc::now(),
            reference,
        }
    }
}
