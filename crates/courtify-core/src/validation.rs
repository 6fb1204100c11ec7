//! Submission-time validation of file candidates.
//!
//! The gate enforces two rules, checked in order:
//! 1. The media type is one of the accepted document types
//! 2. The byte size does not exceed [`MAX_UPLOAD_BYTES`]
//!
//! Candidates with no declared media type have it resolved from magic bytes,
//! then from the file extension, before the rules run.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::defaults::MAX_UPLOAD_BYTES;

/// PDF documents.
pub const MIME_PDF: &str = "application/pdf";
/// Legacy binary Word documents (`.doc`).
pub const MIME_MSWORD: &str = "application/msword";
/// Word open-XML documents (`.docx`).
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Plain text.
pub const MIME_TEXT: &str = "text/plain";

/// Media types the intake accepts.
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &[MIME_PDF, MIME_MSWORD, MIME_DOCX, MIME_TEXT];

/// A raw file offered for submission.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    /// Declared media type; may be empty when the caller does not know it.
    pub media_type: String,
    pub data: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Structured rejection reason, carrying the candidate's name.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{name} is not a supported document type. Please upload PDF, DOC, DOCX, or TXT files.")]
    UnsupportedType { name: String, media_type: String },

    #[error("{name} exceeds the 10MB size limit.")]
    TooLarge { name: String, size: u64, limit: u64 },
}

impl ValidationError {
    /// Name of the offending file.
    pub fn file_name(&self) -> &str {
        match self {
            Self::UnsupportedType { name, .. } | Self::TooLarge { name, .. } => name,
        }
    }

    /// Short title for user-facing notifications.
    pub fn title(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "Invalid file type",
            Self::TooLarge { .. } => "File too large",
        }
    }
}

/// A candidate that passed validation, with its resolved media type.
#[derive(Debug, Clone)]
pub struct AcceptedFile {
    pub name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl AcceptedFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Type and size policy for submitted files.
#[derive(Debug, Clone)]
pub struct ValidationGate {
    max_size_bytes: u64,
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self {
            max_size_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ValidationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the size ceiling.
    pub fn with_max_size(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Classify one candidate. Pure: no side effects beyond a debug log.
    pub fn validate(&self, candidate: FileCandidate) -> Result<AcceptedFile, ValidationError> {
        let media_type = resolve_media_type(&candidate.name, &candidate.data, &candidate.media_type);

        if !is_accepted_media_type(&media_type) {
            debug!(file_name = %candidate.name, %media_type, "Rejected unsupported type");
            return Err(ValidationError::UnsupportedType {
                name: candidate.name,
                media_type,
            });
        }

        let size = candidate.size();
        if size > self.max_size_bytes {
            debug!(file_name = %candidate.name, size, "Rejected oversized file");
            return Err(ValidationError::TooLarge {
                name: candidate.name,
                size,
                limit: self.max_size_bytes,
            });
        }

        Ok(AcceptedFile {
            name: candidate.name,
            media_type,
            data: candidate.data,
        })
    }

    /// Classify a batch; a rejection never blocks its siblings.
    pub fn partition(
        &self,
        candidates: impl IntoIterator<Item = FileCandidate>,
    ) -> (Vec<AcceptedFile>, Vec<ValidationError>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for candidate in candidates {
            match self.validate(candidate) {
                Ok(file) => accepted.push(file),
                Err(reason) => rejected.push(reason),
            }
        }
        (accepted, rejected)
    }
}

/// Whether a media type belongs to the accepted set (parameters ignored).
pub fn is_accepted_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    ACCEPTED_MEDIA_TYPES.contains(&essence.as_str())
}

/// Resolve the effective media type of a candidate.
///
/// A non-empty declared type is trusted. Otherwise magic-byte detection is
/// tried, then the extension; unknown files resolve to
/// `application/octet-stream`.
pub fn resolve_media_type(name: &str, data: &[u8], declared: &str) -> String {
    let declared = declared.trim();
    if !declared.is_empty() {
        return declared.to_string();
    }

    if let Some(kind) = infer::get(data) {
        let sniffed = kind.mime_type();
        // .docx sniffs as a generic zip container; the extension is more precise.
        if sniffed != "application/zip" {
            return sniffed.to_string();
        }
    }

    name.rsplit_once('.')
        .and_then(|(_, ext)| media_type_from_extension(ext))
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Map the accepted document extensions to media types.
pub fn media_type_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "pdf" => Some(MIME_PDF),
        "doc" => Some(MIME_MSWORD),
        "docx" => Some(MIME_DOCX),
        "txt" => Some(MIME_TEXT),
        _ => None,
    }
}
