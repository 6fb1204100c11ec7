//! HTTP backend for the remote analysis/chat service.
//!
//! Every method returns an error for transport failures, non-success
//! statuses and bodies that do not fit the expected shape. Deciding what to do
//! about those errors is the resilient client's job.

use std::time::Instant;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use courtify_core::defaults::{HEALTH_TIMEOUT_SECS, UPLOAD_FIELD};
use courtify_core::{AnalysisResult, ChatReply, Error, Result, UploadRef};

use crate::config::ClientConfig;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Raw client for `POST /chat`, `POST /upload` and `GET /health`.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    config: ClientConfig,
}

impl RemoteBackend {
    /// Build the HTTP client. Fails only on an invalid configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Ask a question.
    #[instrument(skip(self, message), fields(endpoint = "/chat"))]
    pub async fn chat(&self, message: &str) -> Result<ChatReply> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.config.endpoint("/chat"))
            .json(&ChatRequest { message })
            .send()
            .await?;

        let body = read_json(response).await?;
        let reply = parse_chat_body(&body)?;
        debug!(
            response_len = reply.content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Remote chat answered"
        );
        Ok(reply)
    }

    /// Upload a document for summarization.
    #[instrument(skip(self, upload), fields(endpoint = "/upload", file_name = %upload.file_name))]
    pub async fn upload(&self, upload: UploadRef<'_>) -> Result<AnalysisResult> {
        let start = Instant::now();
        let part = reqwest::multipart::Part::bytes(upload.data.to_vec())
            .file_name(upload.file_name.to_string())
            .mime_str(upload.media_type)
            .map_err(|e| Error::Request(format!("Failed to create multipart: {}", e)))?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(self.config.endpoint("/upload"))
            .multipart(form)
            .send()
            .await?;

        let body = read_json(response).await?;
        let result = parse_upload_body(&body)?;
        debug!(
            key_points = result.key_points.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Remote upload analyzed"
        );
        Ok(result)
    }

    /// Probe `GET /health`. Unreachable or non-2xx is `false`, never an error.
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.config.endpoint("/health"))
            .timeout(std::time::Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Reject non-2xx responses, then decode the body as JSON.
async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::RemoteStatus {
            status: status.as_u16(),
            body,
        });
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Read a chat answer, tolerating `content`/`answer` naming drift.
pub fn parse_chat_body(body: &Value) -> Result<ChatReply> {
    let obj = body
        .as_object()
        .ok_or_else(|| Error::Serialization("chat response is not a JSON object".to_string()))?;

    let content = ["content", "answer"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .ok_or_else(|| {
            Error::Serialization("chat response has no `content` or `answer` text".to_string())
        })?;

    Ok(ChatReply {
        content: content.to_string(),
        reference: obj
            .get("reference")
            .and_then(Value::as_str)
            .map(String::from),
        sources: obj.get("sources").and_then(string_list),
    })
}

/// Read a document analysis, tolerating the known field layouts:
/// `summary` | `result.summary`, and `keyPoints` | `key_points` | `result.keyPoints`.
pub fn parse_upload_body(body: &Value) -> Result<AnalysisResult> {
    if !body.is_object() {
        return Err(Error::Serialization(
            "upload response is not a JSON object".to_string(),
        ));
    }

    let summary = body
        .get("summary")
        .and_then(Value::as_str)
        .or_else(|| body.pointer("/result/summary").and_then(Value::as_str))
        .ok_or_else(|| {
            let detail = body
                .get("error")
                .and_then(Value::as_str)
                .map(|e| format!(" (remote error: {})", e))
                .unwrap_or_default();
            Error::Serialization(format!("upload response has no summary{}", detail))
        })?;

    let key_points = ["/keyPoints", "/key_points", "/result/keyPoints"]
        .iter()
        .find_map(|pointer| body.pointer(pointer).and_then(string_list))
        .unwrap_or_default();

    Ok(AnalysisResult {
        summary: summary.to_string(),
        key_points,
    })
}

/// Collect the string entries of a JSON array, skipping anything else.
fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect()
    })
}
