//! # courtify-inference
//!
//! Remote analysis/chat client with deterministic local fallback.
//!
//! This crate provides:
//! - [`RemoteBackend`]: raw HTTP calls to `/chat`, `/upload` and `/health`
//!   with lenient response parsing
//! - [`LocalKnowledgeResponder`]: keyword rule table and generic document summary
//! - [`ResilientClient`]: remote first, local fallback, never fails
//!
//! # Feature Flags
//!
//! - `mock`: expose [`mock::MockService`] to downstream test suites
//!
//! # Example
//!
//! ```rust,no_run
//! use courtify_inference::ResilientClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ResilientClient::from_env().expect("valid configuration");
//!     let reply = client.chat("What does Article 14 say?").await;
//!     println!("{}", reply.content);
//! }
//! ```

pub mod config;
pub mod fallback;
pub mod remote;
pub mod resilient;

// Mock services for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use courtify_core::*;

pub use config::ClientConfig;
pub use fallback::{KnowledgeRule, LocalKnowledgeResponder, GENERAL_GUIDANCE_REFERENCE, KNOWLEDGE_RULES};
pub use remote::{parse_chat_body, parse_upload_body, RemoteBackend};
pub use resilient::ResilientClient;
