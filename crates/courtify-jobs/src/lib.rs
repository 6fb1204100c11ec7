//! # courtify-jobs
//!
//! Document intake for Courtify.
//!
//! This crate provides:
//! - [`DocumentStore`]: the owned document collection with a single mutation path
//! - [`ProgressSource`] implementations that drive upload progress
//! - [`DocumentTask`]: the per-document lifecycle state machine
//! - [`IntakeController`]: validation, document creation and a bounded task pool
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courtify_jobs::{EventBus, FileCandidate, IntakeConfig, IntakeController};
//! use courtify_inference::ResilientClient;
//!
//! let client = Arc::new(ResilientClient::from_env()?);
//! let intake = IntakeController::new(IntakeConfig::from_env(), client, EventBus::default())?;
//!
//! let accepted = intake
//!     .submit(vec![FileCandidate::new("lease.pdf", "application/pdf", bytes)])
//!     .await;
//! for doc in accepted {
//!     let done = intake.wait(doc.id).await?;
//!     println!("{}: {}", done.name, done.status);
//! }
//! ```

pub mod intake;
pub mod progress;
pub mod store;
pub mod task;

// Re-export core types
pub use courtify_core::*;

pub use intake::{IntakeConfig, IntakeController};
pub use progress::{ProgressReporter, ProgressSource, TimerProgress};
pub use store::DocumentStore;
pub use task::{DocumentTask, CANCELLED_REASON};
