//! # courtify-core
//!
//! Core types, traits, and abstractions for the Courtify intake-and-query core.
//!
//! This crate provides the document and message data model, the submission
//! validation gate, the event bus observers subscribe to, and the service
//! traits the other crates implement.

pub mod defaults;
pub mod error;
pub mod events;
pub mod models;
pub mod traits;
pub mod uuid_utils;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{CourtifyEvent, EventBus, EventEnvelope};
pub use models::*;
pub use traits::*;
pub use uuid_utils::new_v7;
pub use validation::{
    AcceptedFile, FileCandidate, ValidationError, ValidationGate, ACCEPTED_MEDIA_TYPES,
};
