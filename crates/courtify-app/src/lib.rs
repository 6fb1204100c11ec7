//! # courtify-app
//!
//! Application layer for Courtify: the legal query session, the shared
//! application state and the `courtify` command-line front end.
//!
//! ## Example
//!
//! ```ignore
//! use courtify_app::Courtify;
//!
//! let app = Courtify::from_env()?;
//! let session = app.session();
//! if let Some(reply) = session.ask("What does Article 14 say?").await {
//!     println!("{}", reply.content);
//! }
//! ```

pub mod app;
pub mod config;
pub mod session;

pub use app::Courtify;
pub use config::AppConfig;
pub use session::{sanitize, QuerySession, SessionConfig, APOLOGY, GREETING, GREETING_REFERENCE};

// Re-export the layers below
pub use courtify_core::*;
pub use courtify_inference::{ClientConfig, LocalKnowledgeResponder, ResilientClient};
pub use courtify_jobs::{DocumentStore, IntakeConfig, IntakeController, CANCELLED_REASON};
