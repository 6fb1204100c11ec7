//! Application state shared by every front end.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use courtify_core::{EventBus, EventEnvelope, Result};
use courtify_inference::ResilientClient;
use courtify_jobs::IntakeController;

use crate::config::AppConfig;
use crate::session::QuerySession;

/// One resilient client, one intake controller and one event bus.
///
/// Sessions created from the same instance share the client and the bus.
pub struct Courtify {
    config: AppConfig,
    client: Arc<ResilientClient>,
    events: EventBus,
    intake: IntakeController,
}

impl Courtify {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let client = Arc::new(ResilientClient::new(config.client.clone())?);
        let events = EventBus::new(config.event_capacity);
        let intake = IntakeController::new(config.intake.clone(), client.clone(), events.clone())?;

        info!(
            base_url = client.base_url(),
            max_concurrent_tasks = config.intake.max_concurrent_tasks,
            "Courtify initialized"
        );
        Ok(Self {
            config,
            client,
            events,
            intake,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(AppConfig::from_env())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<ResilientClient> {
        &self.client
    }

    pub fn intake(&self) -> &IntakeController {
        &self.intake
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    /// Start a new conversation using the configured session settings.
    pub fn session(&self) -> QuerySession {
        QuerySession::new(
            self.client.clone(),
            self.events.clone(),
            self.config.session.clone(),
        )
    }

    /// Cancel outstanding document tasks.
    pub fn shutdown(&self) {
        self.intake.shutdown();
    }
}
