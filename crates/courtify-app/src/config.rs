//! Application configuration assembled from the per-layer configs.

use courtify_core::defaults;
use courtify_core::Result;
use courtify_inference::ClientConfig;
use courtify_jobs::IntakeConfig;

use crate::session::SessionConfig;

/// Everything needed to build a [`crate::Courtify`] instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub intake: IntakeConfig,
    pub session: SessionConfig,
    /// Broadcast buffer size for the shared event bus.
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            intake: IntakeConfig::default(),
            session: SessionConfig::default(),
            event_capacity: defaults::EVENT_BUS_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Read every layer's settings from the environment.
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            intake: IntakeConfig::from_env(),
            session: SessionConfig::from_env(),
            event_capacity: defaults::env_or(
                defaults::ENV_EVENT_CAPACITY,
                defaults::EVENT_BUS_CAPACITY,
            ),
        }
    }

    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn with_intake(mut self, intake: IntakeConfig) -> Self {
        self.intake = intake;
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.client.validate()?;
        self.intake.validate()?;
        if self.event_capacity == 0 {
            return Err(courtify_core::Error::Config(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
