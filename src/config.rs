//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Default pause between an accepted answer and the next prompt.
pub const DEFAULT_STEP_DELAY_MS: u64 = 600;

/// Default request timeout for the form-intake endpoint.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Conversation behaviour.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Delay before the next step's prompt is shown.
    pub step_delay: Duration,
    /// Whether the service-category branch is offered.
    /// When false the branch step is crossed and `service` is not submitted.
    pub offer_services: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
            offer_services: true,
        }
    }
}

impl ConversationConfig {
    /// Load from `INTAKE_STEP_DELAY_MS` and `INTAKE_OFFER_SERVICES`, falling
    /// back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let step_delay_ms: u64 = std::env::var("INTAKE_STEP_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_STEP_DELAY_MS);

        let offer_services = std::env::var("INTAKE_OFFER_SERVICES")
            .ok()
            .and_then(|s| parse_bool(&s))
            .unwrap_or(true);

        Self {
            step_delay: Duration::from_millis(step_delay_ms),
            offer_services,
        }
    }
}

/// Where and how the collected answers are posted.
#[derive(Debug, Clone)]
pub struct FormIntakeConfig {
    /// Full URL of the form-intake endpoint.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl FormIntakeConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load from `INTAKE_ENDPOINT` (required) and `INTAKE_TIMEOUT_SECS`.
    /// The endpoint is checked when the client is built.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = std::env::var("INTAKE_ENDPOINT")
            .map_err(|_| ConfigError::MissingEnvVar("INTAKE_ENDPOINT".to_string()))?;

        let timeout_secs: u64 = std::env::var("INTAKE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
