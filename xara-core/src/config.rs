use crate::intent::default_feedback_intents;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid agent base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("agent base URL must use http or https, got {0:?}")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub timings: WidgetTimings,
    #[serde(default = "default_feedback_intents")]
    pub feedback_intents: Vec<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            timings: WidgetTimings::default(),
            feedback_intents: default_feedback_intents(),
        }
    }
}

impl WidgetConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.agent.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    // `None` (or empty) means same-origin relative paths, e.g. behind a dev proxy.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl AgentConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Origin for the streaming channel, derived from the HTTP origin.
    pub fn ws_base_url(&self) -> String {
        let base = self.base_url();
        if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url();
        if base.is_empty() {
            return Ok(());
        }

        let parsed = url::Url::parse(base).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base.to_string(),
            source,
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Every delay the controller schedules, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetTimings {
    pub inactivity_timeout_ms: u64,
    pub survey_open_delay_ms: u64,
    pub survey_dismiss_delay_ms: u64,
    pub speech_hard_timeout_ms: u64,
    pub final_result_grace_ms: u64,
    pub end_of_speech_grace_ms: u64,
    pub speech_hint_ttl_ms: u64,
}

impl Default for WidgetTimings {
    fn default() -> Self {
        Self {
            inactivity_timeout_ms: 180_000,
            survey_open_delay_ms: 300,
            survey_dismiss_delay_ms: 500,
            speech_hard_timeout_ms: 10_000,
            final_result_grace_ms: 1_500,
            end_of_speech_grace_ms: 500,
            speech_hint_ttl_ms: 3_000,
        }
    }
}

impl WidgetTimings {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.inactivity_timeout_ms)
    }

    pub fn survey_open_delay(&self) -> Duration {
        Duration::from_millis(self.survey_open_delay_ms)
    }

    pub fn survey_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.survey_dismiss_delay_ms)
    }

    pub fn speech_hard_timeout(&self) -> Duration {
        Duration::from_millis(self.speech_hard_timeout_ms)
    }

    pub fn final_result_grace(&self) -> Duration {
        Duration::from_millis(self.final_result_grace_ms)
    }

    pub fn end_of_speech_grace(&self) -> Duration {
        Duration::from_millis(self.end_of_speech_grace_ms)
    }

    pub fn speech_hint_ttl(&self) -> Duration {
        Duration::from_millis(self.speech_hint_ttl_ms)
    }
}
