use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_API_KEY: &str = "SHOPASSIST_API_KEY";
pub const ENV_AGENT_ENDPOINT: &str = "SHOPASSIST_AGENT_ENDPOINT";
pub const ENV_INGESTION_ENDPOINT: &str = "SHOPASSIST_INGESTION_ENDPOINT";

/// Connection and timing settings for one assistant session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Recommendation agent the session talks to
    pub agent_id: String,
    /// Knowledge base that uploads are ingested into
    pub knowledge_base_id: String,
    pub agent_endpoint: String,
    pub ingestion_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    /// How long a successful upload status stays visible
    pub status_clear_delay_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            agent_id: "698e12e883ad001445fb4f9a".to_string(),
            knowledge_base_id: "698e12c19cd132f4b7b4d67e".to_string(),
            agent_endpoint: "http://localhost:8080/api/agent/invoke".to_string(),
            ingestion_endpoint: "http://localhost:8080/api/knowledge-base/upload".to_string(),
            api_key: None,
            request_timeout_secs: 60,
            status_clear_delay_ms: 5_000,
        }
    }
}

impl AppSettings {
    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_millis(self.status_clear_delay_ms)
    }

    /// Apply `SHOPASSIST_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; blank values are ignored
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = value(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = value(ENV_AGENT_ENDPOINT) {
            self.agent_endpoint = endpoint;
        }
        if let Some(endpoint) = value(ENV_INGESTION_ENDPOINT) {
            self.ingestion_endpoint = endpoint;
        }
        self
    }
}
