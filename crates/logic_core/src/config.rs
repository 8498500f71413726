//! Environment-backed configuration.

use serde::{Deserialize, Serialize};

/// Default location of the history database.
pub const DEFAULT_DB_PATH: &str = "logic_history.db";

/// Runtime configuration assembled from the environment.
///
/// Pure data: nothing here opens connections or reads files. Missing keys
/// surface when the client is constructed, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub db_path: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentConfig {
    /// Read configuration from the environment, with code defaults.
    pub fn new() -> Self {
        let mut config = AgentConfig {
            api_key: None,
            base_url: None,
            model: None,
            db_path: DEFAULT_DB_PATH.to_string(),
        };

        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            config.api_key = Some(api_key);
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = Some(base_url);
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = Some(model);
        }
        if let Ok(db_path) = std::env::var("HISTORY_DB_PATH") {
            config.db_path = db_path;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_apply() {
        std::env::set_var("HISTORY_DB_PATH", "/tmp/agent-test.db");
        let config = AgentConfig::new();
        assert_eq!(config.db_path, "/tmp/agent-test.db");
        std::env::remove_var("HISTORY_DB_PATH");

        let config = AgentConfig::new();
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
    }
}
