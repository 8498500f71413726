//! Google Gemini client implementation.

use async_trait::async_trait;
use reqwest::Client;

use crate::generator::{GeminiError, Result, TextGenerator};
use crate::protocol::{GeminiRequest, GeminiResponse};
use logic_core::AgentConfig;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Google Gemini API client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client with an API key and the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set a custom base URL (e.g., for proxies or test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Build a client from environment configuration.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let api_key = config.api_key.as_deref().unwrap_or_default();
        if api_key.is_empty() {
            return Err(GeminiError::Auth(
                "Gemini API key is required".to_string(),
            ));
        }

        let mut client = Self::new(api_key);
        if let Some(base_url) = &config.base_url {
            if !base_url.is_empty() {
                client = client.with_base_url(base_url);
            }
        }
        if let Some(model) = &config.model {
            if !model.is_empty() {
                client = client.with_model(model);
            }
        }
        Ok(client)
    }

    /// Endpoint with query-param authentication.
    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest::from_prompt(prompt);

        log::debug!(
            "Gemini request: {} prompt chars, model '{}'",
            prompt.len(),
            self.model
        );

        let response = self
            .client
            .post(self.generate_url())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(GeminiError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.map_err(GeminiError::Http)?;

            if status == 401 || status == 403 {
                return Err(GeminiError::Auth(format!(
                    "Gemini authentication failed: {}. Please check your API key.",
                    body
                )));
            }

            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(GeminiError::Http)?;
        let parsed: GeminiResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("Gemini reply is not the expected envelope: {}", err);
                return Err(GeminiError::MissingText { raw: body });
            }
        };

        match parsed.first_text() {
            Some(text) => {
                log::debug!("Gemini reply: {} chars", text.len());
                Ok(text.to_string())
            }
            None => Err(GeminiError::MissingText { raw: body }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = GeminiClient::new("test_key");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_with_base_url() {
        let client = GeminiClient::new("test_key").with_base_url("https://custom.googleapis.com/v1");
        assert_eq!(client.base_url, "https://custom.googleapis.com/v1");
    }

    #[test]
    fn test_with_model() {
        let client = GeminiClient::new("test_key").with_model("gemini-1.5-pro");
        assert_eq!(client.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_chained_builders() {
        let client = GeminiClient::new("test_key")
            .with_base_url("https://custom.api.com")
            .with_model("gemini-exp");

        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.base_url, "https://custom.api.com");
        assert_eq!(client.model, "gemini-exp");
    }

    #[test]
    fn test_url_construction() {
        let client = GeminiClient::new("my_api_key_123")
            .with_base_url("https://test.api.com/v1beta")
            .with_model("gemini-custom");

        let expected =
            "https://test.api.com/v1beta/models/gemini-custom:generateContent?key=my_api_key_123";
        assert_eq!(client.generate_url(), expected);
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = AgentConfig {
            api_key: None,
            base_url: None,
            model: None,
            db_path: "unused.db".to_string(),
        };
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(GeminiError::Auth(_))
        ));

        let config = AgentConfig {
            api_key: Some("k".to_string()),
            base_url: Some("http://localhost:9".to_string()),
            model: Some(String::new()),
            db_path: "unused.db".to_string(),
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9");
        assert_eq!(client.model, DEFAULT_MODEL);
    }
}
