//! Provider selection and construction
//!
//! Maps the `[provider]` config section onto a concrete [`LlmProvider`].

use crate::{ollama, openai, LlmError, LlmProvider, OllamaProvider, OpenAiProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Which backend serves completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI-compatible chat completions API
    OpenAi,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(format!("Unknown provider '{}' (expected ollama or openai)", other)),
        }
    }
}

/// Provider configuration
///
/// `endpoint` and `model` fall back to the backend's defaults when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backend kind
    pub kind: ProviderKind,

    /// API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Environment variable holding the API key (OpenAI only)
    pub api_key_env: String,

    /// Attempts per request when the transport fails (Ollama only)
    pub max_attempts: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Ollama,
            endpoint: None,
            model: None,
            temperature: ollama::DEFAULT_TEMPERATURE,
            api_key_env: openai::API_KEY_ENV.to_string(),
            max_attempts: ollama::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ProviderConfig {
    /// Endpoint in effect, after defaults
    pub fn endpoint(&self) -> &str {
        match (&self.endpoint, self.kind) {
            (Some(endpoint), _) => endpoint,
            (None, ProviderKind::Ollama) => ollama::DEFAULT_ENDPOINT,
            (None, ProviderKind::OpenAi) => openai::DEFAULT_ENDPOINT,
        }
    }

    /// Model in effect, after defaults
    pub fn model(&self) -> &str {
        match (&self.model, self.kind) {
            (Some(model), _) => model,
            (None, ProviderKind::Ollama) => ollama::DEFAULT_MODEL,
            (None, ProviderKind::OpenAi) => openai::DEFAULT_MODEL,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!("endpoint must be an http(s) URL, got '{}'", endpoint));
            }
        }
        if matches!(&self.model, Some(model) if model.trim().is_empty()) {
            return Err("model must not be empty".to_string());
        }
        if !(1..=10).contains(&self.max_attempts) {
            return Err("max_attempts must be between 1 and 10".to_string());
        }
        if self.kind == ProviderKind::OpenAi && self.api_key_env.trim().is_empty() {
            return Err("api_key_env must name an environment variable".to_string());
        }
        Ok(())
    }

    /// Construct the configured provider
    ///
    /// `timeout` bounds each HTTP request.
    pub fn build(&self, timeout: Duration) -> Result<Box<dyn LlmProvider>, LlmError> {
        self.validate().map_err(LlmError::Configuration)?;
        info!(provider = %self.kind, model = self.model(), endpoint = self.endpoint(), "Building LLM provider");

        let provider: Box<dyn LlmProvider> = match self.kind {
            ProviderKind::Ollama => Box::new(
                OllamaProvider::with_timeout(self.endpoint(), self.model(), timeout)?
                    .with_temperature(self.temperature)
                    .with_max_attempts(self.max_attempts),
            ),
            ProviderKind::OpenAi => Box::new(
                OpenAiProvider::from_env(self.endpoint(), self.model(), &self.api_key_env, timeout)?
                    .with_temperature(self.temperature),
            ),
        };
        Ok(provider)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProviderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint(), ollama::DEFAULT_ENDPOINT);
        assert_eq!(config.model(), ollama::DEFAULT_MODEL);
    }

    #[test]
    fn test_openai_defaults() {
        let config = ProviderConfig {
            kind: ProviderKind::OpenAi,
            ..Default::default()
        };
        assert_eq!(config.endpoint(), openai::DEFAULT_ENDPOINT);
        assert_eq!(config.model(), openai::DEFAULT_MODEL);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert_eq!(" OpenAI ".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert!("claude".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_invalid_temperature() {
        let config = ProviderConfig {
            temperature: 3.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_attempts_bounds() {
        assert_eq!(ProviderConfig::default().max_attempts, 2);

        let config = ProviderConfig::from_toml("max_attempts = 0").unwrap();
        assert!(config.validate().is_err());

        let config = ProviderConfig::from_toml("max_attempts = 4").unwrap();
        assert!(config.validate().is_ok());
        assert!(config.build(std::time::Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = ProviderConfig {
            endpoint: Some("localhost:11434".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ProviderConfig::from_toml(
            r#"
            kind = "openai"
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();
        assert_eq!(config.kind, ProviderKind::OpenAi);
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.api_key_env, openai::API_KEY_ENV);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ProviderConfig {
            kind: ProviderKind::Ollama,
            endpoint: Some("http://gpu-box:11434".to_string()),
            model: Some("mistral".to_string()),
            temperature: 0.2,
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_attempts: 3,
        };
        let parsed = ProviderConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_build_ollama() {
        let provider = ProviderConfig::default()
            .build(Duration::from_secs(5))
            .unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), ollama::DEFAULT_MODEL);
    }

    #[test]
    fn test_build_openai_without_key() {
        let config = ProviderConfig {
            kind: ProviderKind::OpenAi,
            api_key_env: "LITERATE_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        let result = config.build(Duration::from_secs(5));
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }
}
