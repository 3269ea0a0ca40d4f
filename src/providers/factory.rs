use crate::config::{LlmConfig, ProviderConfig};
use crate::providers::{AnthropicProvider, LlmProvider, OllamaProvider, OpenAIProvider};
use crate::InsightError;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
    ) -> Result<Box<dyn LlmProvider>, InsightError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(InsightError::InvalidInput(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        match provider_name {
            "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config)?)),
            "ollama" => Ok(Box::new(OllamaProvider::new(config))),
            _ => Err(InsightError::InvalidInput(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Create the named provider, or the configured default when `name` is `None`
    pub fn from_config(
        config: &LlmConfig,
        name: Option<&str>,
    ) -> Result<Box<dyn LlmProvider>, InsightError> {
        let provider_name = name.unwrap_or(config.default_provider.as_str());
        Self::create(provider_name, &config.provider(provider_name))
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic", "ollama"]
    }
}
