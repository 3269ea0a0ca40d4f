use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Language model settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// YouTube Data API settings
    #[serde(default)]
    pub youtube: YouTubeConfig,
    /// Unsplash photo search settings
    #[serde(default)]
    pub unsplash: UnsplashConfig,
    /// Instagram web client settings
    #[serde(default)]
    pub instagram: InstagramConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            youtube: YouTubeConfig::default(),
            unsplash: UnsplashConfig::default(),
            instagram: InstagramConfig::default(),
            timeout: default_timeout(),
        }
    }
}

/// Language model configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Default provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
        }
    }
}

impl LlmConfig {
    /// Look up a provider's configuration, falling back to defaults for that
    /// provider when the config file does not mention it.
    pub fn provider(&self, name: &str) -> ProviderConfig {
        let defaults = ProviderConfig::default_for(name);
        match self.providers.get(name) {
            Some(configured) => {
                let mut config = configured.clone();
                // A table holding only a key or base URL keeps the default model
                if config.model.trim().is_empty() {
                    config.model = defaults.model;
                }
                config
            }
            None => defaults,
        }
    }
}

/// Configuration for a specific LLM provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "gpt-3.5-turbo"); empty means the provider's default
    #[serde(default)]
    pub model: String,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

impl ProviderConfig {
    fn default_for(name: &str) -> Self {
        let model = match name {
            "anthropic" => "claude-3-5-haiku-20241022",
            "ollama" => "llama3.1",
            _ => "gpt-3.5-turbo",
        };
        Self {
            enabled: true,
            model: model.to_string(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct YouTubeConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Fetch video durations and count shorts vs regular uploads
    #[serde(default = "default_enabled")]
    pub classify_durations: bool,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            classify_durations: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UnsplashConfig {
    pub access_key: Option<String>,
    pub base_url: Option<String>,
    /// Number of images requested per product
    #[serde(default = "default_images_per_product")]
    pub images_per_product: u32,
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            base_url: None,
            images_per_product: default_images_per_product(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct InstagramConfig {
    pub base_url: Option<String>,
    /// Session cookie for logged-in requests, if any
    pub session_id: Option<String>,
}

// Default value functions
fn default_provider() -> String {
    "openai".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_images_per_product() -> u32 {
    1
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with INSIGHTS__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: INSIGHTS__LLM__PROVIDERS__OPENAI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// YouTube key from config, then the `YOUTUBE_API_KEY` environment variable
    pub fn youtube_api_key(&self) -> Option<String> {
        self.youtube
            .api_key
            .clone()
            .or_else(|| std::env::var("YOUTUBE_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Unsplash key from config, then the `UNSPLASH_ACCESS_KEY` environment variable
    pub fn unsplash_access_key(&self) -> Option<String> {
        self.unsplash
            .access_key
            .clone()
            .or_else(|| std::env::var("UNSPLASH_ACCESS_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Load configuration from `config.toml` (optional) and `INSIGHTS__*` variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_with_environment(insights_environment())
}

fn insights_environment() -> Environment {
    Environment::with_prefix("INSIGHTS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn load_with_environment(environment: Environment) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(environment)
        .build()?;

    settings.try_deserialize()
}
