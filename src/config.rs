use serde::Deserialize;
use std::env;
use thiserror::Error;

const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_MAX_TOKENS: u32 = 3000;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_BATCH_MAX_FILES: usize = 15;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration, loaded once at startup and passed to the components that need it.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Backend used for text completions.
    pub llm_provider: LlmProvider,
    /// Model identifier passed to the provider.
    pub llm_model: String,
    /// Token budget requested for every completion.
    pub llm_max_tokens: u32,
    /// API key for the OpenAI provider.
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Optional HTTP timeout applied by the LLM client.
    pub llm_timeout_secs: Option<u64>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Maximum number of files handled by one batch run.
    pub batch_max_files: usize,
}

/// Supported completion backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Hosted OpenAI chat completions API.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
    /// Completions disabled; every call reports a failure and yields empty text.
    None,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::OpenAI,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_max_tokens: DEFAULT_LLM_MAX_TOKENS,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            llm_timeout_secs: None,
            server_port: None,
            batch_max_files: DEFAULT_BATCH_MAX_FILES,
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup, applying defaults and validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            llm_provider: optional("LLM_PROVIDER")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("LLM_PROVIDER".to_string()))
                })
                .transpose()?
                .unwrap_or(defaults.llm_provider),
            llm_model: optional("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_max_tokens: parse_optional(optional("LLM_MAX_TOKENS"), "LLM_MAX_TOKENS")?
                .unwrap_or(defaults.llm_max_tokens),
            openai_api_key: optional("OPENAI_API_KEY"),
            openai_base_url: optional("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            ollama_url: optional("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            llm_timeout_secs: parse_optional(optional("LLM_TIMEOUT_SECS"), "LLM_TIMEOUT_SECS")?,
            server_port: parse_optional(optional("SERVER_PORT"), "SERVER_PORT")?,
            batch_max_files: parse_optional(optional("BATCH_MAX_FILES"), "BATCH_MAX_FILES")?
                .unwrap_or(defaults.batch_max_files),
        })
    }

    /// Name of the model used for completions, for logging.
    pub fn model_label(&self) -> &str {
        match self.llm_provider {
            LlmProvider::None => "disabled",
            _ => &self.llm_model,
        }
    }
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for LlmProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            "none" | "disabled" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// Read `.env` (when present) and build the configuration from the environment.
pub fn load() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    if config.llm_provider == LlmProvider::OpenAI && config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; completions will come back empty");
    }
    tracing::debug!(
        provider = ?config.llm_provider,
        model = %config.model_label(),
        max_tokens = config.llm_max_tokens,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(config)
}
