use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the casestack server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Directory scanned for candidate case-study documents.
    pub documents_dir: PathBuf,
    /// Language-model provider used for summaries, tags, and answers.
    pub generation_provider: GenerationProvider,
    /// Model identifier passed to the generation provider.
    pub generation_model: String,
    /// API key forwarded to OpenAI when that provider is selected.
    pub openai_api_key: Option<String>,
    /// Base URL of the local Ollama runtime, when selected.
    pub ollama_url: Option<String>,
    /// Backend powering the summary retriever.
    pub retriever_backend: RetrieverBackend,
    /// Base URL of the Qdrant instance, required for the `qdrant` backend.
    pub qdrant_url: Option<String>,
    /// Qdrant collection holding summary vectors.
    pub qdrant_collection_name: String,
    /// Optional API key required to access Qdrant.
    pub qdrant_api_key: Option<String>,
    /// Dimensionality of the summary embedding vectors.
    pub embedding_dimension: usize,
    /// Number of nearest summaries pulled into the answer context.
    pub search_top_k: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported language-model backends for summarization and categorization.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// Hosted OpenAI chat-completions API.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

/// Supported retriever index backends.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverBackend {
    /// In-process cosine-similarity store rebuilt per ingestion run.
    Memory,
    /// Qdrant collection storing one point per accepted summary.
    Qdrant,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let retriever_backend = match load_env_optional("RETRIEVER_BACKEND") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("RETRIEVER_BACKEND".to_string()))?,
            None => RetrieverBackend::Memory,
        };

        let qdrant_url = load_env_optional("QDRANT_URL");
        if matches!(retriever_backend, RetrieverBackend::Qdrant) && qdrant_url.is_none() {
            return Err(ConfigError::MissingVariable("QDRANT_URL".to_string()));
        }

        let generation_provider: GenerationProvider = load_env("GENERATION_PROVIDER")?
            .parse()
            .map_err(|()| ConfigError::InvalidValue("GENERATION_PROVIDER".to_string()))?;
        let openai_api_key = load_env_optional("OPENAI_API_KEY");
        if matches!(generation_provider, GenerationProvider::OpenAI) && openai_api_key.is_none() {
            return Err(ConfigError::MissingVariable("OPENAI_API_KEY".to_string()));
        }

        Ok(Self {
            documents_dir: PathBuf::from(load_env("DOCUMENTS_DIR")?),
            generation_provider,
            generation_model: load_env("GENERATION_MODEL")?,
            openai_api_key,
            ollama_url: load_env_optional("OLLAMA_URL"),
            retriever_backend,
            qdrant_url,
            qdrant_collection_name: load_env_optional("QDRANT_COLLECTION_NAME")
                .unwrap_or_else(|| "case-studies".to_string()),
            qdrant_api_key: load_env_optional("QDRANT_API_KEY"),
            embedding_dimension: load_env_optional("EMBEDDING_DIMENSION")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("EMBEDDING_DIMENSION".to_string()))
                })
                .transpose()?
                .unwrap_or(384),
            search_top_k: load_env_optional("SEARCH_TOP_K")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SEARCH_TOP_K".to_string()))
                })
                .transpose()?
                .unwrap_or(4),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl std::str::FromStr for GenerationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for RetrieverBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "qdrant" => Ok(Self::Qdrant),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        documents_dir = %config.documents_dir.display(),
        provider = ?config.generation_provider,
        model = %config.generation_model,
        retriever = ?config.retriever_backend,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
