use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Default Ollama endpoint used when `OLLAMA_URL` is unset.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_SUMMARIZATION_MODEL: &str = "llama3.2";
const DEFAULT_SUMMARY_TIMEOUT_SECS: u64 = 30;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Explicitly requested dotenv file could not be read.
    #[error("Failed to load env file {path}: {reason}")]
    EnvFile {
        /// Path passed on the command line.
        path: String,
        /// Underlying loader failure.
        reason: String,
    },
}

/// Runtime configuration for the student registry server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Backend used to produce student summaries.
    pub summarization_provider: SummarizationProvider,
    /// Base URL of the Ollama runtime.
    pub ollama_url: Option<String>,
    /// Model identifier passed to the summarization provider.
    pub summarization_model: String,
    /// Upper bound, in seconds, for a single summarization call.
    pub summary_timeout_secs: u64,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Deterministic in-process template, no network access.
    Template,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            summarization_provider: load_env_optional("SUMMARIZATION_PROVIDER")
                .map(|value| {
                    value.parse().map_err(|()| {
                        ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".to_string())
                    })
                })
                .transpose()?
                .unwrap_or(SummarizationProvider::Ollama),
            ollama_url: load_env_optional("OLLAMA_URL"),
            summarization_model: load_env_optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZATION_MODEL.to_string()),
            summary_timeout_secs: load_env_optional("SUMMARY_TIMEOUT_SECS")
                .map(|value| match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(secs),
                    _ => Err(ConfigError::InvalidValue("SUMMARY_TIMEOUT_SECS".into())),
                })
                .transpose()?
                .unwrap_or(DEFAULT_SUMMARY_TIMEOUT_SECS),
        })
    }

    /// Timeout applied around each summarization call.
    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_secs)
    }

    /// Ollama base URL, falling back to the local default.
    pub fn ollama_base_url(&self) -> String {
        self.ollama_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "template" => Ok(Self::Template),
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
///
/// When `env_file` is provided it is loaded instead of the `.env` in the working directory.
/// A second call leaves the configuration installed by the first in place.
pub fn init_config(env_file: Option<&std::path::Path>) -> Result<(), ConfigError> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path).map_err(|error| ConfigError::EnvFile {
                path: path.display().to_string(),
                reason: error.to_string(),
            })?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    let config = Config::from_env()?;
    let _ = CONFIG.set(config);
    Ok(())
}
