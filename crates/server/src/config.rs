//! # Application Configuration
//!
//! Defines the configuration structure for the `voxtutor-server` and the
//! logic for loading it from a `config.yml` file and environment variables.
//! Values in the YAML file may reference environment variables with the
//! `${VAR_NAME}` syntax; unset variables resolve to an empty string.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Secret used to sign and verify JWTs.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in seconds. Defaults to seven days.
    #[serde(default = "default_jwt_expires_in_secs")]
    pub jwt_expires_in_secs: u64,
    /// Where uploaded PDFs are stored on disk.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Where synthesized audio files are stored on disk.
    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,
    /// The AI provider used for answers and quizzes.
    pub ai: ProviderConfig,
    /// The text-to-speech provider.
    #[serde(default)]
    pub voice: VoiceConfig,
}

fn default_port() -> u16 {
    8080
}

fn default_db_url() -> String {
    "db/voxtutor.db".to_string()
}

fn default_jwt_secret() -> String {
    "a-secure-secret-key".to_string()
}

fn default_jwt_expires_in_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_audio_dir() -> String {
    "audio_output".to_string()
}

/// Configuration for a specific AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider (e.g., "gemini", "local").
    pub provider: String,
    /// The API URL. Optional for providers like Gemini where it can be derived.
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Configuration for the text-to-speech provider.
#[derive(Debug, Deserialize, Clone)]
pub struct VoiceConfig {
    #[serde(default = "default_voice_api_url")]
    pub api_url: String,
    /// Without a key, synthesis requests degrade to fallback descriptors.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            api_url: default_voice_api_url(),
            api_key: None,
        }
    }
}

fn default_voice_api_url() -> String {
    "https://api.murf.ai/v1".to_string()
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").unwrap();
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|_| "".to_string())
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// The file is resolved in this order: the explicit override, `config.yml`
/// next to the manifest, then `config.{AI_PROVIDER}.yml` as a template
/// fallback. Environment variables are merged on top, so `PORT` or
/// `VOXTUTOR_AI__API_KEY` override file values.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder();

    let main_config_path = if let Some(override_path) = config_path_override {
        override_path.to_string()
    } else {
        let user_config_path = format!("{base_path}/config.yml");
        if std::path::Path::new(&user_config_path).exists() {
            info!("Loading user-defined configuration from '{user_config_path}'.");
            user_config_path
        } else {
            let provider = env::var("AI_PROVIDER").unwrap_or_else(|_| "local".to_string());
            let fallback_path = format!("{base_path}/config.{provider}.yml");
            info!(
                "'{user_config_path}' not found. Falling back to '{fallback_path}' based on AI_PROVIDER='{provider}'."
            );
            fallback_path
        }
    };

    let main_content = read_and_substitute(&main_config_path)?.ok_or_else(|| {
        ConfigError::NotFound(format!(
            "Main config file not found at '{main_config_path}'. Please ensure 'config.yml' \
             exists or your AI_PROVIDER is set to load a valid template ('local' or 'gemini')."
        ))
    })?;
    builder = builder.add_source(File::from_str(&main_content, FileFormat::Yaml));

    let settings = builder
        // Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("VOXTUTOR")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
