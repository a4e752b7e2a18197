//! # Application State
//!
//! Defines the shared application state (`AppState`) and the logic for
//! building it at startup. The `AppState` holds all shared resources, such
//! as the configuration, database provider, AI client, and voice synthesizer,
//! making them accessible to all request handlers.

use crate::config::AppConfig;
use std::sync::Arc;
use voxtutor::{
    providers::{
        ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
        db::sqlite::SqliteProvider,
    },
    voice::VoiceSynthesizer,
};

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The primary database provider for users, documents, and history.
    pub sqlite_provider: Arc<SqliteProvider>,
    /// The AI provider used for answer and quiz generation.
    pub ai_provider: Box<dyn AiProvider>,
    /// The model label recorded with every generated answer.
    pub model_name: String,
    /// The text-to-speech orchestrator.
    pub voice: Arc<VoiceSynthesizer>,
}

/// Builds the shared application state from the configuration.
///
/// This initializes the AI provider client, the SQLite database (including
/// the schema), the voice synthesizer, and the uploads directory.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider: Box<dyn AiProvider> = match config.ai.provider.as_str() {
        "gemini" => {
            let api_key = config
                .ai
                .api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("api_key is required for the gemini provider"))?;
            // If api_url is not provided in config, construct it from the model name.
            let api_url = config.ai.api_url.clone().unwrap_or_else(|| {
                format!(
                    "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                    config.ai.model_name
                )
            });
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let api_url = config.ai.api_url.clone().ok_or_else(|| {
                anyhow::anyhow!(
                    "api_url is required for the local provider. Please set LOCAL_AI_API_URL in your .env file."
                )
            })?;
            Box::new(LocalAiProvider::new(
                api_url,
                config.ai.api_key.clone(),
                Some(config.ai.model_name.clone()),
            )?)
        }
        other => {
            return Err(anyhow::anyhow!("Unsupported AI provider type '{other}'"));
        }
    };

    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
    tracing::info!(db_path = %config.db_url, "Initialized local storage provider (SQLite).");
    // Ensure the database schema is up-to-date on startup.
    sqlite_provider.initialize_schema().await?;

    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    let voice = VoiceSynthesizer::new(
        config.voice.api_url.clone(),
        config.voice.api_key.clone(),
        &config.audio_dir,
    )?;

    Ok(AppState {
        model_name: config.ai.model_name.clone(),
        config: Arc::new(config),
        sqlite_provider: Arc::new(sqlite_provider),
        ai_provider,
        voice: Arc::new(voice),
    })
}
