use thiserror::Error;

/// Errors from the generative-text provider.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    Request(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    Deserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    Api(String),
    #[error("AI provider returned an empty response")]
    EmptyResponse,
}

/// Errors from the voice synthesis provider.
///
/// These are internal to the `voice` module: `VoiceSynthesizer::synthesize`
/// never surfaces them, it degrades to a fallback descriptor instead.
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("voice API key is not configured")]
    MissingApiKey,
    #[error("request to voice provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("voice provider returned an error: {0}")]
    Api(String),
    #[error("synthesized audio could not be stored: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the local storage layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database connection error: {0}")]
    Connection(String),
    #[error("database error: {0}")]
    Database(#[from] turso::Error),
    #[error("data integrity error: {0}")]
    DataIntegrity(String),
}
