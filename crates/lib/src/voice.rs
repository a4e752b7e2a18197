//! # Voice synthesis orchestrator
//!
//! Wraps the external text-to-speech provider (Murf-compatible API). The
//! synthesis entry point never fails: a missing API key, an empty voice
//! list, or any API/download/disk error degrades to a fallback descriptor
//! (`fallback: true`) so callers can continue without audio.
//!
//! The available-voice list is fetched lazily and cached for the process
//! lifetime. Two concurrent refreshes may both hit the provider; both
//! succeed and the second write wins, which is harmless.

use crate::errors::VoiceError;
use chrono::Utc;
use regex::Regex;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// The provider rejects requests longer than this.
const TTS_CHAR_LIMIT: usize = 1000;
/// Spoken-word rate used for duration estimates.
const WORDS_PER_MINUTE: u64 = 140;

/// One entry from the provider's voice catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Voice {
    #[serde(default, alias = "voiceId", alias = "id")]
    pub voice_id: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// The catalog endpoint returns either `{"voices": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum VoiceCatalog {
    Wrapped { voices: Vec<Voice> },
    Bare(Vec<Voice>),
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    #[serde(rename = "voiceId")]
    voice_id: &'a str,
    text: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct SynthesisResponse {
    #[serde(rename = "audioFile")]
    audio_file: Option<String>,
    #[serde(rename = "audioLengthInSeconds")]
    audio_length_in_seconds: Option<f64>,
}

/// The descriptor returned for every synthesis attempt.
///
/// `fallback: true` means no audio was produced; the size and duration are
/// estimates only and `filename` does not exist on disk.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceArtifact {
    pub filename: String,
    pub duration_secs: u64,
    pub size: u64,
    pub voice_id: String,
    pub provider: String,
    pub fallback: bool,
}

/// Result of probing the provider, used by the health endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voices_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_voices: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceHealth {
    pub status: &'static str,
    pub service: &'static str,
    pub provider: &'static str,
    pub connection: ConnectionReport,
    pub voices_loaded: usize,
    pub timestamp: String,
}

/// The voice synthesis orchestrator.
pub struct VoiceSynthesizer {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    output_dir: PathBuf,
    voices: RwLock<Vec<Voice>>,
}

impl VoiceSynthesizer {
    /// Creates a new synthesizer, ensuring the audio output directory exists.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, VoiceError> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        let client = ReqwestClient::builder()
            .build()
            .map_err(VoiceError::Request)?;
        info!(key_configured = api_key.is_some(), "Voice synthesizer initialized");
        Ok(Self {
            client,
            api_url,
            api_key,
            output_dir,
            voices: RwLock::new(Vec::new()),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetches the voice catalog from the provider.
    async fn load_voices(&self) -> Result<Vec<Voice>, VoiceError> {
        let api_key = self.api_key.as_deref().ok_or(VoiceError::MissingApiKey)?;

        let response = self
            .client
            .get(format!("{}/speech/voices", self.api_url))
            .header("api-key", api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VoiceError::Api(error_text));
        }

        let catalog: VoiceCatalog = response.json().await?;
        let voices = match catalog {
            VoiceCatalog::Wrapped { voices } => voices,
            VoiceCatalog::Bare(voices) => voices,
        };
        info!(count = voices.len(), "Loaded voice catalog");
        Ok(voices)
    }

    /// Returns the cached voice list, fetching it lazily on first use.
    /// A load failure is logged and an empty list returned.
    pub async fn available_voices(&self) -> Vec<Voice> {
        {
            let cached = self.voices.read().await;
            if !cached.is_empty() {
                return cached.clone();
            }
        }

        match self.load_voices().await {
            Ok(voices) => {
                *self.voices.write().await = voices.clone();
                voices
            }
            Err(e) => {
                warn!("Failed to load voice catalog: {e}");
                Vec::new()
            }
        }
    }

    /// Synthesizes speech, degrading to a fallback descriptor on any failure.
    pub async fn synthesize(&self, text: &str, detected_subject: &str) -> VoiceArtifact {
        if self.api_key.is_none() {
            return self.fallback_artifact(text);
        }

        let voices = self.available_voices().await;
        let Some(voice_id) = select_voice(&voices, detected_subject) else {
            warn!("No voice available for synthesis, using fallback");
            return self.fallback_artifact(text);
        };

        let clean_text = clean_text_for_tts(text);
        match self.try_synthesize(&clean_text, &voice_id).await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("Voice synthesis failed: {e}, using fallback");
                self.fallback_artifact(text)
            }
        }
    }

    async fn try_synthesize(
        &self,
        clean_text: &str,
        voice_id: &str,
    ) -> Result<VoiceArtifact, VoiceError> {
        let api_key = self.api_key.as_deref().ok_or(VoiceError::MissingApiKey)?;

        info!(voice_id, "Requesting speech synthesis");
        let response = self
            .client
            .post(format!("{}/speech/generate-with-key", self.api_url))
            .header("api-key", api_key)
            .json(&SynthesisRequest {
                voice_id,
                text: clean_text,
                format: "mp3",
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VoiceError::Api(error_text));
        }

        let synthesis: SynthesisResponse = response.json().await?;
        let audio_url = synthesis
            .audio_file
            .ok_or_else(|| VoiceError::Api("no audio URL in response".to_string()))?;

        let audio_response = self.client.get(&audio_url).send().await?;
        if !audio_response.status().is_success() {
            return Err(VoiceError::Api(format!(
                "audio download failed with status {}",
                audio_response.status()
            )));
        }
        let audio_bytes = audio_response.bytes().await?;

        let filename = format!("murf_voice_{}.mp3", Utc::now().timestamp_millis());
        let file_path = self.output_dir.join(&filename);
        tokio::fs::write(&file_path, &audio_bytes).await?;

        let duration_secs = synthesis
            .audio_length_in_seconds
            .map(|s| s.ceil() as u64)
            .unwrap_or_else(|| estimate_duration_secs(clean_text));

        info!(%filename, size = audio_bytes.len(), "Audio downloaded and saved");

        Ok(VoiceArtifact {
            filename,
            duration_secs,
            size: audio_bytes.len() as u64,
            voice_id: voice_id.to_string(),
            provider: "Murf AI".to_string(),
            fallback: false,
        })
    }

    /// The degraded, audio-less descriptor. Callers treat this as a normal
    /// result and keep going.
    pub fn fallback_artifact(&self, text: &str) -> VoiceArtifact {
        VoiceArtifact {
            filename: format!("demo_voice_{}.mp3", Utc::now().timestamp_millis()),
            duration_secs: estimate_duration_secs(text),
            size: text.len() as u64 * 80,
            voice_id: "demo-fallback".to_string(),
            provider: "Demo Fallback".to_string(),
            fallback: true,
        }
    }

    /// Probes the provider by loading the voice catalog.
    pub async fn test_connection(&self) -> ConnectionReport {
        if self.api_key.is_none() {
            return ConnectionReport {
                status: "no-api-key".to_string(),
                message: "API key not configured".to_string(),
                voices_count: None,
                sample_voices: None,
            };
        }

        match self.load_voices().await {
            Ok(voices) if !voices.is_empty() => ConnectionReport {
                status: "connected".to_string(),
                message: format!(
                    "Voice API connection successful - {} voices available",
                    voices.len()
                ),
                voices_count: Some(voices.len()),
                sample_voices: Some(
                    voices.iter().take(3).map(|v| v.voice_id.clone()).collect(),
                ),
            },
            Ok(_) => ConnectionReport {
                status: "connected-no-voices".to_string(),
                message: "Connected but no voices found".to_string(),
                voices_count: None,
                sample_voices: None,
            },
            Err(e) => ConnectionReport {
                status: "failed".to_string(),
                message: e.to_string(),
                voices_count: None,
                sample_voices: None,
            },
        }
    }

    pub async fn health_check(&self) -> VoiceHealth {
        let connection = self.test_connection().await;
        let voices_loaded = self.voices.read().await.len();
        VoiceHealth {
            status: if connection.status == "connected" {
                "healthy"
            } else {
                "degraded"
            },
            service: "Voice Service",
            provider: "Murf AI",
            connection,
            voices_loaded,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Selects a voice for the detected subject.
///
/// Technical subjects prefer female-labeled voices (aria/natalie), academic
/// subjects prefer male-labeled voices (brian/davis); both fall back to the
/// first English-tagged voice, then to any voice at all.
pub fn select_voice(voices: &[Voice], detected_subject: &str) -> Option<String> {
    if voices.is_empty() {
        return None;
    }

    let english: Vec<&Voice> = voices
        .iter()
        .filter(|v| {
            v.language
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains("en"))
                || v.voice_id.to_lowercase().contains("en")
        })
        .collect();

    let preferred = if detected_subject.contains("machine learning")
        || detected_subject.contains("programming")
    {
        english.iter().find(|v| {
            v.gender.as_deref().is_some_and(|g| g.eq_ignore_ascii_case("female"))
                || v.voice_id.to_lowercase().contains("aria")
                || v.voice_id.to_lowercase().contains("natalie")
        })
    } else if detected_subject.contains("mathematics") || detected_subject.contains("science") {
        english.iter().find(|v| {
            v.voice_id.to_lowercase().contains("brian")
                || v.voice_id.to_lowercase().contains("davis")
                || v.gender.as_deref().is_some_and(|g| g.eq_ignore_ascii_case("male"))
        })
    } else {
        None
    };

    preferred
        .copied()
        .or_else(|| english.first().copied())
        .or_else(|| voices.first())
        .map(|v| v.voice_id.clone())
}

/// Strips markdown and collapses whitespace ahead of synthesis, truncating
/// to the provider's per-request character limit.
pub fn clean_text_for_tts(text: &str) -> String {
    let heading_re = Regex::new(r"#{1,6}\s").expect("valid heading regex");
    let cleaned = heading_re
        .replace_all(text, "")
        .replace("**", "")
        .replace('*', "")
        .replace("\n\n", ". ")
        .replace('\n', " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(TTS_CHAR_LIMIT).collect()
}

/// Estimates the spoken duration at ~140 words per minute, rounded up.
pub fn estimate_duration_secs(text: &str) -> u64 {
    let words = text.split_whitespace().count() as u64;
    (words * 60).div_ceil(WORDS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str, gender: Option<&str>, language: Option<&str>) -> Voice {
        Voice {
            voice_id: id.to_string(),
            gender: gender.map(str::to_string),
            language: language.map(str::to_string),
        }
    }

    #[test]
    fn test_select_voice_prefers_female_for_technical_subjects() {
        let voices = vec![
            voice("de-DE-hans", Some("male"), Some("de-DE")),
            voice("en-US-brian", Some("male"), Some("en-US")),
            voice("en-US-natalie", Some("female"), Some("en-US")),
        ];
        assert_eq!(
            select_voice(&voices, "machine learning"),
            Some("en-US-natalie".to_string())
        );
    }

    #[test]
    fn test_select_voice_prefers_male_for_academic_subjects() {
        let voices = vec![
            voice("en-US-aria", Some("female"), Some("en-US")),
            voice("en-US-davis", Some("male"), Some("en-US")),
        ];
        assert_eq!(
            select_voice(&voices, "mathematics"),
            Some("en-US-davis".to_string())
        );
    }

    #[test]
    fn test_select_voice_falls_back_to_first_english_then_any() {
        let voices = vec![
            voice("fr-FR-adele", Some("female"), Some("fr-FR")),
            voice("en-GB-oliver", Some("male"), Some("en-GB")),
        ];
        assert_eq!(
            select_voice(&voices, "general"),
            Some("en-GB-oliver".to_string())
        );

        let only_french = vec![voice("fr-FR-adele", Some("female"), Some("fr-FR"))];
        assert_eq!(
            select_voice(&only_french, "general"),
            Some("fr-FR-adele".to_string())
        );

        assert_eq!(select_voice(&[], "general"), None);
    }

    #[test]
    fn test_clean_text_for_tts() {
        let cleaned = clean_text_for_tts("**Bold** claim\n\nwith   extra  space\nhere");
        assert_eq!(cleaned, "Bold claim. with extra space here");

        let long = "word ".repeat(400);
        assert_eq!(clean_text_for_tts(&long).chars().count(), 1000);
    }

    #[test]
    fn test_estimate_duration() {
        // 140 words at 140 wpm is exactly one minute.
        let text = "word ".repeat(140);
        assert_eq!(estimate_duration_secs(&text), 60);
        assert_eq!(estimate_duration_secs("one two three"), 2);
        assert_eq!(estimate_duration_secs(""), 0);
    }

    #[tokio::test]
    async fn test_synthesize_without_api_key_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let synth =
            VoiceSynthesizer::new("http://unused.invalid".to_string(), None, dir.path()).unwrap();

        let artifact = synth.synthesize("Hello there, student!", "general").await;
        assert!(artifact.fallback);
        assert_eq!(artifact.provider, "Demo Fallback");
        assert_eq!(artifact.voice_id, "demo-fallback");
        assert_eq!(artifact.size, "Hello there, student!".len() as u64 * 80);
        assert!(artifact.filename.ends_with(".mp3"));
        // No audio file is written for fallbacks.
        assert!(!dir.path().join(&artifact.filename).exists());
    }

    #[tokio::test]
    async fn test_test_connection_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let synth =
            VoiceSynthesizer::new("http://unused.invalid".to_string(), None, dir.path()).unwrap();
        let report = synth.test_connection().await;
        assert_eq!(report.status, "no-api-key");

        let health = synth.health_check().await;
        assert_eq!(health.status, "degraded");
    }
}
