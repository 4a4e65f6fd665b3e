use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_INPUT_PATH: &str = "audio.mp3";
pub const DEFAULT_OUTPUT_PATH: &str = "transcription.json";
pub const DEFAULT_MODEL: &str = "whisper-1";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Options sent along with the audio on every transcription request.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptionConfig {
    pub model: String,
    pub language: String,
    pub response_format: String,
    pub timestamp_granularities: Vec<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            response_format: "verbose_json".to_string(),
            timestamp_granularities: vec!["segment".to_string()],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConverterConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub transcription: TranscriptionConfig,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            transcription: TranscriptionConfig::default(),
        }
    }
}

/// Endpoint and credentials for the remote service.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::MissingCredentials(API_KEY_VAR))?;
        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(base_url, api_key))
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
