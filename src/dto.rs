use serde::{Deserialize, Serialize};

/// Body of a `verbose_json` transcription response.
///
/// Only `segments` and each segment's `start`, `end` and `text` are required;
/// everything else may be missing or `null`.
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionVerbose {
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub segments: Option<Vec<Segment>>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub seek: Option<u32>,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub tokens: Option<Vec<u32>>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub avg_logprob: Option<f64>,
    #[serde(default)]
    pub compression_ratio: Option<f64>,
    #[serde(default)]
    pub no_speech_prob: Option<f64>,
}

/// One entry of the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl From<Segment> for OutputRecord {
    fn from(segment: Segment) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            text: segment.text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}
