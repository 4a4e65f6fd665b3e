use log::{debug, info};
use reqwest::multipart::{Form, Part};

use crate::config::{ClientConfig, TranscriptionConfig};
use crate::dto::{ApiErrorBody, TranscriptionVerbose};
use crate::error::{Error, Result};

/// Something that can turn audio bytes into a verbose transcription.
pub trait TranscriptionClient {
    async fn transcribe(
        &self,
        file_name: &str,
        audio: Vec<u8>,
        options: &TranscriptionConfig,
    ) -> Result<TranscriptionVerbose>;
}

/// Client for OpenAI-compatible `/audio/transcriptions` endpoints.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl OpenAiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.config.base_url)
    }
}

impl TranscriptionClient for OpenAiClient {
    async fn transcribe(
        &self,
        file_name: &str,
        audio: Vec<u8>,
        options: &TranscriptionConfig,
    ) -> Result<TranscriptionVerbose> {
        let audio_len = audio.len();
        let mut form = Form::new()
            .part("file", Part::bytes(audio).file_name(file_name.to_string()))
            .text("model", options.model.clone())
            .text("language", options.language.clone())
            .text("response_format", options.response_format.clone());
        for granularity in &options.timestamp_granularities {
            form = form.text("timestamp_granularities[]", granularity.clone());
        }

        info!(
            "Sending {} bytes to {} (model={}, language={})",
            audio_len,
            self.endpoint(),
            options.model,
            options.language
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Transcription service answered {status} with {} bytes", body.len());

        if !status.is_success() {
            return Err(Error::Remote {
                status,
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::DataShape(e.to_string()))
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(ClientConfig::new(format!("{}/v1", server.uri()), "sk-test"))
    }

    #[tokio::test]
    async fn sends_multipart_request_with_fixed_options() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_string_contains("name=\"model\"\r\n\r\nwhisper-1\r\n"))
            .and(body_string_contains("name=\"language\"\r\n\r\nen\r\n"))
            .and(body_string_contains("name=\"response_format\"\r\n\r\nverbose_json\r\n"))
            .and(body_string_contains(
                "name=\"timestamp_granularities[]\"\r\n\r\nsegment\r\n",
            ))
            .and(body_string_contains("filename=\"audio.mp3\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "duration": 3.4,
                "language": "english",
                "text": "All right, let's get started.",
                "segments": [
                    {"id": 0, "seek": 0, "start": 0.0, "end": 3.36,
                     "text": " All right, let's get started.", "tokens": [50364, 1057],
                     "temperature": 0.0, "avg_logprob": -0.22,
                     "compression_ratio": 1.7, "no_speech_prob": 0.03}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .transcribe("audio.mp3", b"ID3fake".to_vec(), &TranscriptionConfig::default())
            .await
            .unwrap();

        let segments = result.segments.unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, " All right, let's get started.");
    }

    #[tokio::test]
    async fn sends_configured_language_and_every_granularity() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .and(body_string_contains("name=\"language\"\r\n\r\nde\r\n"))
            .and(body_string_contains(
                "name=\"timestamp_granularities[]\"\r\n\r\nsegment\r\n",
            ))
            .and(body_string_contains(
                "name=\"timestamp_granularities[]\"\r\n\r\nword\r\n",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "segments": [{"start": 0.0, "end": 1.0, "text": " Hallo.", "avg_logprob": null}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = TranscriptionConfig {
            language: "de".to_string(),
            timestamp_granularities: vec!["segment".to_string(), "word".to_string()],
            ..TranscriptionConfig::default()
        };
        let result = client_for(&server)
            .transcribe("audio.mp3", vec![0; 4], &options)
            .await
            .unwrap();

        assert_eq!(result.segments.unwrap()[0].text, " Hallo.");
    }

    #[tokio::test]
    async fn surfaces_api_error_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .transcribe("audio.mp3", vec![0; 4], &TranscriptionConfig::default())
            .await
            .unwrap_err();

        match err {
            Error::Remote { status, message } => {
                assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn plain_text_error_body_is_kept() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down\n"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .transcribe("audio.mp3", vec![0; 4], &TranscriptionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Remote { .. }));
        assert!(err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_data_shape_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("All right."))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .transcribe("audio.mp3", vec![0; 4], &TranscriptionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DataShape(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let client = OpenAiClient::new(ClientConfig::new("http://127.0.0.1:9", "sk-test"));

        let err = client
            .transcribe("audio.mp3", vec![0; 4], &TranscriptionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
    }
}
