//! OpenAI adapter implementing the four content ports over HTTP.
//!
//! Every call is a single blocking request with a fixed timeout; retry
//! policy belongs to the caller, not this adapter.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::domain::{TranscriptSegment, Transcription};

use super::{ChatMessage, CompletionPort, ImagePort, SpeechPort, TranscriptionPort};

const API_BASE: &str = "https://api.openai.com/v1";

const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o";
const DEFAULT_TTS_MODEL: &str = "tts-1";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Per-call timeout; a timed-out call surfaces as a generation failure
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI API client
pub struct OpenAiClient {
    /// API credential
    api_key: String,
    /// API base URL (overridable for tests)
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Verbose transcription response (per-segment timing)
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    duration: f64,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Image generation response
#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

impl OpenAiClient {
    /// Create a new client for the given API credential
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different base URL (for tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl CompletionPort for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage], model: Option<&str>) -> Result<String> {
        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&serde_json::json!({
                "model": model.unwrap_or(DEFAULT_COMPLETION_MODEL),
                "messages": messages,
            }))
            .send()
            .await
            .context("Failed to send completion request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion request failed with {}: {}", status, body.trim());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("Completion response contained no message content")?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl SpeechPort for OpenAiClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .post(self.api_url("audio/speech"))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&serde_json::json!({
                "model": DEFAULT_TTS_MODEL,
                "voice": voice,
                "input": text,
                "response_format": "mp3",
            }))
            .send()
            .await
            .context("Failed to send speech request")?;

        // Non-success means "no audio produced", not a hard failure
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Speech synthesis returned non-success");
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read speech audio body")?;

        Ok(Some(bytes.to_vec()))
    }
}

#[async_trait]
impl TranscriptionPort for OpenAiClient {
    async fn transcribe(&self, audio: &[u8]) -> Result<Transcription> {
        let file_part = Part::bytes(audio.to_vec())
            .file_name("tts.mp3")
            .mime_str("audio/mpeg")?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", DEFAULT_TRANSCRIPTION_MODEL)
            .text("language", "en")
            .text("response_format", "verbose_json");

        let response = self
            .client
            .post(self.api_url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .context("Failed to send transcription request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Transcription request failed with {}: {}",
                status,
                body.trim()
            );
        }

        let parsed: VerboseTranscription = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        Ok(Transcription {
            duration: parsed.duration,
            segments: parsed
                .segments
                .into_iter()
                .map(|s| TranscriptSegment {
                    start: s.start,
                    end: s.end,
                    text: s.text,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl ImagePort for OpenAiClient {
    async fn generate(&self, prompt: &str, width: u32, height: u32) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(self.api_url("images/generations"))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&serde_json::json!({
                "model": DEFAULT_IMAGE_MODEL,
                "prompt": prompt,
                "size": format!("{}x{}", width, height),
                "quality": "hd",
                "n": 1,
            }))
            .send()
            .await
            .context("Failed to send image request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Image request failed with {}: {}", status, body.trim());
        }

        let parsed: ImagesResponse = response
            .json()
            .await
            .context("Failed to parse image response")?;

        let url = parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .context("Image response contained no URL")?;

        // The generation endpoint hands back a URL; fetch the actual bytes
        let image = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to download generated image")?
            .error_for_status()
            .context("Image download returned an error status")?
            .bytes()
            .await
            .context("Failed to read image body")?;

        Ok(image.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = OpenAiClient::new("sk-test");
        assert_eq!(
            client.api_url("chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_base_url_override() {
        let client = OpenAiClient::new("sk-test").with_base_url("http://localhost:9999/v1");
        assert_eq!(
            client.api_url("audio/speech"),
            "http://localhost:9999/v1/audio/speech"
        );
    }

    #[test]
    fn test_chat_message_serialization() {
        let message = ChatMessage::system("You are a narrator.");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"You are a narrator."}"#);
    }

    #[test]
    fn test_verbose_transcription_parsing() {
        let json = r#"{
            "task": "transcribe",
            "language": "english",
            "duration": 21.7,
            "text": "ignored here",
            "segments": [
                {"id": 0, "start": 0.0, "end": 10.2, "text": " First.", "temperature": 0.0},
                {"id": 1, "start": 10.2, "end": 21.7, "text": " Second.", "temperature": 0.0}
            ]
        }"#;

        let parsed: VerboseTranscription = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.duration, 21.7);
        assert_eq!(parsed.segments.len(), 2);
        assert_eq!(parsed.segments[1].start, 10.2);
    }
}
