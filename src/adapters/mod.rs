//! Capability ports for the generative services the pipeline consumes.
//!
//! Ports provide a unified interface for external AI providers: chat
//! completion, speech synthesis, transcription, and image generation.
//! The pipeline only ever sees these traits; concrete providers live in
//! submodules.

pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

// Re-export the OpenAI adapter
pub use openai::OpenAiClient;

use crate::domain::Transcription;

/// Message role for completion requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message in a completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Chat completion capability
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Request a completion; returns the assistant message text.
    /// `model: None` uses the provider's default.
    async fn complete(&self, messages: &[ChatMessage], model: Option<&str>) -> Result<String>;
}

/// Speech synthesis capability
#[async_trait]
pub trait SpeechPort: Send + Sync {
    /// Synthesize speech for a text with the given voice.
    ///
    /// Returns `Ok(None)` when the provider reports non-success (no audio
    /// produced); transport failures are errors.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Option<Vec<u8>>>;
}

/// Audio transcription capability
#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    /// Produce a verbose transcript with per-segment timing
    async fn transcribe(&self, audio: &[u8]) -> Result<Transcription>;
}

/// Image generation capability
#[async_trait]
pub trait ImagePort: Send + Sync {
    /// Generate a single image for a prompt at the given dimensions
    async fn generate(&self, prompt: &str, width: u32, height: u32) -> Result<Vec<u8>>;
}
