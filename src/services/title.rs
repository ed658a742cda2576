//! Title request: a two-word title for generated narration text.

use crate::adapters::{ChatMessage, CompletionPort};

use super::{prompts, GenerationError};

pub async fn request(port: &dyn CompletionPort, text: &str) -> Result<String, GenerationError> {
    let messages = [ChatMessage::system(prompts::TITLE), ChatMessage::user(text)];

    let title = port
        .complete(&messages, None)
        .await
        .map_err(|source| GenerationError::Provider {
            step: "title",
            source,
        })?;

    Ok(title.trim().to_string())
}
