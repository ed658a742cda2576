//! Description request: a short summary of the narration text.
//!
//! The caller passes the title's words as `exclude_words` so the
//! description does not just restate the title.

use crate::adapters::{ChatMessage, CompletionPort};

use super::{prompts, GenerationError};

pub async fn request(
    port: &dyn CompletionPort,
    text: &str,
    exclude_words: &[String],
) -> Result<String, GenerationError> {
    let messages = [
        ChatMessage::system(prompts::description(exclude_words)),
        ChatMessage::user(text),
    ];

    let description = port
        .complete(&messages, None)
        .await
        .map_err(|source| GenerationError::Provider {
            step: "description",
            source,
        })?;

    Ok(description.trim().to_string())
}
