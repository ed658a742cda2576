//! Narration text request.

use chrono::NaiveDate;

use crate::adapters::{ChatMessage, CompletionPort};

use super::{prompts, GenerationError};

/// Request narration text for a run date.
///
/// `existing_texts` holds every text already generated in this batch, in
/// generation order; the prompt uses it to bias the model away from
/// repeats.
pub async fn request(
    port: &dyn CompletionPort,
    date: NaiveDate,
    words_count: usize,
    existing_texts: &[String],
) -> Result<String, GenerationError> {
    let messages = [
        ChatMessage::system(prompts::narration(date, words_count, existing_texts)),
        ChatMessage::user(prompts::NARRATION_QUESTION),
    ];

    let text = port
        .complete(&messages, None)
        .await
        .map_err(|source| GenerationError::Provider {
            step: "text",
            source,
        })?;

    Ok(text.trim().to_string())
}
