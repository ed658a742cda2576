//! Tags request: up to three single-word tags for the narration text.

use crate::adapters::{ChatMessage, CompletionPort};

use super::{prompts, GenerationError};

pub async fn request(
    port: &dyn CompletionPort,
    text: &str,
    exclude_tags: &[String],
) -> Result<Vec<String>, GenerationError> {
    let messages = [
        ChatMessage::system(prompts::tags(exclude_tags)),
        ChatMessage::user(text),
    ];

    let response = port
        .complete(&messages, None)
        .await
        .map_err(|source| GenerationError::Provider {
            step: "tags",
            source,
        })?;

    Ok(split_tags(&response))
}

/// Split a comma-delimited tag response into a trimmed, non-empty list,
/// preserving response order.
fn split_tags(response: &str) -> Vec<String> {
    response
        .split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags_trims_and_preserves_order() {
        assert_eq!(
            split_tags("france, revolution , liberty"),
            vec!["france", "revolution", "liberty"]
        );
    }

    #[test]
    fn test_split_tags_drops_empty_entries() {
        assert_eq!(split_tags("rome,, ,empire"), vec!["rome", "empire"]);
        assert!(split_tags("").is_empty());
    }
}
