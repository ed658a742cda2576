//! Speech synthesis request.

use crate::adapters::SpeechPort;

use super::GenerationError;

/// Synthesize speech for the narration text with the given voice.
///
/// `Ok(None)` mirrors the port contract: the provider reported
/// non-success, so no audio exists and the caller must skip the rest of
/// the event. Transport errors are real failures.
pub async fn request(
    port: &dyn SpeechPort,
    text: &str,
    voice: &str,
) -> Result<Option<Vec<u8>>, GenerationError> {
    port.synthesize(text, voice)
        .await
        .map_err(|source| GenerationError::Provider {
            step: "speech",
            source,
        })
}
