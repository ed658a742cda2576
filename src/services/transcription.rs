//! Transcription request for previously synthesized speech.

use crate::adapters::TranscriptionPort;
use crate::domain::Transcription;

use super::GenerationError;

/// Transcribe the synthesized audio with per-segment timing.
///
/// Fails with `MissingInput` when no audio was supplied.
pub async fn request(
    port: &dyn TranscriptionPort,
    audio: Option<&[u8]>,
) -> Result<Transcription, GenerationError> {
    let audio = match audio {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => {
            return Err(GenerationError::MissingInput {
                step: "transcription",
                what: "speech audio",
            })
        }
    };

    port.transcribe(audio)
        .await
        .map_err(|source| GenerationError::Provider {
            step: "transcription",
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct PanicPort;

    #[async_trait]
    impl TranscriptionPort for PanicPort {
        async fn transcribe(&self, _audio: &[u8]) -> Result<Transcription> {
            panic!("must not be called without audio");
        }
    }

    #[tokio::test]
    async fn test_missing_audio_is_rejected_before_the_provider() {
        let err = request(&PanicPort, None).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::MissingInput {
                step: "transcription",
                ..
            }
        ));

        let err = request(&PanicPort, Some(&[])).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingInput { .. }));
    }
}
