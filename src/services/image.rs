//! Image generation for an event's transcript.
//!
//! One independent single-image call per needed image; there is no
//! batching. A mid-sequence provider failure stops the sequence and
//! returns the images generated so far, with the shortfall recorded on
//! the batch so the caller can surface it.

use tracing::error;

use crate::adapters::ImagePort;
use crate::domain::Transcription;

use super::GenerationError;

/// The outcome of an image generation sequence
#[derive(Debug)]
pub struct ImageBatch {
    /// Generated images with their positional file names, in order
    pub images: Vec<(Vec<u8>, String)>,

    /// How many images the transcript called for
    pub expected: usize,
}

impl ImageBatch {
    /// Whether a mid-sequence failure cut the batch short
    pub fn is_truncated(&self) -> bool {
        self.images.len() < self.expected
    }
}

/// Generate images for an event.
///
/// Image count = min(transcript segment count, `max_per_event`). Each
/// result is named by positional index so storage order matches slide
/// cycling order.
pub async fn request(
    port: &dyn ImagePort,
    text: &str,
    transcription: &Transcription,
    max_per_event: usize,
    width: u32,
    height: u32,
) -> Result<ImageBatch, GenerationError> {
    let expected = transcription.segments.len().min(max_per_event);
    let mut images = Vec::with_capacity(expected);

    for index in 0..expected {
        match port.generate(text, width, height).await {
            Ok(bytes) => images.push((bytes, format!("image_{}.png", index))),
            Err(e) => {
                error!(index, error = %e, "Image generation failed mid-sequence");
                break;
            }
        }
    }

    Ok(ImageBatch { images, expected })
}
