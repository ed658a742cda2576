//! Per-segment slide specs derived from an event's transcript and images.
//!
//! Slides are never persisted; they are recomputed whenever rendering
//! needs them.

use std::path::PathBuf;

use anyhow::Result;

use super::event::Event;

/// Render spec for one transcript segment
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    /// On-screen duration in seconds (segment end - start)
    pub duration: f64,

    /// Narrated text shown on the slide
    pub text: String,

    /// Background image, relative to the project root
    pub background_image: PathBuf,
}

impl Slide {
    /// Derive the ordered slide sequence for an event.
    ///
    /// Images are reused cyclically when there are fewer images than
    /// transcript segments: segment `i` gets image `i % images.len()`.
    pub fn from_event(event: &Event) -> Result<Vec<Slide>> {
        let transcription = event
            .transcription
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("event {} has no transcription", event.id))?;

        if event.image_paths.is_empty() {
            anyhow::bail!("event {} has no images", event.id);
        }

        let slides = transcription
            .segments
            .iter()
            .enumerate()
            .map(|(idx, segment)| Slide {
                duration: segment.end - segment.start,
                text: segment.text.trim().to_string(),
                background_image: event.image_paths[idx % event.image_paths.len()].clone(),
            })
            .collect();

        Ok(slides)
    }
}
