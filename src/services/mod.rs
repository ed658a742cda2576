//! Content request services.
//!
//! Each service turns pipeline intent (get narration text, get a title,
//! get tags, ...) into provider calls: it builds the prompt, issues one
//! request through the matching port, and extracts a plain value. The
//! orchestrator never sees raw provider responses.
//!
//! Services do not retry; retry policy belongs to the caller.

pub mod description;
pub mod image;
pub mod prompts;
pub mod speech;
pub mod tags;
pub mod text;
pub mod title;
pub mod transcription;

use thiserror::Error;

pub use image::ImageBatch;

/// Errors raised by content request services
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A provider call errored or timed out
    #[error("{step} generation failed: {source}")]
    Provider {
        step: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A required upstream artifact was absent
    #[error("missing input for {step}: {what}")]
    MissingInput {
        step: &'static str,
        what: &'static str,
    },
}
