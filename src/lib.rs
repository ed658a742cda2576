//! tdih - today-in-history shorts generator
//!
//! A pipeline that generates short "today in history" videos: narrated
//! text, synthesized speech, a timed transcript, and illustrative images,
//! assembled into timed slides and optionally published to YouTube.
//!
//! # Architecture
//!
//! The core is the event generation pipeline and its file-backed store:
//! - Every event is persisted field-by-field as generation steps succeed,
//!   so a killed process loses at most the in-flight step
//! - `event.json` is the canonical record; artifacts are referenced by
//!   paths relative to the project root
//! - Re-running a date skips events that are already complete
//!
//! # Modules
//!
//! - `adapters`: capability ports and the OpenAI provider
//! - `services`: typed content request services (text, title, tags, ...)
//! - `core`: the event store and batch orchestrator
//! - `domain`: data structures (Event, Transcription, Slide)
//! - `render`/`publish`: boundary collaborators (ffmpeg, YouTube)
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Generate today's events (interactive approval)
//! tdih generate
//!
//! # Render and upload a specific date
//! tdih render 2024-01-01
//! tdih upload 2024-01-01
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod publish;
pub mod render;
pub mod services;

// Re-export main types at crate root for convenience
pub use config::Settings;
pub use core::{EventStore, Generator};
pub use domain::{Event, Slide, TranscriptSegment, Transcription};
