//! Batch orchestrator for event generation.
//!
//! Drives the per-event step sequence (text, approval, title,
//! description, tags, speech, transcription, images) and re-persists the
//! full event record after every step, so a killed process loses at most
//! the in-flight step. Events are generated one at a time; steps within
//! an event run in strict sequence because each step consumes the prior
//! step's output.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{error, info, instrument, warn};

use crate::adapters::{CompletionPort, ImagePort, OpenAiClient, SpeechPort, TranscriptionPort};
use crate::config::Settings;
use crate::domain::{Event, GenerationWarning};
use crate::services;

use super::store::EventStore;

/// Cap on text attempts per batch, as a multiple of the batch size.
/// Guards against an operator rejecting forever.
const ATTEMPT_MULTIPLIER: usize = 3;

/// The four capability ports the pipeline consumes
#[derive(Clone)]
pub struct Providers {
    pub completion: Arc<dyn CompletionPort>,
    pub speech: Arc<dyn SpeechPort>,
    pub transcription: Arc<dyn TranscriptionPort>,
    pub image: Arc<dyn ImagePort>,
}

impl Providers {
    /// Wire every port to one OpenAI client
    pub fn openai(client: Arc<OpenAiClient>) -> Self {
        Self {
            completion: client.clone(),
            speech: client.clone(),
            transcription: client.clone(),
            image: client,
        }
    }
}

/// Operator decision point between text generation and the rest of the
/// pipeline. Batch automation and interactive use share the orchestrator;
/// only the gate differs.
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    /// Decide whether a generated text becomes an event. `slot` and
    /// `target` are 1-based progress numbers for display.
    async fn approve(&self, text: &str, slot: usize, target: usize) -> Result<bool>;
}

/// Approves everything; used for unattended runs
pub struct AutoApprove;

#[async_trait]
impl ApprovalGate for AutoApprove {
    async fn approve(&self, _text: &str, _slot: usize, _target: usize) -> Result<bool> {
        Ok(true)
    }
}

/// Blocking console prompt
pub struct ConsoleGate;

#[async_trait]
impl ApprovalGate for ConsoleGate {
    async fn approve(&self, text: &str, slot: usize, target: usize) -> Result<bool> {
        println!("\nText: {}", text);
        print!("Approve? (y/n) [{}/{}]: ", slot, target);
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;

        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Batch event generator
pub struct Generator {
    providers: Providers,
    store: EventStore,
    settings: Settings,
}

impl Generator {
    pub fn new(providers: Providers, store: EventStore, settings: Settings) -> Self {
        Self {
            providers,
            store,
            settings,
        }
    }

    /// Generate a batch of events for a date.
    ///
    /// Idempotent across re-runs: existing complete records for the date
    /// count toward the target, and their texts seed the duplicate
    /// avoidance list. Rejected texts consume no event id and persist
    /// nothing, but still join the avoidance list. A step failure aborts
    /// the current event only; completed steps stay on disk and the loop
    /// moves on.
    #[instrument(skip(self, gate), fields(date = %date))]
    pub async fn generate_batch(
        &self,
        date: NaiveDate,
        gate: &dyn ApprovalGate,
    ) -> Result<Vec<Event>> {
        let existing = self.store.load_events(date).await?;
        let complete = existing.iter().filter(|e| e.is_complete()).count();

        if complete >= self.settings.num_events {
            info!(
                complete,
                target = self.settings.num_events,
                "Date already has a full batch, nothing to generate"
            );
            return Ok(Vec::new());
        }

        let needed = self.settings.num_events - complete;
        info!(needed, existing = existing.len(), "Starting batch generation");

        // Batch-scoped duplicate avoidance: append-only, read by every
        // subsequent text request.
        let mut batch_texts: Vec<String> = existing.iter().filter_map(|e| e.text.clone()).collect();

        let attempt_cap = self.settings.num_events * ATTEMPT_MULTIPLIER;
        let mut produced = Vec::new();
        let mut attempts = 0;

        while produced.len() < needed && attempts < attempt_cap {
            attempts += 1;

            let text = match services::text::request(
                self.providers.completion.as_ref(),
                date,
                self.settings.words_count,
                &batch_texts,
            )
            .await
            {
                Ok(text) => text,
                Err(e) => {
                    error!(step = "text", error = %e, "Text generation failed, trying next slot");
                    continue;
                }
            };

            batch_texts.push(text.clone());

            if !gate.approve(&text, produced.len() + 1, needed).await? {
                info!("Text rejected by operator, trying another");
                continue;
            }

            let mut event = Event::new(date);
            info!(event_id = %event.id, "Generating event");

            if let Err(e) = self.run_steps(&mut event, &text).await {
                error!(
                    event_id = %event.id,
                    date = %date,
                    error = %e,
                    "Event generation aborted, completed steps are preserved"
                );
            }

            produced.push(event);
        }

        if produced.len() < needed {
            warn!(
                produced = produced.len(),
                needed, attempts, "Batch ended short of its target"
            );
        }

        Ok(produced)
    }

    /// Generate one event from operator-provided text, bypassing the text
    /// request and the approval gate.
    #[instrument(skip(self, text), fields(date = %date))]
    pub async fn generate_from_text(&self, date: NaiveDate, text: &str) -> Result<Event> {
        let mut event = Event::new(date);
        self.run_steps(&mut event, text.trim()).await?;
        Ok(event)
    }

    /// Run the step sequence for one approved event. Each step persists
    /// its artifact and re-persists the full record before the next step
    /// starts.
    async fn run_steps(&self, event: &mut Event, text: &str) -> Result<()> {
        let date = event.date;
        let id = event.id;

        // Text
        event.text = Some(text.to_string());
        event.text_path = Some(self.store.save_text(date, id, text).await?);
        self.store.save_event_record(event).await?;

        // Title
        let title =
            services::title::request(self.providers.completion.as_ref(), text).await?;
        event.title = Some(title);
        self.store.save_event_record(event).await?;

        // Description, steering clear of the title's words
        let exclude_words: Vec<String> = event
            .title
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let description = services::description::request(
            self.providers.completion.as_ref(),
            text,
            &exclude_words,
        )
        .await?;
        event.description = Some(description);
        self.store.save_event_record(event).await?;

        // Tags
        let tags = services::tags::request(self.providers.completion.as_ref(), text, &[]).await?;
        event.tags = tags;
        self.store.save_event_record(event).await?;

        // Speech
        let voice = self.settings.voices.pick().to_string();
        let audio =
            match services::speech::request(self.providers.speech.as_ref(), text, &voice).await? {
                Some(audio) => audio,
                None => {
                    warn!(event_id = %id, voice, "No audio produced, skipping rest of event");
                    return Ok(());
                }
            };
        event.audio_path = Some(self.store.save_audio(date, id, &audio).await?);
        self.store.save_event_record(event).await?;

        // Transcription
        let transcription = services::transcription::request(
            self.providers.transcription.as_ref(),
            Some(audio.as_slice()),
        )
        .await?;
        event.transcription_path = Some(
            self.store
                .save_transcription(date, id, &transcription)
                .await?,
        );
        event.transcription = Some(transcription.clone());
        self.store.save_event_record(event).await?;

        // Images
        let batch = services::image::request(
            self.providers.image.as_ref(),
            text,
            &transcription,
            self.settings.max_images_per_event,
            self.settings.image_width,
            self.settings.image_height,
        )
        .await?;

        if batch.is_truncated() {
            warn!(
                event_id = %id,
                expected = batch.expected,
                actual = batch.images.len(),
                "Image generation came up short"
            );
            event.warnings.push(GenerationWarning::ImagesTruncated {
                expected: batch.expected,
                actual: batch.images.len(),
            });
        }

        event.image_paths = self.store.save_images(date, id, &batch.images).await?;
        self.store.save_event_record(event).await?;

        info!(event_id = %id, "Event generated");
        Ok(())
    }
}
