//! Command-line interface for tdih.
//!
//! Provides commands for generating a date's events, rendering them into
//! videos, uploading the results, and inspecting configuration. Each
//! command is an idempotent re-run: existing complete work is skipped or
//! deterministically overwritten, never duplicated.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::adapters::OpenAiClient;
use crate::config::Settings;
use crate::core::{ApprovalGate, AutoApprove, ConsoleGate, EventStore, Generator, Providers};
use crate::domain::GenerationWarning;
use crate::publish::{VideoMetadata, YouTubePublisher};
use crate::render::Renderer;

/// tdih - today-in-history shorts generator
#[derive(Parser, Debug)]
#[command(name = "tdih")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate events for a date
    Generate {
        /// Date to generate for (YYYY-MM-DD, defaults to today)
        date: Option<NaiveDate>,

        /// Approve every generated text without prompting
        #[arg(short = 'y', long)]
        yes: bool,

        /// Override the configured batch size
        #[arg(short, long)]
        num_events: Option<usize>,
    },

    /// Generate one event from operator-provided text
    FromText {
        /// Narration text to build the event from
        text: String,

        /// Date to file the event under (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Render a date's events into videos
    Render {
        /// Date to render (defaults to today)
        date: Option<NaiveDate>,

        /// Re-render events that already have a video
        #[arg(long)]
        force: bool,
    },

    /// Upload a date's rendered videos
    Upload {
        /// Date to upload (defaults to today)
        date: Option<NaiveDate>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate {
                date,
                yes,
                num_events,
            } => generate(date, yes, num_events).await,
            Commands::FromText { text, date } => generate_from_text(text, date).await,
            Commands::Render { date, force } => render(date, force).await,
            Commands::Upload { date } => upload(date).await,
            Commands::Config => show_config(),
        }
    }
}

fn run_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn build_generator(settings: Settings) -> Generator {
    let client = Arc::new(OpenAiClient::new(settings.api_key.clone()));
    let providers = Providers::openai(client);
    let store = EventStore::new(settings.root.clone());
    Generator::new(providers, store, settings)
}

fn print_warning(warning: &GenerationWarning) {
    match warning {
        GenerationWarning::ImagesTruncated { expected, actual } => {
            println!("    warning: images truncated ({}/{})", actual, expected);
        }
    }
}

/// Generate a batch of events for a date
async fn generate(date: Option<NaiveDate>, yes: bool, num_events: Option<usize>) -> Result<()> {
    let mut settings = Settings::load().context("Failed to load settings")?;
    if let Some(n) = num_events {
        settings.num_events = n;
    }
    let date = run_date(date);

    let generator = build_generator(settings);
    let gate: Box<dyn ApprovalGate> = if yes {
        Box::new(AutoApprove)
    } else {
        Box::new(ConsoleGate)
    };

    let events = generator.generate_batch(date, gate.as_ref()).await?;

    if events.is_empty() {
        println!("Nothing to generate for {}", date);
        return Ok(());
    }

    println!("Generated {} event(s) for {}:", events.len(), date);
    for event in &events {
        let status = if event.is_complete() {
            "complete"
        } else {
            "partial"
        };
        println!(
            "  {}  {:<9} {}",
            event.id,
            status,
            event.title.as_deref().unwrap_or("-")
        );
        for warning in &event.warnings {
            print_warning(warning);
        }
    }

    Ok(())
}

/// Generate one event from given text
async fn generate_from_text(text: String, date: Option<NaiveDate>) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Text is empty");
    }

    let settings = Settings::load().context("Failed to load settings")?;
    let date = run_date(date);

    let generator = build_generator(settings);
    let event = generator.generate_from_text(date, &text).await?;

    println!("Generated event {} for {}", event.id, date);
    for warning in &event.warnings {
        print_warning(warning);
    }

    Ok(())
}

/// Render a date's events into videos
async fn render(date: Option<NaiveDate>, force: bool) -> Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    let date = run_date(date);

    let store = EventStore::new(settings.root.clone());
    let renderer = Renderer::new();

    let events = store.load_events(date).await?;
    if events.is_empty() {
        println!("No events found for {}", date);
        return Ok(());
    }

    for mut event in events {
        if !event.is_complete() {
            eprintln!("Skipping incomplete event {}", event.id);
            continue;
        }
        if event.is_rendered() && !force {
            eprintln!(
                "Skipping already rendered event {} (use --force to re-render)",
                event.id
            );
            continue;
        }

        let output_rel = store.video_path(date, event.id);
        match renderer.render_event(&settings, &event, &output_rel).await {
            Ok(()) => {
                event.video_path = Some(output_rel);
                store.save_event_record(&event).await?;
                println!("Rendered {}", event.id);
            }
            Err(e) => {
                eprintln!("Failed to render event {}: {:#}", event.id, e);
            }
        }
    }

    Ok(())
}

/// Upload a date's rendered videos
async fn upload(date: Option<NaiveDate>) -> Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    let date = run_date(date);

    let store = EventStore::new(settings.root.clone());
    let publisher = YouTubePublisher::new(settings.youtube.clone());

    let events = store.load_events(date).await?;
    let mut uploaded = 0;

    for event in &events {
        let Some(video_rel) = &event.video_path else {
            eprintln!("Skipping unrendered event {}", event.id);
            continue;
        };

        let video_abs = store.absolute(video_rel);
        if !video_abs.exists() {
            eprintln!(
                "Skipping event {}: video missing at {}",
                event.id,
                video_abs.display()
            );
            continue;
        }

        let metadata = VideoMetadata::from_event(event, &settings)?;
        match publisher.upload(&video_abs, &metadata).await {
            Ok(video_id) => {
                uploaded += 1;
                println!("Uploaded {} as {}", event.id, video_id);
            }
            Err(e) => {
                eprintln!("Upload failed for {}: {:#}", event.id, e);
            }
        }
    }

    println!("Uploaded {}/{} video(s) for {}", uploaded, events.len(), date);
    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;

    println!("tdih configuration");
    println!();
    println!(
        "Config file: {}",
        settings
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Root:   {}", settings.root.display());
    println!("  Events: {}", settings.events_dir().display());
    println!();
    println!("Pipeline:");
    println!("  Events per run:       {}", settings.num_events);
    println!("  Narration words:      {}", settings.words_count);
    println!("  Max images per event: {}", settings.max_images_per_event);
    println!(
        "  Video:                {}x{} @ {} fps",
        settings.video_width, settings.video_height, settings.video_fps
    );
    println!(
        "  Images:               {}x{}",
        settings.image_width, settings.image_height
    );
    println!("  Voices:               {}", settings.voices.voices().join(", "));
    println!("  Default tags:         {}", settings.default_tags.join(", "));
    println!();
    println!("YouTube:");
    println!("  Category:      {}", settings.youtube.category_id);
    println!("  Made for kids: {}", settings.youtube.made_for_kids);
    println!(
        "  OAuth client:  {}",
        if settings.youtube.client_id.is_some() {
            "configured"
        } else {
            "(not configured)"
        }
    );

    Ok(())
}
