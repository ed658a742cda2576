//! Video assembly from slides.
//!
//! Boundary collaborator: derives the slide sequence from a stored event
//! and shells out to ffmpeg to compose per-slide segments, concatenate
//! them, and mux in the narration audio. The core pipeline only sees the
//! resulting video path.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::Settings;
use crate::domain::{Event, Slide};

/// A full render may encode many segments
const RENDER_TIMEOUT: Duration = Duration::from_secs(600);

/// ffmpeg-backed slide renderer
pub struct Renderer {
    /// Path to the ffmpeg binary (FFMPEG_PATH overrides)
    binary_path: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        let binary_path = std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());
        Self { binary_path }
    }

    /// Render an event's slides into a video at `output_rel` (relative to
    /// the project root). The caller records the path on the event only
    /// after this returns success.
    pub async fn render_event(
        &self,
        settings: &Settings,
        event: &Event,
        output_rel: &Path,
    ) -> Result<()> {
        let slides = Slide::from_event(event)?;
        let audio_rel = event
            .audio_path
            .as_ref()
            .with_context(|| format!("event {} has no speech audio", event.id))?;
        let audio_abs = settings.root.join(audio_rel);

        let work_dir = tempfile::tempdir().context("Failed to create render work dir")?;

        // One encoded segment per slide, then a concat pass
        let mut segment_paths = Vec::with_capacity(slides.len());
        for (index, slide) in slides.iter().enumerate() {
            let segment = work_dir.path().join(format!("segment_{}.mp4", index));
            self.render_segment(settings, slide, &segment).await?;
            segment_paths.push(segment);
            debug!(index, "Rendered slide segment");
        }

        let list_path = work_dir.path().join("segments.txt");
        let list_content: String = segment_paths
            .iter()
            .map(|p| format!("file '{}'\n", p.display()))
            .collect();
        tokio::fs::write(&list_path, list_content)
            .await
            .context("Failed to write concat list")?;

        let output_abs = settings.root.join(output_rel);
        if let Some(parent) = output_abs.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create video output dir")?;
        }

        self.run_ffmpeg(&[
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
            &list_path.to_string_lossy(),
            "-i",
            &audio_abs.to_string_lossy(),
            "-c:v",
            "libx264",
            "-preset",
            "ultrafast",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-shortest",
            &output_abs.to_string_lossy(),
        ])
        .await?;

        info!(event_id = %event.id, output = %output_rel.display(), "Video rendered");
        Ok(())
    }

    /// Encode one slide: its background image looped for the slide
    /// duration with the narrated text drawn over it.
    async fn render_segment(
        &self,
        settings: &Settings,
        slide: &Slide,
        output: &Path,
    ) -> Result<()> {
        let image_abs = settings.root.join(&slide.background_image);
        let filter = format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},\
drawtext=text='{text}':fontcolor=white:fontsize=64:box=1:boxcolor=black@0.5:\
x=(w-text_w)/2:y=(h-text_h)/2",
            w = settings.video_width,
            h = settings.video_height,
            text = escape_drawtext(&slide.text),
        );

        self.run_ffmpeg(&[
            "-y",
            "-loop",
            "1",
            "-i",
            &image_abs.to_string_lossy(),
            "-t",
            &format!("{:.3}", slide.duration.max(0.1)),
            "-vf",
            &filter,
            "-r",
            &settings.video_fps.to_string(),
            "-pix_fmt",
            "yuv420p",
            &output.to_string_lossy(),
        ])
        .await
    }

    /// Run ffmpeg with a timeout, surfacing stderr on failure
    async fn run_ffmpeg(&self, args: &[&str]) -> Result<()> {
        let output = timeout(
            RENDER_TIMEOUT,
            Command::new(&self.binary_path).args(args).output(),
        )
        .await
        .with_context(|| format!("ffmpeg timed out after {:?}", RENDER_TIMEOUT))?
        .context("Failed to run ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "ffmpeg failed with exit code {}: {}",
                exit_code,
                stderr.trim()
            );
        }

        Ok(())
    }
}

/// Escape text for an ffmpeg drawtext filter argument
fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            ':' => escaped.push_str("\\:"),
            '%' => escaped.push_str("\\%"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_drawtext() {
        assert_eq!(escape_drawtext("plain words"), "plain words");
        assert_eq!(escape_drawtext("it's 10:30"), "it\\'s 10\\:30");
        assert_eq!(escape_drawtext("50% done\\"), "50\\% done\\\\");
    }

    #[test]
    fn test_ffmpeg_path_override() {
        // Default resolves to plain "ffmpeg" unless the env var is set
        let renderer = Renderer::new();
        assert!(!renderer.binary_path.is_empty());
    }
}
