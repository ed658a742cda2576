//! File-system-backed persistence for events and their binary artifacts.
//!
//! Layout per event:
//! `<root>/videos/<date>/<id>/{event.json, text.txt, tts.mp3,
//! transcription.json, images/<name>, video.mp4}`
//!
//! `event.json` is the canonical record; every other file is referenced
//! from it by a path relative to the project root, so a relocated root
//! keeps records valid as long as the relative structure is preserved.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use crate::config::EVENTS_DIR_NAME;
use crate::domain::{Event, Transcription};

const RECORD_FILE: &str = "event.json";
const TEXT_FILE: &str = "text.txt";
const AUDIO_FILE: &str = "tts.mp3";
const TRANSCRIPTION_FILE: &str = "transcription.json";
const IMAGES_DIR: &str = "images";
const VIDEO_FILE: &str = "video.mp4";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A save was attempted with no bytes to write
    #[error("empty artifact: {0}")]
    EmptyArtifact(&'static str),

    /// A persisted record failed to parse (skipped on load, never fatal)
    #[error("corrupt record at {path}: {source}")]
    CorruptRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid events glob: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// File-based event store rooted at the project root
pub struct EventStore {
    /// Absolute project root; all stored paths are relative to it
    root: PathBuf,
}

impl EventStore {
    /// Create a store for a project root. Directories are created lazily
    /// on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project root all stored paths are relative to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Event directory for (date, id), relative to the project root:
    /// `videos/<date>/<id>/`
    pub fn event_dir(&self, date: NaiveDate, id: Uuid) -> PathBuf {
        PathBuf::from(EVENTS_DIR_NAME)
            .join(date.to_string())
            .join(id.to_string())
    }

    /// Relative path of the rendered video for (date, id)
    pub fn video_path(&self, date: NaiveDate, id: Uuid) -> PathBuf {
        self.event_dir(date, id).join(VIDEO_FILE)
    }

    /// Resolve a root-relative path to an absolute one
    pub fn absolute(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Write the narration text to `text.txt`; overwrites if present.
    /// Returns the root-relative path.
    pub async fn save_text(
        &self,
        date: NaiveDate,
        id: Uuid,
        text: &str,
    ) -> Result<PathBuf, StoreError> {
        let relative = self.event_dir(date, id).join(TEXT_FILE);
        self.write_file(&relative, text.as_bytes()).await?;
        Ok(relative)
    }

    /// Write synthesized speech to `tts.mp3`.
    ///
    /// Fails with `EmptyArtifact` when given no bytes; no file is created
    /// in that case.
    pub async fn save_audio(
        &self,
        date: NaiveDate,
        id: Uuid,
        audio: &[u8],
    ) -> Result<PathBuf, StoreError> {
        if audio.is_empty() {
            return Err(StoreError::EmptyArtifact("speech audio"));
        }

        let relative = self.event_dir(date, id).join(AUDIO_FILE);
        self.write_file(&relative, audio).await?;
        Ok(relative)
    }

    /// Serialize the transcript to `transcription.json`
    pub async fn save_transcription(
        &self,
        date: NaiveDate,
        id: Uuid,
        transcription: &Transcription,
    ) -> Result<PathBuf, StoreError> {
        let relative = self.event_dir(date, id).join(TRANSCRIPTION_FILE);
        let json = serde_json::to_string_pretty(transcription)?;
        self.write_file(&relative, json.as_bytes()).await?;
        Ok(relative)
    }

    /// Write each `(bytes, name)` pair under `images/<name>`, preserving
    /// input order. The returned path order matches the input order; slide
    /// generation depends on this for index-based cycling.
    pub async fn save_images(
        &self,
        date: NaiveDate,
        id: Uuid,
        images: &[(Vec<u8>, String)],
    ) -> Result<Vec<PathBuf>, StoreError> {
        let mut paths = Vec::with_capacity(images.len());

        for (bytes, name) in images {
            let relative = self.event_dir(date, id).join(IMAGES_DIR).join(name);
            self.write_file(&relative, bytes).await?;
            paths.push(relative);
        }

        Ok(paths)
    }

    /// Persist the full event record as `event.json`; idempotent full
    /// overwrite (last writer wins).
    pub async fn save_event_record(&self, event: &Event) -> Result<(), StoreError> {
        let relative = self.event_dir(event.date, event.id).join(RECORD_FILE);
        let json = serde_json::to_string_pretty(event)?;
        self.write_file(&relative, json.as_bytes()).await?;
        Ok(())
    }

    /// Load every event record for a date.
    ///
    /// Unparseable records are skipped with a logged warning; one corrupt
    /// event must not block loading the rest.
    pub async fn load_events(&self, date: NaiveDate) -> Result<Vec<Event>, StoreError> {
        let pattern = self
            .root
            .join(EVENTS_DIR_NAME)
            .join(date.to_string())
            .join("*")
            .join(RECORD_FILE);

        let mut events = Vec::new();

        for entry in glob::glob(&pattern.to_string_lossy())? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };

            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable event record");
                    continue;
                }
            };

            match serde_json::from_str::<Event>(&content) {
                Ok(event) => events.push(event),
                Err(source) => {
                    let err = StoreError::CorruptRecord { path, source };
                    warn!(error = %err, "Skipping corrupt event record");
                }
            }
        }

        Ok(events)
    }

    /// Write bytes to a root-relative path, creating parent directories
    async fn write_file(&self, relative: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let absolute = self.absolute(relative);

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await.map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&absolute, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: absolute,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_dir_layout() {
        let store = EventStore::new("/data/tdih");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();

        let dir = store.event_dir(date, id);
        assert_eq!(
            dir,
            PathBuf::from("videos/2024-01-01/550e8400-e29b-41d4-a716-446655440000")
        );
        // Relative to the root, so records survive a root move
        assert!(dir.is_relative());

        assert_eq!(
            store.absolute(&dir),
            PathBuf::from("/data/tdih/videos/2024-01-01/550e8400-e29b-41d4-a716-446655440000")
        );
    }

    #[test]
    fn test_video_path_is_inside_event_dir() {
        let store = EventStore::new("/data/tdih");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let id = Uuid::new_v4();

        let video = store.video_path(date, id);
        assert!(video.starts_with(store.event_dir(date, id)));
        assert!(video.ends_with("video.mp4"));
    }
}
