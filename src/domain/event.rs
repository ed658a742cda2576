//! The Event entity: one generated content unit.
//!
//! An Event accumulates content field by field as the pipeline runs:
//! text first, then the derived metadata, then speech audio, then the
//! timed transcript, then images, and finally the rendered video. Every
//! artifact written to disk is recorded here as a path relative to the
//! project root, so a serialized record stays valid when the root moves.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single generated content unit for one calendar date.
///
/// `event.json` is the canonical serialized form of this struct. Fields are
/// optional until the corresponding generation step has succeeded; each
/// successful step re-persists the whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event
    pub id: Uuid,

    /// Generation date (the logical "today" of the run)
    pub date: NaiveDate,

    /// Narration text
    #[serde(default)]
    pub text: Option<String>,

    /// Two-word title derived from the text
    #[serde(default)]
    pub title: Option<String>,

    /// Short description derived from the text
    #[serde(default)]
    pub description: Option<String>,

    /// Tags in generation order (order matters for hashtag rendering)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Path to text.txt, relative to the project root
    #[serde(default)]
    pub text_path: Option<PathBuf>,

    /// Path to tts.mp3, relative to the project root
    #[serde(default)]
    pub audio_path: Option<PathBuf>,

    /// Timed transcript of the synthesized speech
    #[serde(default)]
    pub transcription: Option<Transcription>,

    /// Path to transcription.json, relative to the project root
    #[serde(default)]
    pub transcription_path: Option<PathBuf>,

    /// Image paths in generation order, relative to the project root
    #[serde(default)]
    pub image_paths: Vec<PathBuf>,

    /// Path to the rendered video, set only after a successful render
    #[serde(default)]
    pub video_path: Option<PathBuf>,

    /// Recoverable problems observed while generating this event
    #[serde(default)]
    pub warnings: Vec<GenerationWarning>,
}

impl Event {
    /// Create a fresh event for a run date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            text: None,
            title: None,
            description: None,
            tags: Vec::new(),
            text_path: None,
            audio_path: None,
            transcription: None,
            transcription_path: None,
            image_paths: Vec::new(),
            video_path: None,
            warnings: Vec::new(),
        }
    }

    /// A complete event has every generation artifact (video not required;
    /// rendering is a separate pass).
    pub fn is_complete(&self) -> bool {
        self.text.is_some()
            && self.audio_path.is_some()
            && self.transcription.is_some()
            && !self.image_paths.is_empty()
    }

    /// Whether a render pass has produced a video for this event
    pub fn is_rendered(&self) -> bool {
        self.video_path.is_some()
    }
}

/// Timed transcript of synthesized speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Total audio duration in seconds
    pub duration: f64,

    /// Timed segments in narration order
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// A timed span of narrated text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment start, seconds from audio start
    pub start: f64,

    /// Segment end, seconds from audio start
    pub end: f64,

    /// Narrated text for this span
    pub text: String,
}

/// Recoverable generation problems, persisted on the event record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GenerationWarning {
    /// Fewer images were produced than the transcript called for
    ImagesTruncated { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transcription() -> Transcription {
        Transcription {
            duration: 12.5,
            segments: vec![
                TranscriptSegment {
                    start: 0.0,
                    end: 6.0,
                    text: "First span".to_string(),
                },
                TranscriptSegment {
                    start: 6.0,
                    end: 12.5,
                    text: "Second span".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let mut event = Event::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        event.text = Some("On this day...".to_string());
        event.tags = vec!["history".to_string(), "science".to_string()];
        event.transcription = Some(sample_transcription());
        event.image_paths = vec![
            PathBuf::from("videos/2024-01-01/x/images/image_0.png"),
            PathBuf::from("videos/2024-01-01/x/images/image_1.png"),
        ];

        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.date, event.date);
        assert_eq!(parsed.text, event.text);
        assert_eq!(parsed.tags, event.tags);
        assert_eq!(parsed.transcription, event.transcription);
        assert_eq!(parsed.image_paths, event.image_paths);
    }

    #[test]
    fn test_event_completeness() {
        let mut event = Event::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(!event.is_complete());

        event.text = Some("text".to_string());
        event.audio_path = Some(PathBuf::from("videos/2024-01-01/x/tts.mp3"));
        event.transcription = Some(sample_transcription());
        assert!(!event.is_complete());

        event.image_paths = vec![PathBuf::from("videos/2024-01-01/x/images/image_0.png")];
        assert!(event.is_complete());
        assert!(!event.is_rendered());
    }

    #[test]
    fn test_warning_serialization() {
        let warning = GenerationWarning::ImagesTruncated {
            expected: 5,
            actual: 3,
        };
        let json = serde_json::to_string(&warning).unwrap();
        let parsed: GenerationWarning = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, warning);
        assert!(json.contains("images_truncated"));
    }

    #[test]
    fn test_record_without_optional_fields_parses() {
        // A record persisted right after the text step has most fields absent
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "date": "2024-01-01",
            "text": "On this day...",
            "text_path": "videos/2024-01-01/550e8400-e29b-41d4-a716-446655440000/text.txt"
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert!(event.text.is_some());
        assert!(event.transcription.is_none());
        assert!(event.tags.is_empty());
        assert!(!event.is_complete());
    }
}
