//! Event store integration tests
//!
//! Exercises the on-disk contract: directory layout, artifact writes,
//! record round trips, and corrupt-record tolerance on load.

use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;

use tdih::core::{EventStore, StoreError};
use tdih::domain::{Event, TranscriptSegment, Transcription};

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn sample_transcription() -> Transcription {
    Transcription {
        duration: 21.7,
        segments: vec![
            TranscriptSegment {
                start: 0.0,
                end: 10.2,
                text: "First span".to_string(),
            },
            TranscriptSegment {
                start: 10.2,
                end: 21.7,
                text: "Second span".to_string(),
            },
        ],
    }
}

#[tokio::test]
async fn test_record_round_trip_is_lossless() {
    let temp = TempDir::new().unwrap();
    let store = EventStore::new(temp.path());
    let date = test_date();

    let mut event = Event::new(date);
    event.text = Some("On this day in 1924...".to_string());
    event.title = Some("Winter Games".to_string());
    event.description = Some("First winter olympics".to_string());
    event.tags = vec!["olympics".to_string(), "france".to_string(), "sport".to_string()];
    event.text_path = Some(store.event_dir(date, event.id).join("text.txt"));
    event.audio_path = Some(store.event_dir(date, event.id).join("tts.mp3"));
    event.transcription = Some(sample_transcription());
    event.image_paths = vec![
        store.event_dir(date, event.id).join("images/image_0.png"),
        store.event_dir(date, event.id).join("images/image_1.png"),
    ];

    store.save_event_record(&event).await.unwrap();

    let loaded = store.load_events(date).await.unwrap();
    assert_eq!(loaded.len(), 1);

    let loaded = &loaded[0];
    assert_eq!(loaded.id, event.id);
    assert_eq!(loaded.date, event.date);
    assert_eq!(loaded.text, event.text);
    assert_eq!(loaded.title, event.title);
    assert_eq!(loaded.description, event.description);
    // Tag order is significant for hashtag rendering
    assert_eq!(loaded.tags, event.tags);
    assert_eq!(loaded.transcription, event.transcription);
    // Image path order is significant for slide cycling
    assert_eq!(loaded.image_paths, event.image_paths);
}

#[tokio::test]
async fn test_save_images_preserves_input_order() {
    let temp = TempDir::new().unwrap();
    let store = EventStore::new(temp.path());
    let id = Uuid::new_v4();

    let images = vec![
        (b"AAAA".to_vec(), "image_0.png".to_string()),
        (b"BBBB".to_vec(), "image_1.png".to_string()),
        (b"CCCC".to_vec(), "image_2.png".to_string()),
    ];

    let paths = store.save_images(test_date(), id, &images).await.unwrap();

    assert_eq!(paths.len(), 3);
    for (path, (bytes, name)) in paths.iter().zip(&images) {
        assert!(path.ends_with(format!("images/{}", name)));
        let written = std::fs::read(temp.path().join(path)).unwrap();
        assert_eq!(&written, bytes);
    }
}

#[tokio::test]
async fn test_save_audio_rejects_empty_bytes() {
    let temp = TempDir::new().unwrap();
    let store = EventStore::new(temp.path());
    let date = test_date();
    let id = Uuid::new_v4();

    let err = store.save_audio(date, id, &[]).await.unwrap_err();
    assert!(matches!(err, StoreError::EmptyArtifact(_)));

    // No file, and no event directory either
    assert!(!temp.path().join(store.event_dir(date, id)).exists());
}

#[tokio::test]
async fn test_saves_overwrite_instead_of_duplicating() {
    let temp = TempDir::new().unwrap();
    let store = EventStore::new(temp.path());
    let date = test_date();
    let id = Uuid::new_v4();

    let first = store.save_text(date, id, "first version").await.unwrap();
    let second = store.save_text(date, id, "second version").await.unwrap();
    assert_eq!(first, second);

    let content = std::fs::read_to_string(temp.path().join(&second)).unwrap();
    assert_eq!(content, "second version");

    // Still exactly one file in the event directory
    let entries: Vec<_> = std::fs::read_dir(temp.path().join(store.event_dir(date, id)))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_corrupt_record_does_not_block_siblings() {
    let temp = TempDir::new().unwrap();
    let store = EventStore::new(temp.path());
    let date = test_date();

    let mut first = Event::new(date);
    first.text = Some("valid one".to_string());
    store.save_event_record(&first).await.unwrap();

    let mut second = Event::new(date);
    second.text = Some("valid two".to_string());
    store.save_event_record(&second).await.unwrap();

    // A third directory with an unparseable record
    let corrupt_dir = temp
        .path()
        .join("videos")
        .join(date.to_string())
        .join(Uuid::new_v4().to_string());
    std::fs::create_dir_all(&corrupt_dir).unwrap();
    std::fs::write(corrupt_dir.join("event.json"), "{ not json").unwrap();

    let loaded = store.load_events(date).await.unwrap();
    assert_eq!(loaded.len(), 2);

    let mut texts: Vec<_> = loaded.iter().map(|e| e.text.clone().unwrap()).collect();
    texts.sort();
    assert_eq!(texts, vec!["valid one", "valid two"]);
}

#[tokio::test]
async fn test_load_events_is_scoped_to_the_date() {
    let temp = TempDir::new().unwrap();
    let store = EventStore::new(temp.path());

    let mut event = Event::new(test_date());
    event.text = Some("january first".to_string());
    store.save_event_record(&event).await.unwrap();

    let other_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut other = Event::new(other_date);
    other.text = Some("january second".to_string());
    store.save_event_record(&other).await.unwrap();

    let loaded = store.load_events(test_date()).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].text.as_deref(), Some("january first"));
}

#[tokio::test]
async fn test_transcription_artifact_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = EventStore::new(temp.path());
    let id = Uuid::new_v4();

    let transcription = sample_transcription();
    let path = store
        .save_transcription(test_date(), id, &transcription)
        .await
        .unwrap();

    assert!(path.ends_with("transcription.json"));
    let content = std::fs::read_to_string(temp.path().join(&path)).unwrap();
    let parsed: Transcription = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, transcription);
}

#[tokio::test]
async fn test_stored_paths_survive_root_relocation() {
    let temp = TempDir::new().unwrap();
    let original_root = temp.path().join("original");
    let store = EventStore::new(&original_root);
    let date = test_date();

    let mut event = Event::new(date);
    event.text = Some("movable".to_string());
    event.text_path = Some(store.save_text(date, event.id, "movable").await.unwrap());
    store.save_event_record(&event).await.unwrap();

    // Move the whole root; relative structure is preserved
    let moved_root = temp.path().join("moved");
    std::fs::rename(&original_root, &moved_root).unwrap();

    let moved_store = EventStore::new(&moved_root);
    let loaded = moved_store.load_events(date).await.unwrap();
    assert_eq!(loaded.len(), 1);

    let text_path = loaded[0].text_path.as_ref().unwrap();
    assert!(text_path.is_relative());
    assert_eq!(
        std::fs::read_to_string(moved_store.absolute(text_path)).unwrap(),
        "movable"
    );
}
