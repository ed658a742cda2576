//! Configuration for the tdih pipeline.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (OPENAI_API_KEY, TDIH_ROOT, ...)
//! 2. Config file (.tdih/config.yaml)
//! 3. Defaults (~/.tdih)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tdih/config.yaml
//!
//! Settings are loaded once at startup and passed down explicitly; there is
//! no process-global cache.

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;

/// Directory under the project root where events are stored
pub const EVENTS_DIR_NAME: &str = "videos";

/// Configuration errors, fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    MissingRequired(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Unparseable {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("could not determine a home directory for the default root")]
    NoHomeDir,
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub num_events: Option<usize>,
    #[serde(default)]
    pub words_count: Option<usize>,
    #[serde(default)]
    pub max_images_per_event: Option<usize>,
    #[serde(default)]
    pub video: Option<VideoConfig>,
    #[serde(default)]
    pub image: Option<ImageConfig>,
    #[serde(default)]
    pub default_tags: Option<Vec<String>>,
    #[serde(default)]
    pub voices: Option<Vec<String>>,
    #[serde(default)]
    pub youtube: Option<YouTubeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YouTubeConfig {
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub category_id: Option<String>,
    pub made_for_kids: Option<bool>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

/// Resolved process-wide settings, immutable after load
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenAI API credential (required)
    pub api_key: String,

    /// Project root; all persisted paths are relative to this
    pub root: PathBuf,

    /// Events to generate per run
    pub num_events: usize,

    /// Target narration length in words
    pub words_count: usize,

    /// Upper bound on generated images per event
    pub max_images_per_event: usize,

    /// Target video dimensions and frame rate
    pub video_width: u32,
    pub video_height: u32,
    pub video_fps: u32,

    /// Generated image dimensions
    pub image_width: u32,
    pub image_height: u32,

    /// Tags appended to every upload
    pub default_tags: Vec<String>,

    /// Voice selection policy for speech synthesis
    pub voices: VoicePolicy,

    /// Publishing target metadata and OAuth client fields
    pub youtube: YouTubeSettings,

    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// YouTube publishing settings. Upload fields stay optional here; the
/// publisher checks for them when an upload is actually attempted.
#[derive(Debug, Clone, Default)]
pub struct YouTubeSettings {
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub category_id: String,
    pub made_for_kids: bool,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

/// Allowed speech voices plus a pick-one-at-random operation
#[derive(Debug, Clone)]
pub struct VoicePolicy {
    voices: Vec<String>,
}

impl Default for VoicePolicy {
    fn default() -> Self {
        Self {
            voices: ["alloy", "echo", "fable", "onyx", "nova", "shimmer"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
        }
    }
}

impl VoicePolicy {
    /// Build a policy from an explicit voice list; an empty list falls back
    /// to the default set.
    pub fn new(voices: Vec<String>) -> Self {
        if voices.is_empty() {
            Self::default()
        } else {
            Self { voices }
        }
    }

    pub fn voices(&self) -> &[String] {
        &self.voices
    }

    /// Pick one allowed voice at random
    pub fn pick(&self) -> &str {
        self.voices
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .expect("voice list is never empty")
    }
}

impl Settings {
    /// Defaults for a given credential and project root. Used by `load` and
    /// by tests that need settings without touching the environment.
    pub fn defaults(api_key: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            api_key: api_key.into(),
            root: root.into(),
            num_events: 2,
            words_count: 30,
            max_images_per_event: 5,
            video_width: 1080,
            video_height: 1920,
            video_fps: 30,
            image_width: 1024,
            image_height: 1024,
            default_tags: vec!["history".to_string(), "todayinhistory".to_string()],
            voices: VoicePolicy::default(),
            youtube: YouTubeSettings {
                category_id: "27".to_string(), // Education
                ..Default::default()
            },
            config_file: None,
        }
    }

    /// Events root: `<root>/videos`
    pub fn events_dir(&self) -> PathBuf {
        self.root.join(EVENTS_DIR_NAME)
    }

    /// Load settings from the environment and an optional config file.
    ///
    /// A missing `OPENAI_API_KEY` is fatal.
    pub fn load() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingRequired("OPENAI_API_KEY"))?;

        let config_file = find_config_file();
        let file = match &config_file {
            Some(path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };

        // Root: env > file > ~/.tdih
        let root = if let Ok(env_root) = std::env::var("TDIH_ROOT") {
            PathBuf::from(env_root)
        } else if let Some(file_root) = &file.root {
            // Relative file paths resolve against the config file's project dir
            let base = config_file
                .as_ref()
                .and_then(|p| p.parent())
                .and_then(|p| p.parent())
                .unwrap_or(Path::new("."));
            let p = PathBuf::from(file_root);
            if p.is_absolute() {
                p
            } else {
                base.join(p)
            }
        } else {
            dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join(".tdih")
        };

        let mut settings = Self::defaults(api_key, root);
        settings.config_file = config_file;

        if let Some(n) = file.num_events {
            settings.num_events = n;
        }
        if let Some(n) = file.words_count {
            settings.words_count = n;
        }
        if let Some(n) = file.max_images_per_event {
            settings.max_images_per_event = n;
        }
        if let Some(video) = &file.video {
            settings.video_width = video.width.unwrap_or(settings.video_width);
            settings.video_height = video.height.unwrap_or(settings.video_height);
            settings.video_fps = video.fps.unwrap_or(settings.video_fps);
        }
        if let Some(image) = &file.image {
            settings.image_width = image.width.unwrap_or(settings.image_width);
            settings.image_height = image.height.unwrap_or(settings.image_height);
        }
        if let Some(tags) = file.default_tags {
            settings.default_tags = tags;
        }
        if let Some(voices) = file.voices {
            settings.voices = VoicePolicy::new(voices);
        }
        if let Some(yt) = file.youtube {
            settings.youtube = YouTubeSettings {
                channel_id: yt.channel_id,
                channel_title: yt.channel_title,
                category_id: yt.category_id.unwrap_or_else(|| "27".to_string()),
                made_for_kids: yt.made_for_kids.unwrap_or(false),
                client_id: yt.client_id,
                client_secret: yt.client_secret,
                refresh_token: yt.refresh_token,
            };
        }

        // Env overrides on top of the file
        if let Some(n) = env_usize("TDIH_NUM_EVENTS")? {
            settings.num_events = n;
        }
        if let Some(n) = env_usize("TDIH_WORDS_COUNT")? {
            settings.words_count = n;
        }
        if let Some(n) = env_usize("TDIH_MAX_IMAGES")? {
            settings.max_images_per_event = n;
        }
        for (var, slot) in [
            ("YOUTUBE_CHANNEL_ID", &mut settings.youtube.channel_id),
            ("YOUTUBE_CHANNEL_TITLE", &mut settings.youtube.channel_title),
            ("YOUTUBE_CLIENT_ID", &mut settings.youtube.client_id),
            ("YOUTUBE_CLIENT_SECRET", &mut settings.youtube.client_secret),
            ("YOUTUBE_REFRESH_TOKEN", &mut settings.youtube.refresh_token),
        ] {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    *slot = Some(value);
                }
            }
        }
        if let Ok(value) = std::env::var("YOUTUBE_CATEGORY_ID") {
            if !value.trim().is_empty() {
                settings.youtube.category_id = value;
            }
        }
        if let Ok(value) = std::env::var("YOUTUBE_MADE_FOR_KIDS") {
            settings.youtube.made_for_kids = match value.as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(ConfigError::Invalid {
                        key: "YOUTUBE_MADE_FOR_KIDS",
                        value: other.to_string(),
                    })
                }
            };
        }

        Ok(settings)
    }
}

fn env_usize(key: &'static str) -> Result<Option<usize>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(None),
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".tdih").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Unparseable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::defaults("sk-test", "/tmp/tdih");
        assert_eq!(settings.num_events, 2);
        assert_eq!(settings.words_count, 30);
        assert_eq!(settings.max_images_per_event, 5);
        assert_eq!(settings.video_width, 1080);
        assert_eq!(settings.video_height, 1920);
        assert_eq!(settings.events_dir(), PathBuf::from("/tmp/tdih/videos"));
        assert_eq!(settings.youtube.category_id, "27");
        assert!(!settings.youtube.made_for_kids);
    }

    #[test]
    fn test_voice_policy_picks_from_allowed_set() {
        let policy = VoicePolicy::default();
        for _ in 0..20 {
            let voice = policy.pick();
            assert!(policy.voices().iter().any(|v| v == voice));
        }
    }

    #[test]
    fn test_voice_policy_empty_list_falls_back() {
        let policy = VoicePolicy::new(Vec::new());
        assert_eq!(policy.voices().len(), 6);

        let custom = VoicePolicy::new(vec!["nova".to_string()]);
        assert_eq!(custom.pick(), "nova");
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let tdih_dir = temp.path().join(".tdih");
        std::fs::create_dir_all(&tdih_dir).unwrap();

        let config_path = tdih_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
num_events: 4
words_count: 45
video:
  width: 720
  height: 1280
voices:
  - nova
  - onyx
youtube:
  category_id: "22"
  made_for_kids: true
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.num_events, Some(4));
        assert_eq!(config.words_count, Some(45));
        assert_eq!(config.video.as_ref().unwrap().width, Some(720));
        assert_eq!(config.voices.as_ref().unwrap().len(), 2);
        assert_eq!(
            config.youtube.as_ref().unwrap().category_id.as_deref(),
            Some("22")
        );
    }

    #[test]
    fn test_config_file_unparseable() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, ": not yaml [").unwrap();

        match load_config_file(&config_path) {
            Err(ConfigError::Unparseable { path, .. }) => assert_eq!(path, config_path),
            other => panic!("expected Unparseable, got {:?}", other),
        }
    }
}
