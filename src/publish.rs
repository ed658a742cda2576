//! YouTube publishing boundary.
//!
//! Builds upload metadata from a stored event (title prefix, ordered
//! hashtags, description suffix) and pushes the rendered video through
//! the YouTube resumable-upload flow using an OAuth2 refresh token.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::{Settings, YouTubeSettings};
use crate::domain::Event;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";

/// Prepended to every upload title
pub const TITLE_PREFIX: &str = "Today in history:";

/// Appended to every upload description
pub const DESCRIPTION_SUFFIX: &str = "\u{2665} Generated by AI \u{2665}";

/// Upload metadata derived from an event
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub made_for_kids: bool,
}

impl VideoMetadata {
    /// Build upload metadata from a stored event.
    ///
    /// Event tags come first, then the configured default tags; hashtags
    /// render in that order.
    pub fn from_event(event: &Event, settings: &Settings) -> Result<Self> {
        let title = event
            .title
            .as_deref()
            .with_context(|| format!("event {} has no title", event.id))?;
        let description = event.description.as_deref().unwrap_or_default();

        let mut tags: Vec<String> = event
            .tags
            .iter()
            .chain(settings.default_tags.iter())
            .map(|tag| tag.to_lowercase().replace(' ', ""))
            .filter(|tag| !tag.is_empty())
            .collect();
        tags.dedup();

        let hashtags: Vec<String> = tags.iter().map(|tag| format!("#{}", tag)).collect();

        Ok(Self {
            title: format!("{} {} {}", TITLE_PREFIX, title, hashtags.join(" "))
                .trim()
                .to_string(),
            description: format!("{} {}", description, DESCRIPTION_SUFFIX)
                .trim()
                .to_string(),
            tags,
            category_id: settings.youtube.category_id.clone(),
            made_for_kids: settings.youtube.made_for_kids,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

/// YouTube Data API uploader
pub struct YouTubePublisher {
    settings: YouTubeSettings,
    client: reqwest::Client,
}

impl YouTubePublisher {
    pub fn new(settings: YouTubeSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    /// Exchange the refresh token for an access token
    async fn access_token(&self) -> Result<String> {
        let client_id = self
            .settings
            .client_id
            .as_deref()
            .context("YouTube OAuth client id is not configured")?;
        let client_secret = self
            .settings
            .client_secret
            .as_deref()
            .context("YouTube OAuth client secret is not configured")?;
        let refresh_token = self
            .settings
            .refresh_token
            .as_deref()
            .context("YouTube OAuth refresh token is not configured")?;

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to request access token")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Token refresh failed with {}: {}", status, body.trim());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        Ok(token.access_token)
    }

    /// Upload a rendered video; returns the platform video id.
    ///
    /// Uploads are private by default; publishing visibility is a manual
    /// step on the platform.
    pub async fn upload(&self, video_path: &Path, metadata: &VideoMetadata) -> Result<String> {
        let token = self.access_token().await?;

        let mut snippet = serde_json::json!({
            "title": metadata.title,
            "description": metadata.description,
            "tags": metadata.tags,
            "categoryId": metadata.category_id,
            "defaultLanguage": "en",
        });
        if let Some(channel_id) = &self.settings.channel_id {
            snippet["channelId"] = serde_json::json!(channel_id);
        }

        let body = serde_json::json!({
            "snippet": snippet,
            "status": {
                "privacyStatus": "private",
                "selfDeclaredMadeForKids": metadata.made_for_kids,
            },
        });

        // Resumable upload: create the session, then send the bytes
        let session = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .context("Failed to start upload session")?;

        if !session.status().is_success() {
            let status = session.status();
            let text = session.text().await.unwrap_or_default();
            anyhow::bail!("Upload session failed with {}: {}", status, text.trim());
        }

        let location = session
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .context("Upload session response had no location header")?
            .to_string();

        let video_bytes = tokio::fs::read(video_path)
            .await
            .with_context(|| format!("Failed to read video file: {}", video_path.display()))?;

        let response = self
            .client
            .put(&location)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, "video/mp4")
            .body(video_bytes)
            .send()
            .await
            .context("Failed to upload video bytes")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Video upload failed with {}: {}", status, text.trim());
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .context("Failed to parse upload response")?;

        Ok(uploaded.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event_with_metadata() -> Event {
        let mut event = Event::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        event.title = Some("Moon Landing".to_string());
        event.description = Some("A giant leap".to_string());
        event.tags = vec!["Apollo".to_string(), "Space Race".to_string()];
        event
    }

    #[test]
    fn test_metadata_renders_ordered_hashtags() {
        let mut settings = Settings::defaults("sk-test", "/tmp/tdih");
        settings.default_tags = vec!["history".to_string()];

        let metadata = VideoMetadata::from_event(&event_with_metadata(), &settings).unwrap();

        // Event tags first, lowercased and de-spaced, then defaults
        assert_eq!(metadata.tags, vec!["apollo", "spacerace", "history"]);
        assert_eq!(
            metadata.title,
            "Today in history: Moon Landing #apollo #spacerace #history"
        );
        assert!(metadata.description.starts_with("A giant leap"));
        assert!(metadata.description.ends_with(DESCRIPTION_SUFFIX));
    }

    #[test]
    fn test_metadata_requires_a_title() {
        let settings = Settings::defaults("sk-test", "/tmp/tdih");
        let mut event = event_with_metadata();
        event.title = None;

        assert!(VideoMetadata::from_event(&event, &settings).is_err());
    }

    #[test]
    fn test_category_and_kids_flag_come_from_settings() {
        let mut settings = Settings::defaults("sk-test", "/tmp/tdih");
        settings.youtube.category_id = "22".to_string();
        settings.youtube.made_for_kids = true;

        let metadata = VideoMetadata::from_event(&event_with_metadata(), &settings).unwrap();
        assert_eq!(metadata.category_id, "22");
        assert!(metadata.made_for_kids);
    }
}
