//! Mastodon adapter. Implements PublisherPort via the instance REST API.
//!
//! Two endpoints: media upload (multipart) and status creation (JSON).
//! Authentication is a bearer access token; rate limits are left to the
//! server and surface as publish errors.

use crate::domain::BotError;
use crate::ports::{MediaId, PublisherPort, StatusId};
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const STATUSES_PATH: &str = "/api/v1/statuses";
const MEDIA_PATH: &str = "/api/v2/media";

pub struct MastodonPublisher {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl MastodonPublisher {
    /// # Arguments
    /// * `base_url` - Instance URL, e.g. "https://mastodon.example"
    /// * `token` - Access token with write:statuses and write:media scope
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_reply_to_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    media_ids: Vec<&'a str>,
}

#[derive(Deserialize)]
struct StatusResponse {
    id: String,
}

#[derive(Deserialize)]
struct MediaResponse {
    id: String,
}

#[async_trait::async_trait]
impl PublisherPort for MastodonPublisher {
    async fn upload_media(&self, file: &Path, description: &str) -> Result<MediaId, BotError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| BotError::Publish(format!("read media {}: {e}", file.display())))?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());

        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name))
            .text("description", description.to_string());

        let response = self
            .client
            .post(format!("{}{}", self.base_url, MEDIA_PATH))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BotError::Publish(format!("media upload failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(BotError::Publish(format!(
                "media API error {status}: {text}"
            )));
        }

        let media: MediaResponse = response
            .json()
            .await
            .map_err(|e| BotError::Publish(format!("malformed media response: {e}")))?;

        debug!(media_id = %media.id, path = %file.display(), "uploaded media");
        Ok(media.id)
    }

    async fn post_status(
        &self,
        text: &str,
        in_reply_to: Option<&StatusId>,
        media: Option<&MediaId>,
    ) -> Result<StatusId, BotError> {
        let request = StatusRequest {
            status: text,
            in_reply_to_id: in_reply_to.map(String::as_str),
            media_ids: media.map(String::as_str).into_iter().collect(),
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, STATUSES_PATH))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Publish(format!("status post failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(BotError::Publish(format!(
                "status API error {status}: {text}"
            )));
        }

        let posted: StatusResponse = response
            .json()
            .await
            .map_err(|e| BotError::Publish(format!("malformed status response: {e}")))?;

        info!(status_id = %posted.id, chars = text.chars().count(), "posted status");
        Ok(posted.id)
    }
}
