//! Logging publisher for development and dry runs.
//!
//! Wired instead of the real client when no access token is configured:
//! statuses land in the log, ids are sequential fakes.

use crate::domain::BotError;
use crate::ports::{MediaId, PublisherPort, StatusId};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct LogPublisher {
    next_id: AtomicU64,
}

impl LogPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait::async_trait]
impl PublisherPort for LogPublisher {
    async fn upload_media(&self, file: &Path, description: &str) -> Result<MediaId, BotError> {
        let id = self.next();
        info!(path = %file.display(), description, "[DRY RUN] media upload");
        Ok(format!("dry-media-{id}"))
    }

    async fn post_status(
        &self,
        text: &str,
        in_reply_to: Option<&StatusId>,
        media: Option<&MediaId>,
    ) -> Result<StatusId, BotError> {
        let id = self.next();
        info!(
            in_reply_to = in_reply_to.map(String::as_str),
            media = media.map(String::as_str),
            "[DRY RUN] status:\n{text}"
        );
        Ok(format!("dry-status-{id}"))
    }
}
