//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{BotError, ForecastRecord, Partition};
use geo::MultiPolygon;
use std::path::{Path, PathBuf};

/// Identifier of a published post, assigned by the publishing platform.
pub type StatusId = String;

/// Identifier of an uploaded media attachment.
pub type MediaId = String;

/// Forecast dataset source. Fetched once per run.
#[async_trait::async_trait]
pub trait ForecastSource: Send + Sync {
    /// Fetch and map the full dataset, in the source's iteration order.
    /// Unknown (non-sentinel) category strings fail with a config error.
    async fn fetch(&self) -> Result<Vec<ForecastRecord>, BotError>;
}

/// Region boundary loader. One boundary file per configured region.
#[async_trait::async_trait]
pub trait BoundaryPort: Send + Sync {
    /// Load a region's boundary polygon(s) from `path`, in geographic
    /// lon/lat with no reprojection. Missing/unreadable/non-polygonal
    /// files fail with a data error.
    async fn load(&self, path: &Path) -> Result<MultiPolygon<f64>, BotError>;
}

/// Map renderer. Produces an annotated raster image for a region, or
/// nothing when there is no data worth drawing. The core treats the
/// rendering itself as opaque.
#[async_trait::async_trait]
pub trait MapRendererPort: Send + Sync {
    async fn render(&self, region: &str, data: &Partition) -> Result<Option<PathBuf>, BotError>;
}

/// Social publisher. Authentication, transport, and rate limits are the
/// implementation's responsibility.
#[async_trait::async_trait]
pub trait PublisherPort: Send + Sync {
    /// Upload a media file with alt text; returns the attachment id.
    async fn upload_media(&self, file: &Path, description: &str) -> Result<MediaId, BotError>;

    /// Publish a post. `in_reply_to` threads the post under an earlier
    /// status; `media` attaches a previously uploaded file.
    async fn post_status(
        &self,
        text: &str,
        in_reply_to: Option<&StatusId>,
        media: Option<&MediaId>,
    ) -> Result<StatusId, BotError>;
}
