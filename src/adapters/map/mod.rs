//! Map renderer adapters. Actual raster drawing is an external
//! collaborator; the core only consumes the port.

use crate::domain::{BotError, Partition};
use crate::ports::MapRendererPort;
use std::path::PathBuf;
use tracing::debug;

/// Renderer that never produces an image. Regions publish text-only.
#[derive(Debug, Default)]
pub struct NoopMapRenderer;

impl NoopMapRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl MapRendererPort for NoopMapRenderer {
    async fn render(&self, region: &str, data: &Partition) -> Result<Option<PathBuf>, BotError> {
        debug!(region, records = data.record_count(), "map rendering disabled");
        Ok(None)
    }
}
