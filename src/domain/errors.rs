//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    /// Malformed or missing source data: feed fetch/parse failures,
    /// unreadable boundary files, empty dataset.
    #[error("Data error: {0}")]
    Data(String),

    /// Bad operator-supplied configuration: unknown forecast category,
    /// missing glyph mapping, malformed region config entry.
    #[error("Config error: {0}")]
    Config(String),

    /// Propagated from the publisher (auth failure, network failure).
    #[error("Publish error: {0}")]
    Publish(String),

    /// Map renderer failed for a region.
    #[error("Render error: {0}")]
    Render(String),
}
