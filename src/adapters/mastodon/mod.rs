//! Mastodon publishing adapters: real REST client and logging fallback.

pub mod client;
pub mod log_publisher;

pub use client::MastodonPublisher;
pub use log_publisher::LogPublisher;
