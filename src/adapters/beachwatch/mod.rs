//! Beachwatch feed adapter: HTTP client + feature-to-record mapping.

pub mod client;
pub mod mapper;

pub use client::{BeachwatchClient, DEFAULT_FEED_URL};
