//! Infrastructure adapters. Implement outbound ports.
//!
//! Beachwatch feed, boundary files, map renderer, Mastodon. Map errors
//! to BotError.

pub mod beachwatch;
pub mod geofence;
pub mod map;
pub mod mastodon;
