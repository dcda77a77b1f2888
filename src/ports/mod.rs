//! Port traits. API boundaries for the hexagon.
//!
//! All ports here are outbound: the application calls into infrastructure
//! (feed, boundary files, renderer, publisher).

pub mod outbound;

pub use outbound::{
    BoundaryPort, ForecastSource, MapRendererPort, MediaId, PublisherPort, StatusId,
};
