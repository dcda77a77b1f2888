//! Map feed features to domain records.
//!
//! Category strings are normalized to the checked enumeration here, at
//! the boundary between dataset and core: an unknown category fails the
//! whole fetch rather than surfacing deep inside formatting.

use crate::adapters::beachwatch::client::FeedFeature;
use crate::domain::{BotError, ForecastCategory, ForecastRecord};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use geo::Point;

/// The feed's "no forecast" sentinel.
const UNAVAILABLE: &str = "Forecast not available";

pub(crate) fn feature_to_record(feature: FeedFeature) -> Result<ForecastRecord, BotError> {
    let coords = &feature.geometry.coordinates;
    if coords.len() < 2 {
        return Err(BotError::Data(format!(
            "site '{}' has malformed coordinates",
            feature.properties.site_name
        )));
    }

    Ok(ForecastRecord {
        location: Point::new(coords[0], coords[1]),
        category: parse_category(&feature.properties.pollution_forecast)?,
        forecast_at: parse_timestamp(&feature.properties.pollution_forecast_time_stamp)?,
        site_name: feature.properties.site_name,
    })
}

/// `None` for the unavailable sentinel; unknown strings are a config
/// error (the glyph/colour mapping could never cover them).
fn parse_category(raw: &str) -> Result<Option<ForecastCategory>, BotError> {
    match raw {
        "Likely" => Ok(Some(ForecastCategory::Likely)),
        "Possible" => Ok(Some(ForecastCategory::Possible)),
        "Unlikely" => Ok(Some(ForecastCategory::Unlikely)),
        UNAVAILABLE => Ok(None),
        other => Err(BotError::Config(format!(
            "unknown forecast category: {other}"
        ))),
    }
}

/// Lenient timestamp parse. The feed is ISO-8601-ish but sub-second
/// precision and the offset come and go; timestamps without an offset
/// are taken as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, BotError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    Err(BotError::Data(format!(
        "unparseable forecast timestamp: {raw}"
    )))
}
