//! Beachwatch feed client. Implements ForecastSource.
//!
//! Fetches the public sites GeoJSON feed once per run and maps features
//! to domain records.

use crate::adapters::beachwatch::mapper;
use crate::domain::{BotError, ForecastRecord};
use crate::ports::ForecastSource;
use serde::Deserialize;
use tracing::info;

/// Public NSW Beachwatch sites feed.
pub const DEFAULT_FEED_URL: &str = "https://api.beachwatch.nsw.gov.au/public/sites/geojson";

/// Feed wire format: a GeoJSON-shaped FeatureCollection. Only the fields
/// the bot consumes are modelled.
#[derive(Debug, Deserialize)]
pub(crate) struct FeedDocument {
    pub features: Vec<FeedFeature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedFeature {
    pub properties: FeedProperties,
    pub geometry: FeedGeometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedProperties {
    #[serde(rename = "siteName")]
    pub site_name: String,
    #[serde(rename = "pollutionForecast")]
    pub pollution_forecast: String,
    #[serde(rename = "pollutionForecastTimeStamp")]
    pub pollution_forecast_time_stamp: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedGeometry {
    /// [longitude, latitude], possibly with trailing elements.
    pub coordinates: Vec<f64>,
}

pub struct BeachwatchClient {
    client: reqwest::Client,
    url: String,
}

impl BeachwatchClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ForecastSource for BeachwatchClient {
    async fn fetch(&self) -> Result<Vec<ForecastRecord>, BotError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BotError::Data(format!("feed request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(BotError::Data(format!(
                "feed returned HTTP {}",
                response.status()
            )));
        }

        let document: FeedDocument = response
            .json()
            .await
            .map_err(|e| BotError::Data(format!("malformed feed document: {e}")))?;

        let mut records = Vec::with_capacity(document.features.len());
        for feature in document.features {
            records.push(mapper::feature_to_record(feature)?);
        }

        info!(count = records.len(), url = %self.url, "fetched forecast dataset");
        Ok(records)
    }
}
