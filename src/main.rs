//! Wiring & DI. Entry point: bootstrap adapters, inject into the report
//! service, run once or on the configured schedule.
//! No business logic here; the run itself lives in ReportService.

use beachbot::adapters::beachwatch::{BeachwatchClient, DEFAULT_FEED_URL};
use beachbot::adapters::geofence::GeofenceStore;
use beachbot::adapters::map::NoopMapRenderer;
use beachbot::adapters::mastodon::{LogPublisher, MastodonPublisher};
use beachbot::domain::{BotError, StyleMap};
use beachbot::ports::{BoundaryPort, ForecastSource, MapRendererPort, PublisherPort};
use beachbot::shared::config::AppConfig;
use beachbot::usecases::{ReportConfig, ReportService, Scheduler};
use chrono_tz::Tz;
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let cfg = AppConfig::load().unwrap_or_default();

    let timezone: Tz = cfg
        .timezone_or_default()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid timezone: {e}"))?;

    let area_file = PathBuf::from(cfg.area_file_or_default());
    let areas = beachbot::shared::config::load_areas(&area_file).await?;
    info!(
        count = areas.len(),
        path = %area_file.display(),
        "loaded region configuration"
    );

    let feed_url = cfg
        .feed_url
        .clone()
        .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
    let source: Arc<dyn ForecastSource> = Arc::new(BeachwatchClient::new(feed_url));
    let boundaries: Arc<dyn BoundaryPort> = Arc::new(GeofenceStore::new());
    let renderer: Arc<dyn MapRendererPort> = Arc::new(NoopMapRenderer::new());

    let publisher: Arc<dyn PublisherPort> = match cfg.token.as_deref() {
        Some(token) if !token.is_empty() => {
            info!(server = %cfg.server_or_default(), "publishing to Mastodon");
            Arc::new(MastodonPublisher::new(cfg.server_or_default(), token))
        }
        _ => {
            warn!("TOKEN not set, statuses will only be logged");
            Arc::new(LogPublisher::new())
        }
    };

    let service = Arc::new(ReportService::new(
        boundaries,
        renderer,
        publisher,
        ReportConfig {
            areas,
            max_len: cfg.maxlen_or_default(),
            timezone,
            styles: StyleMap::default(),
        },
    ));

    let runtimes = cfg.runtimes.clone().unwrap_or_default();
    let scheduler = Scheduler::parse(&runtimes, timezone)?;

    if scheduler.is_empty() {
        info!("RUNTIMES not set; running once");
        run_once(&*source, &service).await?;
    } else {
        let job = || {
            let source = Arc::clone(&source);
            let service = Arc::clone(&service);
            async move { run_once(&*source, &service).await }
        };
        scheduler.run_loop(job).await;
    }

    Ok(())
}

/// One full run: fetch the dataset, then partition/format/publish.
async fn run_once(source: &dyn ForecastSource, service: &ReportService) -> Result<(), BotError> {
    let records = source.fetch().await?;
    let report = service.run(&records).await?;
    info!(
        published = report.published,
        skipped = report.skipped,
        "run complete"
    );
    Ok(())
}
