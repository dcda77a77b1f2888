//! Report service: one full run from dataset to published thread.
//!
//! For each configured region: load boundary -> partition -> format ->
//! render, then publish an intro post and each region's summary as a
//! reply under it. Orchestration only; the partition and summary steps
//! are pure functions.

use crate::domain::{BotError, ForecastRecord, StyleMap};
use crate::ports::{BoundaryPort, MapRendererPort, PublisherPort};
use crate::shared::config::Area;
use crate::usecases::partition::partition;
use crate::usecases::summary::summary;
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Alt text for uploaded map images.
const MAP_ALT_TEXT: &str = "map";

/// Per-run settings, passed in at construction so tests can swap
/// stylings and timezones without process-wide state.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Regions in publish order.
    pub areas: Vec<Area>,
    /// Maximum message length in characters.
    pub max_len: usize,
    /// Timezone for the as-of display in the intro post.
    pub timezone: Tz,
    pub styles: StyleMap,
}

/// Counts from one completed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub published: usize,
    pub skipped: usize,
}

/// A region's contribution, built before anything is published.
struct RegionPost {
    region: String,
    text: String,
    map: Option<PathBuf>,
}

/// Coordinates one run end to end. Regions are processed strictly
/// sequentially; there are no retries at this level.
pub struct ReportService {
    boundaries: Arc<dyn BoundaryPort>,
    renderer: Arc<dyn MapRendererPort>,
    publisher: Arc<dyn PublisherPort>,
    config: ReportConfig,
}

impl ReportService {
    pub fn new(
        boundaries: Arc<dyn BoundaryPort>,
        renderer: Arc<dyn MapRendererPort>,
        publisher: Arc<dyn PublisherPort>,
        config: ReportConfig,
    ) -> Self {
        Self {
            boundaries,
            renderer,
            publisher,
            config,
        }
    }

    /// Run once over a freshly fetched dataset.
    ///
    /// Fails with a data error on an empty dataset (before any publish
    /// call), and with a publish error when the intro post cannot be
    /// published (no thread root to attach replies to). A failure scoped
    /// to one region skips that region and the run continues.
    pub async fn run(&self, records: &[ForecastRecord]) -> Result<RunReport, BotError> {
        // As-of comes from the first record of the unfiltered dataset.
        let as_of = records
            .first()
            .map(|r| r.forecast_at)
            .ok_or_else(|| BotError::Data("empty forecast dataset".into()))?;

        let mut posts = Vec::with_capacity(self.config.areas.len());
        let mut skipped = 0usize;

        for area in &self.config.areas {
            let boundary = match self.boundaries.load(&area.file).await {
                Ok(b) => b,
                Err(e) => {
                    warn!(region = %area.name, error = %e, "boundary load failed; skipping region");
                    skipped += 1;
                    continue;
                }
            };

            let data = partition(&boundary, records);
            let text = match summary(&area.name, &data, self.config.max_len, &self.config.styles)?
            {
                Some(t) => t,
                None => {
                    info!(region = %area.name, "no forecasts; skipping region");
                    skipped += 1;
                    continue;
                }
            };

            let map = match self.renderer.render(&area.name, &data).await {
                Ok(m) => m,
                Err(e) => {
                    warn!(region = %area.name, error = %e, "map render failed; skipping region");
                    skipped += 1;
                    continue;
                }
            };

            posts.push(RegionPost {
                region: area.name.clone(),
                text,
                map,
            });
        }

        // Publish phase. The intro establishes the thread root; without it
        // there is nothing to reply to, so its failure aborts the run.
        let intro = intro_message(as_of, self.config.timezone);
        let root = self.publisher.post_status(&intro, None, None).await?;
        info!(status_id = %root, "published intro");

        let mut published = 0usize;
        for post in &posts {
            let media = match &post.map {
                Some(path) => match self.publisher.upload_media(path, MAP_ALT_TEXT).await {
                    Ok(id) => Some(id),
                    Err(e) => {
                        warn!(region = %post.region, error = %e, "media upload failed; posting without map");
                        None
                    }
                },
                None => None,
            };

            match self
                .publisher
                .post_status(&post.text, Some(&root), media.as_ref())
                .await
            {
                Ok(id) => {
                    info!(region = %post.region, status_id = %id, "published region summary");
                    published += 1;
                }
                Err(e) => {
                    // A missing reply is preferable to a stalled thread.
                    warn!(region = %post.region, error = %e, "region publish failed; continuing");
                    skipped += 1;
                }
            }
        }

        Ok(RunReport { published, skipped })
    }
}

/// Intro post text, with the dataset's as-of instant shown in the
/// configured display timezone.
fn intro_message(as_of: DateTime<FixedOffset>, tz: Tz) -> String {
    let when = as_of.with_timezone(&tz).format("%I:%M%p (%Z)");
    format!(
        "Sydney beach pollution forecasts as of {when}.\n\
         Check https://www.beachwatch.nsw.gov.au for details.\n\
         #sydney #pollution #ocean\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastCategory, Partition};
    use crate::ports::{MediaId, StatusId};
    use chrono::TimeZone;
    use geo::{polygon, MultiPolygon, Point};
    use std::path::Path;
    use std::sync::Mutex;

    fn sydney_record(name: &str, lon: f64, lat: f64) -> ForecastRecord {
        ForecastRecord {
            site_name: name.to_string(),
            location: Point::new(lon, lat),
            category: Some(ForecastCategory::Unlikely),
            forecast_at: FixedOffset::east_opt(10 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 12, 13, 30, 0)
                .unwrap(),
        }
    }

    fn square_at(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ]])
    }

    /// Boundary store keyed by file name; unknown paths fail like a
    /// missing file would.
    struct FakeBoundaries {
        by_file: Vec<(PathBuf, MultiPolygon<f64>)>,
    }

    #[async_trait::async_trait]
    impl BoundaryPort for FakeBoundaries {
        async fn load(&self, path: &Path) -> Result<MultiPolygon<f64>, BotError> {
            self.by_file
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, b)| b.clone())
                .ok_or_else(|| BotError::Data(format!("no such boundary: {}", path.display())))
        }
    }

    #[derive(Default)]
    struct FakeRenderer {
        image: Option<PathBuf>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl MapRendererPort for FakeRenderer {
        async fn render(&self, _region: &str, _data: &Partition) -> Result<Option<PathBuf>, BotError> {
            if self.fail {
                return Err(BotError::Render("renderer exploded".into()));
            }
            Ok(self.image.clone())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct SentPost {
        text: String,
        in_reply_to: Option<StatusId>,
        media: Option<MediaId>,
    }

    /// Records every publish call; optionally fails the nth post attempt.
    #[derive(Default)]
    struct RecordingPublisher {
        posts: Mutex<Vec<SentPost>>,
        uploads: Mutex<Vec<PathBuf>>,
        post_attempts: std::sync::atomic::AtomicUsize,
        fail_post_attempt: Option<usize>,
        fail_uploads: bool,
    }

    #[async_trait::async_trait]
    impl PublisherPort for RecordingPublisher {
        async fn upload_media(&self, file: &Path, _description: &str) -> Result<MediaId, BotError> {
            if self.fail_uploads {
                return Err(BotError::Publish("upload rejected".into()));
            }
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push(file.to_path_buf());
            Ok(format!("media-{}", uploads.len()))
        }

        async fn post_status(
            &self,
            text: &str,
            in_reply_to: Option<&StatusId>,
            media: Option<&MediaId>,
        ) -> Result<StatusId, BotError> {
            let attempt = self
                .post_attempts
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.fail_post_attempt == Some(attempt) {
                return Err(BotError::Publish("server said no".into()));
            }
            let mut posts = self.posts.lock().unwrap();
            posts.push(SentPost {
                text: text.to_string(),
                in_reply_to: in_reply_to.cloned(),
                media: media.cloned(),
            });
            Ok(format!("status-{}", posts.len()))
        }
    }

    fn service(
        boundaries: FakeBoundaries,
        renderer: FakeRenderer,
        publisher: Arc<RecordingPublisher>,
        areas: Vec<Area>,
    ) -> ReportService {
        ReportService::new(
            Arc::new(boundaries),
            Arc::new(renderer),
            publisher,
            ReportConfig {
                areas,
                max_len: 500,
                timezone: chrono_tz::Australia::Sydney,
                styles: StyleMap::default(),
            },
        )
    }

    fn area(name: &str, file: &str) -> Area {
        Area {
            name: name.to_string(),
            file: PathBuf::from(file),
        }
    }

    #[tokio::test]
    async fn empty_dataset_fails_before_any_publish() {
        let publisher = Arc::new(RecordingPublisher::default());
        let svc = service(
            FakeBoundaries { by_file: vec![] },
            FakeRenderer::default(),
            Arc::clone(&publisher),
            vec![area("Eastern Suburbs", "eastern.json")],
        );

        let err = svc.run(&[]).await.unwrap_err();

        assert!(matches!(err, BotError::Data(_)));
        assert!(publisher.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publishes_intro_then_non_empty_regions_as_replies() {
        let publisher = Arc::new(RecordingPublisher::default());
        let svc = service(
            FakeBoundaries {
                by_file: vec![
                    (PathBuf::from("empty.json"), square_at(10.0, 10.0)),
                    (PathBuf::from("eastern.json"), square_at(0.0, 0.0)),
                ],
            },
            FakeRenderer::default(),
            Arc::clone(&publisher),
            vec![
                area("Sydney Harbour", "empty.json"),
                area("Eastern Suburbs", "eastern.json"),
            ],
        );

        let report = svc
            .run(&[sydney_record("Bondi Beach", 0.5, 0.5)])
            .await
            .unwrap();

        assert_eq!(report, RunReport { published: 1, skipped: 1 });
        let posts = publisher.posts.lock().unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts[0]
            .text
            .starts_with("Sydney beach pollution forecasts as of "));
        assert_eq!(posts[0].in_reply_to, None);
        assert_eq!(
            posts[1].text,
            "Pollution forecast for Eastern Suburbs:\n✅ Unlikely: Bondi Beach.\n"
        );
        assert_eq!(posts[1].in_reply_to.as_deref(), Some("status-1"));
    }

    #[tokio::test]
    async fn intro_shows_as_of_in_display_timezone() {
        let publisher = Arc::new(RecordingPublisher::default());
        let svc = service(
            FakeBoundaries {
                by_file: vec![(PathBuf::from("eastern.json"), square_at(0.0, 0.0))],
            },
            FakeRenderer::default(),
            Arc::clone(&publisher),
            vec![area("Eastern Suburbs", "eastern.json")],
        );

        // Winter instant so Sydney is on AEST (+10:00), not daylight time.
        let mut record = sydney_record("Bondi Beach", 0.5, 0.5);
        record.forecast_at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 14, 3, 30, 0)
            .unwrap();

        svc.run(&[record]).await.unwrap();

        let posts = publisher.posts.lock().unwrap();
        assert!(
            posts[0].text.contains("as of 01:30PM (AEST)."),
            "unexpected intro: {}",
            posts[0].text
        );
    }

    #[tokio::test]
    async fn boundary_failure_skips_that_region_only() {
        let publisher = Arc::new(RecordingPublisher::default());
        let svc = service(
            FakeBoundaries {
                by_file: vec![(PathBuf::from("eastern.json"), square_at(0.0, 0.0))],
            },
            FakeRenderer::default(),
            Arc::clone(&publisher),
            vec![
                area("Broken", "missing.json"),
                area("Eastern Suburbs", "eastern.json"),
            ],
        );

        let report = svc
            .run(&[sydney_record("Bondi Beach", 0.5, 0.5)])
            .await
            .unwrap();

        assert_eq!(report, RunReport { published: 1, skipped: 1 });
        assert_eq!(publisher.posts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn render_failure_skips_that_region() {
        let publisher = Arc::new(RecordingPublisher::default());
        let svc = service(
            FakeBoundaries {
                by_file: vec![(PathBuf::from("eastern.json"), square_at(0.0, 0.0))],
            },
            FakeRenderer {
                image: None,
                fail: true,
            },
            Arc::clone(&publisher),
            vec![area("Eastern Suburbs", "eastern.json")],
        );

        let report = svc
            .run(&[sydney_record("Bondi Beach", 0.5, 0.5)])
            .await
            .unwrap();

        assert_eq!(report, RunReport { published: 0, skipped: 1 });
        // Intro still goes out; the thread just has no replies.
        assert_eq!(publisher.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rendered_map_is_uploaded_and_attached() {
        let publisher = Arc::new(RecordingPublisher::default());
        let svc = service(
            FakeBoundaries {
                by_file: vec![(PathBuf::from("eastern.json"), square_at(0.0, 0.0))],
            },
            FakeRenderer {
                image: Some(PathBuf::from("/tmp/map-eastern-suburbs.png")),
                fail: false,
            },
            Arc::clone(&publisher),
            vec![area("Eastern Suburbs", "eastern.json")],
        );

        svc.run(&[sydney_record("Bondi Beach", 0.5, 0.5)])
            .await
            .unwrap();

        assert_eq!(
            publisher.uploads.lock().unwrap().as_slice(),
            &[PathBuf::from("/tmp/map-eastern-suburbs.png")]
        );
        let posts = publisher.posts.lock().unwrap();
        assert_eq!(posts[1].media.as_deref(), Some("media-1"));
    }

    #[tokio::test]
    async fn upload_failure_posts_without_media() {
        let publisher = Arc::new(RecordingPublisher {
            fail_uploads: true,
            ..RecordingPublisher::default()
        });
        let svc = service(
            FakeBoundaries {
                by_file: vec![(PathBuf::from("eastern.json"), square_at(0.0, 0.0))],
            },
            FakeRenderer {
                image: Some(PathBuf::from("/tmp/map.png")),
                fail: false,
            },
            Arc::clone(&publisher),
            vec![area("Eastern Suburbs", "eastern.json")],
        );

        let report = svc
            .run(&[sydney_record("Bondi Beach", 0.5, 0.5)])
            .await
            .unwrap();

        assert_eq!(report.published, 1);
        let posts = publisher.posts.lock().unwrap();
        assert_eq!(posts[1].media, None);
    }

    #[tokio::test]
    async fn intro_publish_failure_aborts_the_run() {
        let publisher = Arc::new(RecordingPublisher {
            fail_post_attempt: Some(0),
            ..RecordingPublisher::default()
        });
        let svc = service(
            FakeBoundaries {
                by_file: vec![(PathBuf::from("eastern.json"), square_at(0.0, 0.0))],
            },
            FakeRenderer::default(),
            Arc::clone(&publisher),
            vec![area("Eastern Suburbs", "eastern.json")],
        );

        let err = svc
            .run(&[sydney_record("Bondi Beach", 0.5, 0.5)])
            .await
            .unwrap_err();

        assert!(matches!(err, BotError::Publish(_)));
        assert!(publisher.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn region_publish_failure_continues_with_next_region() {
        let publisher = Arc::new(RecordingPublisher {
            fail_post_attempt: Some(1),
            ..RecordingPublisher::default()
        });
        let svc = service(
            FakeBoundaries {
                by_file: vec![
                    (PathBuf::from("eastern.json"), square_at(0.0, 0.0)),
                    (PathBuf::from("northern.json"), square_at(5.0, 5.0)),
                ],
            },
            FakeRenderer::default(),
            Arc::clone(&publisher),
            vec![
                area("Eastern Suburbs", "eastern.json"),
                area("Northern Beaches", "northern.json"),
            ],
        );

        let records = vec![
            sydney_record("Bondi Beach", 0.5, 0.5),
            sydney_record("Manly", 5.5, 5.5),
        ];
        let report = svc.run(&records).await.unwrap();

        assert_eq!(report, RunReport { published: 1, skipped: 1 });
        let posts = publisher.posts.lock().unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts[1].text.contains("Northern Beaches"));
    }
}
