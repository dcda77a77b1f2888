//! Scheduler: trigger a full run at fixed local times of day.
//!
//! Thin timer wrapper; the run itself is the caller-supplied job. Runs
//! never overlap: the loop sleeps, executes the job to completion, then
//! computes the next occurrence.

use crate::domain::BotError;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

/// Fixed daily run times in a named timezone, parsed from the
/// "HH:MM,HH:MM" form the deployment environment uses.
#[derive(Debug)]
pub struct Scheduler {
    times: Vec<NaiveTime>,
    tz: Tz,
}

impl Scheduler {
    /// Parse a comma-separated "HH:MM" list. Empty entries are ignored;
    /// a malformed entry is a config error.
    pub fn parse(runtimes: &str, tz: Tz) -> Result<Self, BotError> {
        let mut times = Vec::new();
        for part in runtimes.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let t = NaiveTime::parse_from_str(part, "%H:%M")
                .map_err(|e| BotError::Config(format!("bad runtime entry '{part}': {e}")))?;
            times.push(t);
        }
        Ok(Self { times, tz })
    }

    /// No run times configured.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Earliest configured occurrence strictly after `now`, today or
    /// tomorrow. Local times skipped by a DST gap are dropped for that
    /// day. `None` when no times are configured.
    pub fn next_run(&self, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
        let mut best: Option<DateTime<Tz>> = None;
        for day_offset in 0..2 {
            let date = (now + Duration::days(day_offset)).date_naive();
            for &time in &self.times {
                let Some(candidate) = self
                    .tz
                    .from_local_datetime(&date.and_time(time))
                    .earliest()
                else {
                    continue;
                };
                if candidate > now && best.is_none_or(|b| candidate < b) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    /// Run the schedule loop. Sleeps until each occurrence, executes the
    /// job, logs a failed run, and keeps going; one bad run must not
    /// kill the daemon. Returns only when no times are configured.
    pub async fn run_loop<F, Fut>(&self, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<(), BotError>>,
    {
        for time in &self.times {
            info!(at = %time.format("%H:%M"), tz = %self.tz, "scheduled daily run");
        }

        loop {
            let now = Utc::now().with_timezone(&self.tz);
            let Some(next) = self.next_run(now) else {
                warn!("no run times configured; scheduler exiting");
                return;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            info!(next = %next.format("%Y-%m-%d %H:%M %Z"), "sleeping until next run");
            tokio::time::sleep(wait).await;

            info!("running scheduled beachbot");
            if let Err(e) = job().await {
                warn!(error = %e, "scheduled run failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Australia::Sydney;

    fn sydney(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        Sydney.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn parses_comma_separated_times() {
        let s = Scheduler::parse("07:30,16:00", Sydney).unwrap();
        assert!(!s.is_empty());
        assert_eq!(s.times.len(), 2);
    }

    #[test]
    fn empty_string_parses_to_no_times() {
        let s = Scheduler::parse("", Sydney).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.next_run(sydney(2024, 6, 14, 12, 0)), None);
    }

    #[test]
    fn malformed_entry_is_a_config_error() {
        let err = Scheduler::parse("07:30,teatime", Sydney).unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[test]
    fn picks_the_next_time_today() {
        let s = Scheduler::parse("07:30,16:00", Sydney).unwrap();
        let next = s.next_run(sydney(2024, 6, 14, 12, 0)).unwrap();
        assert_eq!(next, sydney(2024, 6, 14, 16, 0));
    }

    #[test]
    fn rolls_over_to_tomorrow_after_the_last_time() {
        let s = Scheduler::parse("07:30,16:00", Sydney).unwrap();
        let next = s.next_run(sydney(2024, 6, 14, 18, 0)).unwrap();
        assert_eq!(next, sydney(2024, 6, 15, 7, 30));
    }

    #[test]
    fn an_exact_hit_schedules_the_following_occurrence() {
        let s = Scheduler::parse("16:00", Sydney).unwrap();
        let next = s.next_run(sydney(2024, 6, 14, 16, 0)).unwrap();
        assert_eq!(next, sydney(2024, 6, 15, 16, 0));
    }
}
