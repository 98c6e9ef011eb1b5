//! Daily trigger for the digest pipeline.
//!
//! A cron expression is evaluated in the configured timezone, so `0 0 7 * * *`
//! means 07:00 local on both sides of a DST change. Runs are awaited one
//! after another and never overlap.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::pipeline::DigestPipeline;

/// Parsed cron schedule bound to a timezone.
#[derive(Debug, Clone)]
pub struct DigestSchedule {
    expression: String,
    schedule: cron::Schedule,
    timezone: Tz,
}

impl DigestSchedule {
    /// Parse a 6-field cron expression (`sec min hour day month weekday`).
    pub fn parse(expression: &str, timezone: Tz) -> Result<Self, String> {
        let expression = expression.trim();
        let schedule =
            cron::Schedule::from_str(expression).map_err(|e| format!("invalid cron: {e}"))?;
        Ok(Self {
            expression: expression.to_string(),
            schedule,
            timezone,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// First fire instant strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&self.timezone))
            .next()
            .map(|fire| fire.with_timezone(&Utc))
    }
}

/// Spawn the scheduler loop: sleep until the next fire time, run, repeat.
///
/// Returns a `JoinHandle` and a shutdown flag. The flag is checked after
/// each wake-up; abort the handle to stop a sleeping loop immediately.
pub fn spawn_digest_scheduler(
    pipeline: Arc<DigestPipeline>,
    schedule: DigestSchedule,
) -> (JoinHandle<()>, Arc<AtomicBool>) {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        info!(
            schedule = %schedule.expression(),
            timezone = %schedule.timezone(),
            "Digest scheduler started"
        );

        loop {
            let now = Utc::now();
            let Some(next) = schedule.next_after(now) else {
                warn!("Schedule has no upcoming fire time, stopping");
                return;
            };
            info!(next = %next, "Next digest run scheduled");

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            if shutdown.load(Ordering::Relaxed) {
                info!("Digest scheduler shutting down");
                return;
            }

            let outcome = pipeline.run_once().await;
            info!(outcome = outcome.label(), "Digest run finished");
        }
    });

    (handle, shutdown_flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Chicago;

    #[test]
    fn next_after_same_day() {
        let schedule = DigestSchedule::parse("0 0 7 * * *", Chicago).unwrap();
        // 06:00 CST
        let after = Utc.with_ymd_and_hms(2026, 2, 15, 12, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(after),
            Some(Utc.with_ymd_and_hms(2026, 2, 15, 13, 0, 0).unwrap())
        );
    }

    #[test]
    fn next_after_rolls_to_tomorrow() {
        let schedule = DigestSchedule::parse("0 0 7 * * *", Chicago).unwrap();
        // 08:00 CST
        let after = Utc.with_ymd_and_hms(2026, 2, 15, 14, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(after),
            Some(Utc.with_ymd_and_hms(2026, 2, 16, 13, 0, 0).unwrap())
        );
    }

    #[test]
    fn next_after_follows_local_time_across_dst() {
        let schedule = DigestSchedule::parse("0 0 7 * * *", Chicago).unwrap();
        // Saturday 08:00 CST; Sunday 07:00 is already CDT (UTC-5).
        let after = Utc.with_ymd_and_hms(2024, 3, 9, 14, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(after),
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(DigestSchedule::parse("not a cron", Chicago).is_err());
    }

    #[test]
    fn parse_keeps_expression() {
        let schedule = DigestSchedule::parse("  0 30 6 * * Mon-Fri ", Chicago).unwrap();
        assert_eq!(schedule.expression(), "0 30 6 * * Mon-Fri");
        assert_eq!(schedule.timezone(), Chicago);
    }
}
