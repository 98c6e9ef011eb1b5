//! Digest pipeline — one run from window to sent mail.
//!
//! Flow:
//! 1. Window start + date label from the local "now"
//! 2. Access token
//! 3. Fetch messages in the window
//! 4. Score + rank (scoring policy decides bad messages)
//! 5. Render HTML
//! 6. Send to the same mailbox
//!
//! Any failure stops the run; nothing is retried and nothing is kept.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::config::DigestConfig;
use crate::digest::{DigestItem, rank_messages, render, window};
use crate::error::Result;
use crate::graph::{MailSender, MessageSource, TokenProvider};
use crate::pipeline::types::{RunOutcome, RunReport};

/// Stateless digest pipeline over its three collaborators.
pub struct DigestPipeline {
    config: DigestConfig,
    tokens: Arc<dyn TokenProvider>,
    source: Arc<dyn MessageSource>,
    sender: Arc<dyn MailSender>,
}

impl DigestPipeline {
    pub fn new(
        config: DigestConfig,
        tokens: Arc<dyn TokenProvider>,
        source: Arc<dyn MessageSource>,
        sender: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            config,
            tokens,
            source,
            sender,
        }
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Run once as of the current clock. Never returns an error: failures
    /// are logged once and reported as [`RunOutcome::Failed`].
    pub async fn run_once(&self) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let span = info_span!("digest_run", run_id = %run_id, user = %self.config.target_user);

        async {
            match self.run_at(Utc::now()).await {
                Ok(report) => RunOutcome::Sent(report),
                Err(e) => {
                    error!(stage = e.stage(), error = %e, "Digest run failed");
                    RunOutcome::from(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run the full pipeline as of `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let config = &self.config;
        let now_local = now.with_timezone(&config.timezone);
        let window_start = window::window_start(&now_local, config.lookback_hours);
        let date_label = window::date_label(&now_local);

        info!(
            window_start = %window_start,
            lookback_hours = config.lookback_hours,
            "Digest run started"
        );

        let token = self.tokens.access_token().await?;

        let messages = self
            .source
            .list_messages(&token, &config.target_user, window_start)
            .await?;
        let fetched = messages.len();

        let ranking = rank_messages(messages, config.max_items, now, config.scoring_policy)?;

        let items: Vec<DigestItem> = ranking.items.iter().map(DigestItem::from).collect();
        let html = render::render(&items, &date_label, config.lookback_hours);

        self.sender
            .send_mail(&token, &config.target_user, &config.subject, &html)
            .await?;

        let report = RunReport {
            window_start,
            date_label,
            fetched,
            skipped: ranking.skipped,
            ranked: ranking
                .items
                .iter()
                .map(|s| (s.message.id.clone(), s.score))
                .collect(),
        };

        info!(
            fetched = report.fetched,
            skipped = report.skipped.len(),
            items = report.rendered(),
            "Digest sent"
        );
        Ok(report)
    }
}
