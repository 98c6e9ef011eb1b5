//! Run report types for the digest pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Error;

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Inclusive lower bound of the lookback window.
    pub window_start: DateTime<Utc>,
    /// Date label rendered into the digest heading.
    pub date_label: String,
    /// Messages returned by the message source.
    pub fetched: usize,
    /// Ids dropped because they could not be scored (skip policy only).
    pub skipped: Vec<String>,
    /// `(id, score)` of each rendered message, in digest order.
    pub ranked: Vec<(String, i32)>,
}

impl RunReport {
    pub fn rendered(&self) -> usize {
        self.ranked.len()
    }
}

/// Outcome of one scheduled or manual run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Digest rendered and accepted by the mail sender.
    Sent(RunReport),
    /// The run stopped at `stage`; nothing was sent.
    Failed { stage: &'static str, message: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sent(_) => "sent",
            Self::Failed { .. } => "failed",
        }
    }
}

impl From<Error> for RunOutcome {
    fn from(err: Error) -> Self {
        Self::Failed {
            stage: err.stage(),
            message: err.to_string(),
        }
    }
}
