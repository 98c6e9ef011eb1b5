//! Importance scorer — fixed additive heuristic, no I/O.
//!
//! Each message earns points from five independent signals:
//! - Importance flag: high `+3`, low `-1`
//! - Keyword in subject or preview: `+2`
//! - Attachments: `+1`
//! - Priority sender hint in the address: `+2`
//! - Recency: `+2` within 6h, `+1` within 24h
//!
//! The scoring instant is an argument, so the same message and instant
//! always produce the same score.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::digest::types::{Importance, Message};
use crate::error::ScoringError;

/// Subject/preview keywords, matched as lowercase substrings.
pub const KEYWORDS: &[&str] = &[
    "urgent",
    "invoice",
    "payment",
    "due",
    "meeting",
    "slides",
    "assignment",
    "grade",
    "interview",
    "offer",
];

/// Sender address fragments that mark a priority sender.
pub const PRIORITY_SENDER_HINTS: &[&str] = &[
    "washu.edu",
    "registrar",
    "billing",
    "advisor",
    "prof",
    "dean",
    "financial",
];

const HIGH_IMPORTANCE_POINTS: i32 = 3;
const LOW_IMPORTANCE_POINTS: i32 = -1;
const KEYWORD_POINTS: i32 = 2;
const ATTACHMENT_POINTS: i32 = 1;
const PRIORITY_SENDER_POINTS: i32 = 2;

const FRESH_HOURS: i64 = 6;
const FRESH_POINTS: i32 = 2;
const RECENT_HOURS: i64 = 24;
const RECENT_POINTS: i32 = 1;

/// Per-signal contributions to a message's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub importance: i32,
    pub keyword: i32,
    pub attachment: i32,
    pub priority_sender: i32,
    pub recency: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.importance + self.keyword + self.attachment + self.priority_sender + self.recency
    }
}

/// Score a message as of `scored_at`.
pub fn score(message: &Message, scored_at: DateTime<Utc>) -> Result<i32, ScoringError> {
    score_breakdown(message, scored_at).map(|b| b.total())
}

/// Compute each signal's contribution separately.
///
/// Fails only when `received_at` is missing or unparsable; every other
/// absent field contributes zero.
pub fn score_breakdown(
    message: &Message,
    scored_at: DateTime<Utc>,
) -> Result<ScoreBreakdown, ScoringError> {
    let received = message.received_instant()?;

    let breakdown = ScoreBreakdown {
        importance: importance_points(message.importance()),
        keyword: keyword_points(message.subject_text(), message.preview_text()),
        attachment: if message.has_attachments() {
            ATTACHMENT_POINTS
        } else {
            0
        },
        priority_sender: priority_sender_points(message.sender_address()),
        recency: recency_points(received, scored_at),
    };

    debug!(
        id = %message.id,
        importance = breakdown.importance,
        keyword = breakdown.keyword,
        attachment = breakdown.attachment,
        priority_sender = breakdown.priority_sender,
        recency = breakdown.recency,
        total = breakdown.total(),
        "Scored message"
    );

    Ok(breakdown)
}

fn importance_points(importance: Importance) -> i32 {
    match importance {
        Importance::High => HIGH_IMPORTANCE_POINTS,
        Importance::Low => LOW_IMPORTANCE_POINTS,
        Importance::Normal => 0,
    }
}

fn keyword_points(subject: &str, preview: &str) -> i32 {
    let subject = subject.to_lowercase();
    let preview = preview.to_lowercase();
    if KEYWORDS
        .iter()
        .any(|k| subject.contains(k) || preview.contains(k))
    {
        KEYWORD_POINTS
    } else {
        0
    }
}

fn priority_sender_points(address: &str) -> i32 {
    let address = address.to_lowercase();
    if PRIORITY_SENDER_HINTS.iter().any(|h| address.contains(h)) {
        PRIORITY_SENDER_POINTS
    } else {
        0
    }
}

/// Age is compared at full precision. Messages dated in the future count
/// as fresh.
fn recency_points(received: DateTime<Utc>, scored_at: DateTime<Utc>) -> i32 {
    let age = scored_at - received;
    if age <= Duration::hours(FRESH_HOURS) {
        FRESH_POINTS
    } else if age <= Duration::hours(RECENT_HOURS) {
        RECENT_POINTS
    } else {
        0
    }
}
