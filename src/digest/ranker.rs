//! Ranker — score, stable-sort by score descending, truncate to cap.

use std::cmp::Reverse;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::digest::scorer;
use crate::digest::types::{Message, ScoredMessage};
use crate::error::ScoringError;

/// What to do when a single message cannot be scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringPolicy {
    /// Fail the whole run on the first unscorable message.
    #[default]
    Abort,
    /// Drop the message, log it, and keep going.
    Skip,
}

impl ScoringPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Skip => "skip",
        }
    }
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("expected 'abort' or 'skip', got '{other}'")),
        }
    }
}

/// Output of [`rank_messages`].
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Top messages, highest score first.
    pub items: Vec<ScoredMessage>,
    /// Ids of messages dropped under [`ScoringPolicy::Skip`].
    pub skipped: Vec<String>,
}

/// Stable-sort by score descending and keep the first `cap` entries.
///
/// Equal scores keep their input order. `cap == 0` yields an empty list.
pub fn rank(mut scored: Vec<ScoredMessage>, cap: usize) -> Vec<ScoredMessage> {
    // sort_by_key is stable
    scored.sort_by_key(|s| Reverse(s.score));
    scored.truncate(cap);
    scored
}

/// Score every message as of `scored_at`, then [`rank`] them.
pub fn rank_messages(
    messages: Vec<Message>,
    cap: usize,
    scored_at: DateTime<Utc>,
    policy: ScoringPolicy,
) -> Result<Ranking, ScoringError> {
    let mut scored = Vec::with_capacity(messages.len());
    let mut skipped = Vec::new();

    for message in messages {
        match scorer::score(&message, scored_at) {
            Ok(score) => scored.push(ScoredMessage { message, score }),
            Err(e) => match policy {
                ScoringPolicy::Abort => return Err(e),
                ScoringPolicy::Skip => {
                    warn!(id = %message.id, error = %e, "Skipping unscorable message");
                    skipped.push(message.id);
                }
            },
        }
    }

    Ok(Ranking {
        items: rank(scored, cap),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::digest::types::Importance;

    fn scored(id: &str, score: i32) -> ScoredMessage {
        ScoredMessage {
            message: Message {
                id: id.into(),
                ..Default::default()
            },
            score,
        }
    }

    fn ids(items: &[ScoredMessage]) -> Vec<&str> {
        items.iter().map(|s| s.message.id.as_str()).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 15, 12, 0, 0).unwrap()
    }

    fn message(id: &str, importance: Importance, hours_ago: i64) -> Message {
        Message {
            id: id.into(),
            importance: Some(importance),
            received_at: Some((now() - Duration::hours(hours_ago)).to_rfc3339()),
            ..Default::default()
        }
    }

    #[test]
    fn sorts_descending() {
        let out = rank(vec![scored("a", 1), scored("b", 7), scored("c", 3)], 10);
        assert_eq!(ids(&out), vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let out = rank(vec![scored("B", 5), scored("A", 5)], 2);
        assert_eq!(ids(&out), vec!["B", "A"]);

        let out = rank(
            vec![
                scored("x", 2),
                scored("y", 9),
                scored("z", 2),
                scored("w", 9),
            ],
            4,
        );
        assert_eq!(ids(&out), vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn cap_zero_is_empty() {
        assert!(rank(vec![scored("a", 1), scored("b", 2)], 0).is_empty());
    }

    #[test]
    fn length_is_min_of_cap_and_input() {
        let input = || vec![scored("a", 1), scored("b", 2), scored("c", 3)];
        assert_eq!(rank(input(), 2).len(), 2);
        assert_eq!(rank(input(), 3).len(), 3);
        assert_eq!(rank(input(), 8).len(), 3);
        assert!(rank(Vec::new(), 8).is_empty());
    }

    #[test]
    fn negative_scores_sort_last() {
        let out = rank(vec![scored("low", -1), scored("zero", 0)], 2);
        assert_eq!(ids(&out), vec!["zero", "low"]);
    }

    #[test]
    fn rank_messages_scores_then_ranks() {
        let msgs = vec![
            message("old-normal", Importance::Normal, 30),
            message("fresh-high", Importance::High, 1),
            message("fresh-low", Importance::Low, 1),
        ];
        let ranking = rank_messages(msgs, 2, now(), ScoringPolicy::Abort).unwrap();
        assert_eq!(ids(&ranking.items), vec!["fresh-high", "fresh-low"]);
        assert_eq!(ranking.items[0].score, 5);
        assert_eq!(ranking.items[1].score, 1);
        assert!(ranking.skipped.is_empty());
    }

    #[test]
    fn abort_policy_fails_on_bad_message() {
        let mut bad = message("bad", Importance::High, 1);
        bad.received_at = None;
        let msgs = vec![message("ok", Importance::Normal, 1), bad];
        let err = rank_messages(msgs, 8, now(), ScoringPolicy::Abort).unwrap_err();
        assert!(matches!(err, ScoringError::MissingReceivedAt { id } if id == "bad"));
    }

    #[test]
    fn skip_policy_drops_bad_message() {
        let mut bad = message("bad", Importance::High, 1);
        bad.received_at = Some("not a date".into());
        let msgs = vec![message("ok", Importance::Normal, 1), bad];
        let ranking = rank_messages(msgs, 8, now(), ScoringPolicy::Skip).unwrap();
        assert_eq!(ids(&ranking.items), vec!["ok"]);
        assert_eq!(ranking.skipped, vec!["bad".to_string()]);
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("abort".parse::<ScoringPolicy>().unwrap(), ScoringPolicy::Abort);
        assert_eq!(" SKIP ".parse::<ScoringPolicy>().unwrap(), ScoringPolicy::Skip);
        assert!("retry".parse::<ScoringPolicy>().is_err());
    }
}
