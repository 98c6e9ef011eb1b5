//! Message records flowing through the digest pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

// ── Importance ──────────────────────────────────────────────────────

/// Sender-assigned importance flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    #[default]
    Normal,
    Low,
}

impl Importance {
    /// Parse a mailbox importance value. Unknown values fall back to `Normal`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Normal,
        }
    }
}

// ── Message ─────────────────────────────────────────────────────────

/// Sender of a message. Both parts are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// A mailbox message as handed to the core by the message source.
///
/// `received_at` is kept as the raw timestamp string: a missing or
/// unparsable value is a per-message scoring error, not a fetch error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub subject: Option<String>,
    pub body_preview: Option<String>,
    pub received_at: Option<String>,
    pub importance: Option<Importance>,
    pub has_attachments: Option<bool>,
    pub sender: Sender,
    pub web_link: Option<String>,
}

impl Message {
    /// Parse `received_at` into an absolute instant.
    pub fn received_instant(&self) -> Result<DateTime<Utc>, ScoringError> {
        let raw = self
            .received_at
            .as_deref()
            .ok_or_else(|| ScoringError::MissingReceivedAt {
                id: self.id.clone(),
            })?;

        DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ScoringError::InvalidReceivedAt {
                id: self.id.clone(),
                value: raw.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn importance(&self) -> Importance {
        self.importance.unwrap_or_default()
    }

    pub fn has_attachments(&self) -> bool {
        self.has_attachments.unwrap_or(false)
    }

    pub fn subject_text(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }

    pub fn preview_text(&self) -> &str {
        self.body_preview.as_deref().unwrap_or("")
    }

    pub fn sender_address(&self) -> &str {
        self.sender.address.as_deref().unwrap_or("")
    }
}

/// A message paired with its computed score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredMessage {
    pub message: Message,
    pub score: i32,
}

// ── Digest item ─────────────────────────────────────────────────────

/// The four fields the renderer shows for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestItem {
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub preview: Option<String>,
    pub link: Option<String>,
}

impl From<&Message> for DigestItem {
    fn from(msg: &Message) -> Self {
        Self {
            sender: msg.sender.name.clone(),
            subject: msg.subject.clone(),
            preview: msg.body_preview.clone(),
            link: msg.web_link.clone(),
        }
    }
}

impl From<&ScoredMessage> for DigestItem {
    fn from(scored: &ScoredMessage) -> Self {
        Self::from(&scored.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn importance_parse_is_case_insensitive() {
        assert_eq!(Importance::parse("HIGH"), Importance::High);
        assert_eq!(Importance::parse("Low"), Importance::Low);
        assert_eq!(Importance::parse("normal"), Importance::Normal);
        assert_eq!(Importance::parse("weird"), Importance::Normal);
    }

    #[test]
    fn absent_optionals_use_neutral_defaults() {
        let msg = Message {
            id: "m1".into(),
            ..Default::default()
        };
        assert_eq!(msg.importance(), Importance::Normal);
        assert!(!msg.has_attachments());
        assert_eq!(msg.subject_text(), "");
        assert_eq!(msg.preview_text(), "");
        assert_eq!(msg.sender_address(), "");
    }

    #[test]
    fn received_instant_parses_zulu_and_offsets() {
        let mut msg = Message {
            id: "m1".into(),
            received_at: Some("2026-02-15T10:00:00Z".into()),
            ..Default::default()
        };
        let zulu = msg.received_instant().unwrap();

        msg.received_at = Some("2026-02-15T04:00:00-06:00".into());
        assert_eq!(msg.received_instant().unwrap(), zulu);
    }

    #[test]
    fn received_instant_missing_is_error() {
        let msg = Message {
            id: "m1".into(),
            ..Default::default()
        };
        assert!(matches!(
            msg.received_instant(),
            Err(ScoringError::MissingReceivedAt { id }) if id == "m1"
        ));
    }

    #[test]
    fn received_instant_garbage_is_error() {
        let msg = Message {
            id: "m2".into(),
            received_at: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(matches!(
            msg.received_instant(),
            Err(ScoringError::InvalidReceivedAt { value, .. }) if value == "yesterday"
        ));
    }

    #[test]
    fn digest_item_from_message() {
        let msg = Message {
            id: "m1".into(),
            subject: Some("Hi".into()),
            body_preview: Some("preview".into()),
            sender: Sender {
                name: Some("Alice".into()),
                address: Some("alice@example.com".into()),
            },
            web_link: Some("https://outlook.example/m1".into()),
            ..Default::default()
        };
        let item = DigestItem::from(&msg);
        assert_eq!(item.sender.as_deref(), Some("Alice"));
        assert_eq!(item.subject.as_deref(), Some("Hi"));
        assert_eq!(item.preview.as_deref(), Some("preview"));
        assert_eq!(item.link.as_deref(), Some("https://outlook.example/m1"));
    }
}
