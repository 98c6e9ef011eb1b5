//! Microsoft Graph mailbox client: message listing and mail send.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::GraphConfig;
use crate::digest::{Importance, Message, Sender};
use crate::error::{FetchError, SendError};
use crate::graph::{AccessToken, MailSender, MessageSource, truncate_body};

/// Fields requested for every listed message.
pub const MESSAGE_SELECT_FIELDS: &str =
    "id,subject,receivedDateTime,importance,webLink,hasAttachments,from,bodyPreview,conversationId";

/// Page size requested from the listing endpoint.
pub const PAGE_SIZE: usize = 100;

/// Upper bound on pages followed per run.
pub const MAX_PAGES: usize = 10;

const MAX_ERROR_BODY: usize = 300;

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphMessagePage {
    #[serde(default)]
    value: Vec<GraphMessage>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphMessage {
    #[serde(default)]
    id: String,
    subject: Option<String>,
    body_preview: Option<String>,
    received_date_time: Option<String>,
    importance: Option<String>,
    has_attachments: Option<bool>,
    from: Option<GraphRecipient>,
    web_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRecipient {
    email_address: Option<GraphEmailAddress>,
}

#[derive(Debug, Deserialize)]
struct GraphEmailAddress {
    name: Option<String>,
    address: Option<String>,
}

impl From<GraphMessage> for Message {
    fn from(m: GraphMessage) -> Self {
        let sender = m
            .from
            .and_then(|f| f.email_address)
            .map(|a| Sender {
                name: a.name,
                address: a.address,
            })
            .unwrap_or_default();

        Self {
            id: m.id,
            subject: m.subject,
            body_preview: m.body_preview,
            received_at: m.received_date_time,
            importance: m.importance.as_deref().map(Importance::parse),
            has_attachments: m.has_attachments,
            sender,
            web_link: m.web_link,
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// Graph client implementing both [`MessageSource`] and [`MailSender`].
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(client: reqwest::Client, config: &GraphConfig) -> Self {
        Self::with_base_url(client, &config.base_url)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self, user: &str) -> String {
        format!("{}/users/{}/messages", self.base_url, user)
    }

    fn send_mail_url(&self, user: &str) -> String {
        format!("{}/users/{}/sendMail", self.base_url, user)
    }

    async fn fetch_page(
        &self,
        request: reqwest::RequestBuilder,
        token: &AccessToken,
    ) -> Result<GraphMessagePage, FetchError> {
        let response = request
            .bearer_auth(token.expose())
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Graph `$filter` clause for messages received at or after `since`.
pub fn received_since_filter(since: DateTime<Utc>) -> String {
    format!(
        "receivedDateTime ge {}",
        since.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Keep messages inside the window.
///
/// Messages whose timestamp cannot be read are kept so the scoring policy
/// decides what happens to them.
fn within_window(message: &Message, since: DateTime<Utc>) -> bool {
    match message.received_instant() {
        Ok(received) => received >= since,
        Err(_) => true,
    }
}

#[async_trait]
impl MessageSource for GraphClient {
    async fn list_messages(
        &self,
        token: &AccessToken,
        user: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Message>, FetchError> {
        let top = PAGE_SIZE.to_string();
        let filter = received_since_filter(since);
        let first = self.client.get(self.messages_url(user)).query(&[
            ("$select", MESSAGE_SELECT_FIELDS),
            ("$filter", filter.as_str()),
            ("$orderby", "receivedDateTime desc"),
            ("$top", top.as_str()),
        ]);

        let mut page = self.fetch_page(first, token).await?;
        let mut messages = Vec::new();
        let mut pages = 1;

        loop {
            messages.extend(
                page.value
                    .into_iter()
                    .map(Message::from)
                    .filter(|m| within_window(m, since)),
            );

            let Some(next) = page.next_link else {
                break;
            };
            if pages >= MAX_PAGES {
                warn!(pages, "Page limit reached, ignoring remaining messages");
                break;
            }

            debug!(page = pages + 1, "Following nextLink");
            page = self.fetch_page(self.client.get(next), token).await?;
            pages += 1;
        }

        info!(count = messages.len(), pages, "Listed messages");
        Ok(messages)
    }
}

#[async_trait]
impl MailSender for GraphClient {
    async fn send_mail(
        &self,
        token: &AccessToken,
        user: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), SendError> {
        let payload = serde_json::json!({
            "message": {
                "subject": subject,
                "body": { "contentType": "HTML", "content": html_body },
                "toRecipients": [{ "emailAddress": { "address": user } }],
            },
            "saveToSentItems": true,
        });

        let response = self
            .client
            .post(self.send_mail_url(user))
            .bearer_auth(token.expose())
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::ACCEPTED {
            info!(user = %user, "Digest mail accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SendError::Status {
            status: status.as_u16(),
            body: truncate_body(&body, MAX_ERROR_BODY),
        })
    }
}
