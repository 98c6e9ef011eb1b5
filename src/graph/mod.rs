//! Mailbox collaborators: token provider, message source, mail sender.
//!
//! The pipeline only sees the traits; `auth` and `client` implement them
//! against Microsoft Graph.

pub mod auth;
pub mod client;

pub use auth::ClientCredentialsProvider;
pub use client::GraphClient;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::digest::Message;
use crate::error::{AuthError, ConfigError, FetchError, SendError};

/// Bearer token for the mailbox API. Never printed.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Acquires an access token for the mailbox API.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, AuthError>;
}

/// Lists a user's messages received at or after an instant.
///
/// Ordering of the result is unspecified.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn list_messages(
        &self,
        token: &AccessToken,
        user: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Message>, FetchError>;
}

/// Sends an HTML mail to a user's own mailbox. Never retries.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_mail(
        &self,
        token: &AccessToken,
        user: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), SendError>;
}

/// Shared HTTP client for all outbound calls, bounded by `timeout`.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("sigma-digest/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Cap an error body so failure reports stay one line-ish.
pub(crate) fn truncate_body(body: &str, max: usize) -> String {
    let body = body.trim();
    match body.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}
