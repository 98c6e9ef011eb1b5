//! OAuth2 client-credentials token acquisition.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::config::GraphConfig;
use crate::error::AuthError;
use crate::graph::{AccessToken, TokenProvider, truncate_body};

/// Application permission scope; needs admin-consented Mail.Read and Mail.Send.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Token provider for the client-credentials grant against a tenant.
pub struct ClientCredentialsProvider {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
}

impl ClientCredentialsProvider {
    pub fn new(client: reqwest::Client, config: &GraphConfig) -> Self {
        Self {
            client,
            token_url: token_url(&config.authority_host, &config.tenant_id),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

/// `{authority}/{tenant}/oauth2/v2.0/token`
pub fn token_url(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id
    )
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("scope", GRAPH_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body, MAX_ERROR_BODY),
            });
        }

        let payload: OAuthTokenResponse =
            serde_json::from_str(&body).map_err(|_| AuthError::MissingToken)?;
        let token = payload
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        debug!(expires_in = ?payload.expires_in, "Acquired access token");
        Ok(AccessToken::new(token))
    }
}
