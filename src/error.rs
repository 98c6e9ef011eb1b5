//! Error types for the digest service.

/// Top-level error type for a digest run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),
}

impl Error {
    /// Short label for the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Auth(_) => "auth",
            Self::Fetch(_) => "fetch",
            Self::Scoring(_) => "scoring",
            Self::Send(_) => "send",
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Access token acquisition errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Identity provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Token response did not contain an access token")]
    MissingToken,

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Message listing errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Message source returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to decode message page: {0}")]
    Decode(String),
}

/// Per-message scoring errors.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Message {id} has no received timestamp")]
    MissingReceivedAt { id: String },

    #[error("Message {id} has unparsable received timestamp '{value}': {reason}")]
    InvalidReceivedAt {
        id: String,
        value: String,
        reason: String,
    },
}

/// Mail send errors.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Mail send returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result type alias for the digest service.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels() {
        let cases: Vec<(Error, &str)> = vec![
            (ConfigError::MissingEnvVar("TARGET_USER".into()).into(), "config"),
            (AuthError::MissingToken.into(), "auth"),
            (FetchError::Http("timeout".into()).into(), "fetch"),
            (
                ScoringError::MissingReceivedAt { id: "m1".into() }.into(),
                "scoring",
            ),
            (
                SendError::Status {
                    status: 500,
                    body: "boom".into(),
                }
                .into(),
                "send",
            ),
        ];
        for (err, stage) in cases {
            assert_eq!(err.stage(), stage);
        }
    }

    #[test]
    fn display_includes_context() {
        let err: Error = ScoringError::InvalidReceivedAt {
            id: "m7".into(),
            value: "nope".into(),
            reason: "input contains invalid characters".into(),
        }
        .into();
        let text = err.to_string();
        assert!(text.starts_with("Scoring error:"));
        assert!(text.contains("m7"));
        assert!(text.contains("'nope'"));
    }
}
