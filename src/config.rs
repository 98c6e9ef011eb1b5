//! Configuration types, built from environment variables.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use secrecy::SecretString;

use crate::digest::ScoringPolicy;
use crate::error::ConfigError;
use crate::scheduler::DigestSchedule;

pub const DEFAULT_TIMEZONE: &str = "America/Chicago";
pub const DEFAULT_MAX_ITEMS: usize = 8;
pub const DEFAULT_LOOKBACK_HOURS: u32 = 24;
/// One year.
pub const MAX_LOOKBACK_HOURS: u32 = 8760;
pub const DEFAULT_SUBJECT: &str = "Your Daily Digest";
/// Every day at 07:00 in the configured timezone.
pub const DEFAULT_SCHEDULE: &str = "0 0 7 * * *";

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Digest pipeline configuration.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Mailbox the digest is built from and sent to.
    pub target_user: String,
    /// Zone used for the date label and the schedule.
    pub timezone: Tz,
    /// Maximum number of messages in a digest.
    pub max_items: usize,
    /// Length of the lookback window.
    pub lookback_hours: u32,
    /// Subject line of the digest mail.
    pub subject: String,
    pub scoring_policy: ScoringPolicy,
    pub schedule: DigestSchedule,
}

impl DigestConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target_user = required(&lookup, "TARGET_USER")?;

        let tz_name = optional(&lookup, "TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.into());
        let timezone: Tz = tz_name.parse().map_err(|e| ConfigError::InvalidValue {
            key: "TIMEZONE".into(),
            message: format!("{e}"),
        })?;

        let max_items = parsed(&lookup, "MAX_ITEMS", DEFAULT_MAX_ITEMS)?;
        let lookback_hours = parsed(&lookup, "LOOKBACK_HOURS", DEFAULT_LOOKBACK_HOURS)?;
        if !(1..=MAX_LOOKBACK_HOURS).contains(&lookback_hours) {
            return Err(ConfigError::InvalidValue {
                key: "LOOKBACK_HOURS".into(),
                message: format!("{lookback_hours} is outside 1..={MAX_LOOKBACK_HOURS}"),
            });
        }
        let subject = optional(&lookup, "DIGEST_SUBJECT").unwrap_or_else(|| DEFAULT_SUBJECT.into());
        let scoring_policy = parsed(&lookup, "DIGEST_SCORING_POLICY", ScoringPolicy::Abort)?;

        let schedule_expr =
            optional(&lookup, "DIGEST_SCHEDULE").unwrap_or_else(|| DEFAULT_SCHEDULE.into());
        let schedule =
            DigestSchedule::parse(&schedule_expr, timezone).map_err(|e| ConfigError::InvalidValue {
                key: "DIGEST_SCHEDULE".into(),
                message: e,
            })?;

        Ok(Self {
            target_user,
            timezone,
            max_items,
            lookback_hours,
            subject,
            scoring_policy,
            schedule,
        })
    }
}

/// Mailbox API and identity provider configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub base_url: String,
    pub authority_host: String,
    /// Applied to every outbound request.
    pub http_timeout: Duration,
}

impl GraphConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tenant_id = required(&lookup, "TENANT_ID")?;
        let client_id = required(&lookup, "CLIENT_ID")?;
        let client_secret = SecretString::from(required(&lookup, "CLIENT_SECRET")?);

        let base_url = optional(&lookup, "GRAPH_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();
        let authority_host = optional(&lookup, "GRAPH_AUTHORITY_HOST")
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.into())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = parsed(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HTTP_TIMEOUT_SECS".into(),
                message: "must be greater than zero".into(),
            });
        }

        Ok(Self {
            tenant_id,
            client_id,
            client_secret,
            base_url,
            authority_host,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Non-blank value for `key`, trimmed.
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match optional(lookup, key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}': {e}"),
        }),
        None => Ok(default),
    }
}
