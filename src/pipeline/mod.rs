//! Digest run orchestration.
//!
//! A run is strictly sequential:
//! 1. `TokenProvider::access_token()`
//! 2. `MessageSource::list_messages()` for the lookback window
//! 3. `digest::rank_messages()` — score, sort, cap
//! 4. `digest::render()`
//! 5. `MailSender::send_mail()`
//!
//! No state survives a run.

pub mod processor;
pub mod types;

pub use processor::DigestPipeline;
pub use types::{RunOutcome, RunReport};
