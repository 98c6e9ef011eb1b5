//! Sigma Digest — daily ranked mailbox digest.

pub mod config;
pub mod digest;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod scheduler;
