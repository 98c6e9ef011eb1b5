//! Ranking-and-digest core.
//!
//! Every run flows through:
//! 1. `window::window_start()` — lookback boundary for the fetch
//! 2. `scorer::score()` — fixed heuristic per message
//! 3. `ranker::rank_messages()` — stable sort by score, cap
//! 4. `render::render()` — deterministic HTML fragment
//!
//! Nothing in here performs I/O or reads the clock.

pub mod ranker;
pub mod render;
pub mod scorer;
pub mod types;
pub mod window;

pub use ranker::{Ranking, ScoringPolicy, rank, rank_messages};
pub use render::render;
pub use scorer::{ScoreBreakdown, score, score_breakdown};
pub use types::{DigestItem, Importance, Message, ScoredMessage, Sender};
pub use window::{date_label, window_start};
