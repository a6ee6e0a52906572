//! Completion history: selectors, reset-aligned windows, filtering, aggregates.

mod filter;
mod selector;
mod summary;
pub mod window;

pub use filter::{filter_history, matches_category, HistoryFilter, FILTER_CACHE_TTL_MS};
pub use selector::{Category, FilterSelector, Timespan};
pub use summary::{average_duration, count_completions, ClearSummary};
