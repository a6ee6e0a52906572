//! # Clearwatch Core Library
//!
//! Core logic for tracking a player's in-progress activity and their recent
//! clears. Network polling lives outside this crate: it hands in
//! [`PlayerDataStatus`] snapshots, and everything here turns them into a live
//! timer display, a windowed clear count, and popup requests. The CLI is a
//! thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer**: [`ActivityTimer`] is a caller-driven state machine that takes
//!   `now` explicitly; [`TimerDriver`] runs its render tick and grace release
//!   on tokio
//! - **History**: [`HistoryFilter`] windows and categorizes the completion
//!   history with reset-aligned or rolling windows
//! - **Monitor**: [`ClearMonitor`] combines the filter with popup rules
//! - **Storage**: TOML-based [`Preferences`]
//!
//! ## Key Components
//!
//! - [`ActivityTimer`]: activity timer state machine
//! - [`HistoryFilter`]: memoizing history filter
//! - [`ClearMonitor`]: refresh loop for the overlay
//! - [`Preferences`]: user preference management

pub mod activity;
pub mod catalog;
pub mod error;
pub mod events;
pub mod format;
pub mod history;
pub mod monitor;
pub mod storage;
pub mod timer;

pub use activity::{ActivitySnapshot, CompletionRecord, PlayerDataStatus, PlayerSnapshot, ProfileInfo};
pub use catalog::ActivityType;
pub use error::{ConfigError, CoreError, SelectorError};
pub use events::TimerEvent;
pub use history::{Category, ClearSummary, FilterSelector, HistoryFilter, Timespan};
pub use monitor::{ClearMonitor, MonitorStatus, Popup, RefreshOutcome};
pub use storage::Preferences;
pub use timer::{ActivityTimer, TimerConfig, TimerDriver, TimerMode, TimerState};
