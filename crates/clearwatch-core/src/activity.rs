//! Snapshot types delivered by the external player-data poller.
//!
//! Everything here is read-only input to the core. The JSON shape is camelCase
//! to match what the poller emits.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Numeric activity definition hash.
pub type ActivityHash = u32;

/// Numeric activity mode id.
pub type ModeId = u32;

/// The activity the player is currently inside, as reported by the last poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    /// Missing on malformed snapshots; such a snapshot counts as "no activity".
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    pub activity_hash: ActivityHash,
    #[serde(default, alias = "activityModes", alias = "modes")]
    pub category_hints: Vec<ModeId>,
}

impl ActivitySnapshot {
    pub fn new(start_date: DateTime<Utc>, activity_hash: ActivityHash, modes: Vec<ModeId>) -> Self {
        Self {
            start_date: Some(start_date),
            activity_hash,
            category_hints: modes,
        }
    }

    /// Hash 0 is what the poller reports while the player is in orbit.
    pub fn is_present(&self) -> bool {
        self.activity_hash != 0
    }
}

/// One finished (or abandoned) play-through from the activity history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub period: DateTime<Utc>,
    pub instance_id: String,
    pub completed: bool,
    #[serde(alias = "activityDurationSeconds")]
    pub duration_seconds: u64,
    pub activity_hash: ActivityHash,
    #[serde(default, alias = "modes")]
    pub category_hints: Vec<ModeId>,
    /// Upstream display text for the duration ("API time").
    #[serde(default, alias = "activityDuration", skip_serializing_if = "Option::is_none")]
    pub duration_label: Option<String>,
}

impl CompletionRecord {
    /// `period + durationSeconds`: when the play-through presumably ended.
    pub fn presumed_end(&self) -> DateTime<Utc> {
        let secs = i64::try_from(self.duration_seconds).unwrap_or(i64::MAX);
        self.period
            .checked_add_signed(Duration::seconds(secs))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Key used to recognise a completion across repeated polls.
    pub fn completion_key(&self) -> String {
        format!("{}_{}", self.activity_hash, self.period.to_rfc3339())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    pub display_name: String,
    pub display_tag: u32,
}

impl ProfileInfo {
    /// `Name#1234`
    pub fn bungie_name(&self) -> String {
        format!("{}#{}", self.display_name, self.display_tag)
    }
}

/// A single polled read of the player's state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub current_activity: Option<ActivitySnapshot>,
    /// Newest first.
    #[serde(default)]
    pub activity_history: Vec<CompletionRecord>,
    #[serde(default)]
    pub profile_info: ProfileInfo,
}

impl PlayerSnapshot {
    /// The current activity, or `None` when absent or reported as hash 0.
    pub fn current(&self) -> Option<&ActivitySnapshot> {
        self.current_activity.as_ref().filter(|a| a.is_present())
    }
}

/// Status envelope published by the poller alongside each snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDataStatus {
    #[serde(default)]
    pub last_update: Option<PlayerSnapshot>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub history_loading: bool,
}
