use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityHash;
use crate::timer::TimerMode;

/// Every timer transition produces an event.
/// The CLI prints them; the driver logs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    TrackingStarted {
        activity_hash: ActivityHash,
        started_at: DateTime<Utc>,
        /// Set when the start bypassed gating (manual restart).
        forced: bool,
        at: DateTime<Utc>,
    },
    ActivityCompleted {
        activity_hash: ActivityHash,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    TimerCleared {
        at: DateTime<Utc>,
    },
    /// The post-completion window closed; new runs may start again.
    GraceReleased {
        activity_hash: Option<ActivityHash>,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    CadenceChanged {
        period_ms: u64,
        at: DateTime<Utc>,
    },
}

impl TimerEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            TimerEvent::TrackingStarted { at, .. }
            | TimerEvent::ActivityCompleted { at, .. }
            | TimerEvent::TimerCleared { at }
            | TimerEvent::GraceReleased { at, .. }
            | TimerEvent::ModeChanged { at, .. }
            | TimerEvent::CadenceChanged { at, .. } => *at,
        }
    }
}
