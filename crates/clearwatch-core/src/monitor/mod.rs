//! The consuming shell: turns each poller status into a clear summary and
//! popup requests.

mod popup;

pub use popup::{Popup, PopupGate, ERROR_TITLE};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::activity::{CompletionRecord, PlayerDataStatus};
use crate::history::{ClearSummary, FilterSelector, HistoryFilter};
use crate::storage::Preferences;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MonitorStatus {
    /// The poller reported a failure.
    Error { message: String },
    /// No snapshot yet.
    Loading,
    Ready,
}

/// Everything one refresh produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub status: MonitorStatus,
    pub summary: Option<ClearSummary>,
    /// Most recent record in the current filter.
    pub latest: Option<CompletionRecord>,
    pub popups: Vec<Popup>,
}

impl RefreshOutcome {
    fn without_data(status: MonitorStatus, popups: Vec<Popup>) -> Self {
        Self {
            status,
            summary: None,
            latest: None,
            popups,
        }
    }
}

#[derive(Debug)]
pub struct ClearMonitor {
    preferences: Preferences,
    selector: FilterSelector,
    filter: HistoryFilter,
    gate: PopupGate,
    initialized: bool,
    /// Set after a filter change: the next refresh only records the latest
    /// instance so switching views does not announce an old clear.
    rebaseline: bool,
    last_instance_id: Option<String>,
}

impl Default for ClearMonitor {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

impl ClearMonitor {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            selector: preferences.selector(),
            preferences,
            filter: HistoryFilter::new(),
            gate: PopupGate::new(),
            initialized: false,
            rebaseline: false,
            last_instance_id: None,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn selector(&self) -> &FilterSelector {
        &self.selector
    }

    /// A snapshot has been processed since the last error or loading state.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns `true` when the filter changed and cached results were dropped.
    pub fn apply_preferences(&mut self, preferences: Preferences) -> bool {
        let selector = preferences.selector();
        let changed = selector != self.selector
            || preferences.filter.use_real_time != self.preferences.filter.use_real_time;
        if changed {
            debug!(?selector, "filter changed; dropping cached history view");
            self.filter.invalidate();
            self.rebaseline = true;
        }
        self.selector = selector;
        self.preferences = preferences;
        changed
    }

    pub fn refresh(&mut self, status: &PlayerDataStatus, now: DateTime<Utc>) -> RefreshOutcome {
        let mut popups = Vec::new();

        if let Some(message) = status.error.as_deref() {
            self.initialized = false;
            popups.extend(self.gate.admit(Popup::error(message)));
            let status = MonitorStatus::Error {
                message: message.to_string(),
            };
            return RefreshOutcome::without_data(status, popups);
        }

        let Some(snapshot) = status.last_update.as_ref() else {
            self.initialized = false;
            return RefreshOutcome::without_data(MonitorStatus::Loading, popups);
        };

        let records = self.filter.filter(
            &snapshot.activity_history,
            &self.selector,
            self.preferences.filter.use_real_time,
            now,
        );
        let summary = ClearSummary::from_records(records, self.selector.timespan);
        let latest = records.first().cloned();

        let announce = self.initialized
            && !self.rebaseline
            && self.preferences.display.display_clear_notifications
            && !status.history_loading;
        if announce {
            let fresh = latest.as_ref().filter(|r| {
                r.completed && self.last_instance_id.as_deref() != Some(r.instance_id.as_str())
            });
            if let Some(popup) = fresh.and_then(Popup::completion) {
                info!(title = %popup.title, "new clear");
                popups.extend(self.gate.admit(popup));
            }
        }

        self.last_instance_id = latest.as_ref().map(|r| r.instance_id.clone());
        self.rebaseline = false;

        if !self.initialized {
            popups.extend(self.gate.admit(Popup::welcome(&snapshot.profile_info)));
            self.initialized = true;
        }

        RefreshOutcome {
            status: MonitorStatus::Ready,
            summary: Some(summary),
            latest,
            popups,
        }
    }
}
