use serde::{Deserialize, Serialize};

use crate::activity::{CompletionRecord, ProfileInfo};
use crate::catalog::{self, ActivityType};
use crate::format::format_duration_with_unit;

pub const ERROR_TITLE: &str = "Error";

/// A transient notification request for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub title: String,
    pub subtext: String,
}

impl Popup {
    pub fn new(title: impl Into<String>, subtext: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtext: subtext.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ERROR_TITLE, message)
    }

    /// Banner for the first successful snapshot.
    pub fn welcome(profile: &ProfileInfo) -> Self {
        Self::new(profile.bungie_name(), "clearwatch is active.")
    }

    /// Announcement for a finished run; `None` for activities without a type.
    pub fn completion(record: &CompletionRecord) -> Option<Self> {
        let kind = ActivityType::from_modes(&record.category_hints)?;
        let known = match kind {
            ActivityType::Raid | ActivityType::Dungeon => {
                catalog::resolve_activity_name(record.activity_hash)
            }
            _ => None,
        };
        let title = known.unwrap_or_else(|| kind.notification_title());
        let duration = record
            .duration_label
            .clone()
            .unwrap_or_else(|| format_duration_with_unit(record.duration_seconds as f64));
        Some(Self::new(title, format!("API Time: {duration}")))
    }

    pub fn is_error(&self) -> bool {
        self.title == ERROR_TITLE
    }
}

/// Drops an error popup identical to the error popup right before it.
#[derive(Debug, Clone, Default)]
pub struct PopupGate {
    last_error: Option<String>,
}

impl PopupGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, popup: Popup) -> Option<Popup> {
        if popup.is_error() {
            if self.last_error.as_deref() == Some(popup.subtext.as_str()) {
                return None;
            }
            self.last_error = Some(popup.subtext.clone());
        } else {
            self.last_error = None;
        }
        Some(popup)
    }

    pub fn reset(&mut self) {
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(hash: u32, modes: &[u32], label: Option<&str>) -> CompletionRecord {
        CompletionRecord {
            period: Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap(),
            instance_id: "1".into(),
            completed: true,
            duration_seconds: 1_865,
            activity_hash: hash,
            category_hints: modes.to_vec(),
            duration_label: label.map(str::to_string),
        }
    }

    #[test]
    fn repeated_errors_are_suppressed_until_something_else_shows() {
        let mut gate = PopupGate::new();
        assert!(gate.admit(Popup::error("offline")).is_some());
        assert!(gate.admit(Popup::error("offline")).is_none());
        assert!(gate.admit(Popup::error("rate limited")).is_some());
        assert!(gate.admit(Popup::new("Raid", "API Time: 1m")).is_some());
        assert!(gate.admit(Popup::error("rate limited")).is_some());
    }

    #[test]
    fn completion_prefers_known_names() {
        let popup = Popup::completion(&record(2122313384, &[4], Some("31m 5s"))).unwrap();
        assert_eq!(popup.title, "Last Wish");
        assert_eq!(popup.subtext, "API Time: 31m 5s");
    }

    #[test]
    fn completion_falls_back_to_type_title() {
        let strike = Popup::completion(&record(1, &[18], None)).unwrap();
        assert_eq!(strike.title, "Strike / Portal");
        assert_eq!(strike.subtext, "API Time: 31m 5s");

        let raid = Popup::completion(&record(1, &[4], None)).unwrap();
        assert_eq!(raid.title, "Raid");
    }

    #[test]
    fn untyped_completion_has_no_popup() {
        assert!(Popup::completion(&record(1, &[5], None)).is_none());
    }

    #[test]
    fn welcome_uses_bungie_name() {
        let profile = ProfileInfo {
            display_name: "Guardian".into(),
            display_tag: 42,
        };
        assert_eq!(Popup::welcome(&profile).title, "Guardian#42");
    }
}
