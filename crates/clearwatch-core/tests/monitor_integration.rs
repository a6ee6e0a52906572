//! Refresh behaviour of the clear monitor across a polling session.

use chrono::{DateTime, Duration, TimeZone, Utc};
use clearwatch_core::{
    ClearMonitor, CompletionRecord, MonitorStatus, PlayerDataStatus, PlayerSnapshot, Preferences,
    ProfileInfo,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 6, 21, 0, 0).unwrap()
}

fn clear(id: &str, minutes_ago: i64, hash: u32, modes: &[u32]) -> CompletionRecord {
    CompletionRecord {
        period: now() - Duration::minutes(minutes_ago),
        instance_id: id.to_string(),
        completed: true,
        duration_seconds: 1_200,
        activity_hash: hash,
        category_hints: modes.to_vec(),
        duration_label: Some("20m 0s".into()),
    }
}

fn ready(history: Vec<CompletionRecord>) -> PlayerDataStatus {
    PlayerDataStatus {
        last_update: Some(PlayerSnapshot {
            current_activity: None,
            activity_history: history,
            profile_info: ProfileInfo {
                display_name: "Guardian".into(),
                display_tag: 1234,
            },
        }),
        error: None,
        history_loading: false,
    }
}

fn failed(message: &str) -> PlayerDataStatus {
    PlayerDataStatus {
        error: Some(message.into()),
        ..PlayerDataStatus::default()
    }
}

#[test]
fn first_snapshot_shows_welcome_only() {
    let mut monitor = ClearMonitor::default();
    let outcome = monitor.refresh(&ready(vec![clear("a", 30, 2122313384, &[4])]), now());
    assert_eq!(outcome.status, MonitorStatus::Ready);
    assert_eq!(outcome.popups.len(), 1);
    assert_eq!(outcome.popups[0].title, "Guardian#1234");
    assert_eq!(outcome.popups[0].subtext, "clearwatch is active.");
    assert_eq!(outcome.summary.unwrap().count, 1);
}

#[test]
fn new_clear_is_announced_once() {
    let mut monitor = ClearMonitor::default();
    monitor.refresh(&ready(vec![clear("a", 30, 2122313384, &[4])]), now());

    let history = vec![clear("b", 1, 2122313384, &[4]), clear("a", 30, 2122313384, &[4])];
    let outcome = monitor.refresh(&ready(history.clone()), now());
    assert_eq!(outcome.popups.len(), 1);
    assert_eq!(outcome.popups[0].title, "Last Wish");
    assert_eq!(outcome.popups[0].subtext, "API Time: 20m 0s");
    assert_eq!(outcome.latest.unwrap().instance_id, "b");

    assert!(monitor.refresh(&ready(history), now()).popups.is_empty());
}

#[test]
fn no_announcement_while_history_loads_or_when_disabled() {
    let mut monitor = ClearMonitor::default();
    monitor.refresh(&ready(vec![]), now());

    let mut loading = ready(vec![clear("b", 1, 1, &[18])]);
    loading.history_loading = true;
    assert!(monitor.refresh(&loading, now()).popups.is_empty());

    let mut prefs = Preferences::default();
    prefs.display.display_clear_notifications = false;
    monitor.apply_preferences(prefs);
    let history = vec![clear("c", 0, 1, &[18]), clear("b", 1, 1, &[18])];
    assert!(monitor.refresh(&ready(history), now()).popups.is_empty());
}

#[test]
fn identical_errors_are_announced_once() {
    let mut monitor = ClearMonitor::default();
    let first = monitor.refresh(&failed("Bungie API is down"), now());
    assert!(matches!(first.status, MonitorStatus::Error { .. }));
    assert_eq!(first.popups.len(), 1);
    assert!(monitor.refresh(&failed("Bungie API is down"), now()).popups.is_empty());

    // Recovery re-announces the banner.
    let recovered = monitor.refresh(&ready(vec![]), now());
    assert_eq!(recovered.popups[0].title, "Guardian#1234");
    assert!(monitor.is_initialized());
}

#[test]
fn missing_snapshot_is_loading() {
    let mut monitor = ClearMonitor::default();
    let outcome = monitor.refresh(&PlayerDataStatus::default(), now());
    assert_eq!(outcome.status, MonitorStatus::Loading);
    assert!(outcome.summary.is_none());
    assert!(!monitor.is_initialized());
}

#[test]
fn switching_filter_does_not_announce_old_clears() {
    let mut monitor = ClearMonitor::default();
    let history = vec![clear("strike", 2, 1, &[18]), clear("raid", 40, 2122313384, &[4])];
    monitor.refresh(&ready(history.clone()), now());

    let mut prefs = Preferences::default();
    prefs.filter.activity_type = "raids".into();
    assert!(monitor.apply_preferences(prefs.clone()));
    let outcome = monitor.refresh(&ready(history), now());
    assert!(outcome.popups.is_empty());
    assert_eq!(outcome.latest.unwrap().instance_id, "raid");

    assert!(!monitor.apply_preferences(prefs));
}

#[test]
fn real_time_toggle_changes_counts_immediately() {
    // 16:30 today: before the 17:00 reset, inside the last 24 hours.
    let early = CompletionRecord {
        period: Utc.with_ymd_and_hms(2024, 3, 6, 16, 30, 0).unwrap(),
        ..clear("early", 0, 1, &[4])
    };
    let mut monitor = ClearMonitor::default();
    let before = monitor.refresh(&ready(vec![early.clone()]), now());
    assert_eq!(before.summary.unwrap().count, 0);

    let mut prefs = Preferences::default();
    prefs.filter.use_real_time = true;
    monitor.apply_preferences(prefs);
    let after = monitor.refresh(&ready(vec![early]), now());
    assert_eq!(after.summary.unwrap().count, 1);
}
