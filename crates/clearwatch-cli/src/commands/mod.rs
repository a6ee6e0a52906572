pub mod completions;
pub mod config;
pub mod groups;
pub mod replay;
pub mod stats;
pub mod watch;

use std::path::Path;

use clearwatch_core::error::Result;
use clearwatch_core::{CompletionRecord, CoreError, PlayerDataStatus, PlayerSnapshot};

pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CoreError::Custom(format!("cannot read {}: {e}", path.display())))?;
    Ok(serde_json::from_str(&content)?)
}

fn is_status(value: &serde_json::Value) -> bool {
    ["lastUpdate", "error", "historyLoading"]
        .iter()
        .any(|key| value.get(key).is_some())
}

/// Reads a poller status; a bare player snapshot is wrapped as a healthy one.
pub(crate) fn read_status(path: &Path) -> Result<PlayerDataStatus> {
    let value = read_json(path)?;
    if is_status(&value) {
        return Ok(serde_json::from_value(value)?);
    }
    let snapshot: PlayerSnapshot = serde_json::from_value(value)?;
    Ok(PlayerDataStatus {
        last_update: Some(snapshot),
        ..PlayerDataStatus::default()
    })
}

/// Reads a history from JSON: a bare record array, a player snapshot, or a
/// full poller status.
pub(crate) fn read_history(path: &Path) -> Result<Vec<CompletionRecord>> {
    let value = read_json(path)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    if is_status(&value) {
        let status: PlayerDataStatus = serde_json::from_value(value)?;
        return Ok(status
            .last_update
            .map(|snapshot| snapshot.activity_history)
            .unwrap_or_default());
    }
    let snapshot: PlayerSnapshot = serde_json::from_value(value)?;
    Ok(snapshot.activity_history)
}
