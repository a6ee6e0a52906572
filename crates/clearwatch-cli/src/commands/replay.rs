use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use clearwatch_core::{
    ActivityTimer, ClearMonitor, PlayerDataStatus, Preferences, RefreshOutcome, TimerEvent,
    TimerMode, TimerState,
};
use serde::{Deserialize, Serialize};

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON array of `{ "at": <RFC 3339>, "status": <poller status> }` frames
    file: PathBuf,
    /// Timer mode override (defaults to preferences)
    #[arg(long, value_parser = parse_mode)]
    mode: Option<TimerMode>,
}

fn parse_mode(s: &str) -> Result<TimerMode, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "default" => Ok(TimerMode::Default),
        "persistent" => Ok(TimerMode::Persistent),
        other => Err(format!("unknown timer mode: {other}")),
    }
}

#[derive(Deserialize)]
struct Frame {
    at: DateTime<Utc>,
    #[serde(default)]
    status: PlayerDataStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameReport<'a> {
    at: DateTime<Utc>,
    events: Vec<TimerEvent>,
    timer: &'a TimerState,
    monitor: RefreshOutcome,
}

pub fn run(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let frames: Vec<Frame> = serde_json::from_value(super::read_json(&args.file)?)?;

    let prefs = Preferences::load_or_default();
    let mut config = prefs.timer_config();
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let mut timer = ActivityTimer::new(config);
    let mut monitor = ClearMonitor::new(prefs);

    for frame in frames {
        let mut events = Vec::new();

        // Frames are sparse; fire a release that came due between them.
        if let Some(grace) = timer.pending_grace_release() {
            if grace.due <= frame.at {
                events.extend(timer.release_grace(grace.generation, frame.at));
            }
        }

        if let Some(snapshot) = frame.status.last_update.as_ref() {
            if frame.status.error.is_none() {
                events.extend(timer.apply_snapshot(snapshot, frame.at));
            }
        }
        timer.tick(frame.at);

        let report = FrameReport {
            at: frame.at,
            events,
            timer: timer.state(),
            monitor: monitor.refresh(&frame.status, frame.at),
        };
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes_case_insensitively() {
        assert_eq!(parse_mode("Persistent"), Ok(TimerMode::Persistent));
        assert_eq!(parse_mode("default"), Ok(TimerMode::Default));
        assert!(parse_mode("sticky").is_err());
    }
}
