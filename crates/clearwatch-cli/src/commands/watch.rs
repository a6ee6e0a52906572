use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use clearwatch_core::{ClearMonitor, Preferences, TimerDriver, TimerState};
use serde_json::json;

#[derive(Args)]
pub struct WatchArgs {
    /// Snapshot file rewritten by a poller (poller status or player snapshot)
    file: PathBuf,
    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 1_000)]
    interval_ms: u64,
    /// Stop after this many polls
    #[arg(long)]
    frames: Option<u64>,
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create runtime: {e}"))?;
    rt.block_on(watch(args))
}

async fn watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = Preferences::load_or_default();
    let driver = TimerDriver::new(prefs.timer_config());
    let mut monitor = ClearMonitor::new(prefs);

    // Render ticks arrive far faster than the label changes; print changes only.
    let mut last_label = String::new();
    driver
        .subscribe(Box::new(move |state: &TimerState| {
            if state.elapsed_label != last_label {
                last_label.clone_from(&state.elapsed_label);
                println!("{}", json!({ "timer": state }));
            }
        }))
        .await;

    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    let mut polls = 0u64;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received Ctrl+C, shutting down");
                break;
            }
        }

        match super::read_status(&args.file) {
            Ok(status) => {
                if let (Some(snapshot), None) = (status.last_update.as_ref(), status.error.as_ref()) {
                    for event in driver.apply_snapshot(snapshot).await {
                        println!("{}", json!({ "event": event }));
                    }
                }
                let outcome = monitor.refresh(&status, Utc::now());
                for popup in &outcome.popups {
                    println!("{}", json!({ "popup": popup }));
                }
            }
            Err(e) => tracing::warn!(path = %args.file.display(), "poll failed: {e}"),
        }

        polls += 1;
        if args.frames.is_some_and(|limit| polls >= limit) {
            break;
        }
    }

    driver.shutdown().await;
    Ok(())
}
