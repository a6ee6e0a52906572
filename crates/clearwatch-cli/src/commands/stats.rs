use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use clearwatch_core::history::filter_history;
use clearwatch_core::{Category, ClearSummary, CompletionRecord, FilterSelector, Preferences, Timespan};
use serde::Serialize;

#[derive(Args)]
pub struct StatsArgs {
    /// History JSON: record array, player snapshot, or poller status
    file: PathBuf,
    /// Window: 1, 7 or 30 (defaults to preferences)
    #[arg(long)]
    timespan: Option<Timespan>,
    /// Category selector such as "raids" or "grouped-raid-last-wish" (defaults to preferences)
    #[arg(long)]
    category: Option<Category>,
    /// Use a rolling window instead of reset-aligned boundaries
    #[arg(long)]
    real_time: bool,
    /// Evaluate as of this RFC 3339 instant instead of now
    #[arg(long)]
    now: Option<DateTime<Utc>>,
    /// Include the matching records in the output
    #[arg(long)]
    records: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    selector: FilterSelector,
    use_real_time: bool,
    now: DateTime<Utc>,
    summary: ClearSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<CompletionRecord>>,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let history = super::read_history(&args.file)?;
    let prefs = Preferences::load_or_default();
    let defaults = prefs.selector();

    let selector = FilterSelector::new(
        args.timespan.unwrap_or(defaults.timespan),
        args.category.unwrap_or(defaults.category),
    );
    let use_real_time = args.real_time || prefs.filter.use_real_time;
    let now = args.now.unwrap_or_else(Utc::now);

    let matching = filter_history(&history, &selector, use_real_time, now);
    tracing::debug!(
        total = history.len(),
        matching = matching.len(),
        "filtered history"
    );

    let report = StatsReport {
        summary: ClearSummary::from_records(&matching, selector.timespan),
        selector,
        use_real_time,
        now,
        records: args.records.then_some(matching),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
