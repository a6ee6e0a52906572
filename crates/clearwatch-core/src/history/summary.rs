//! Aggregates over a filtered history.

use serde::{Deserialize, Serialize};

use super::selector::Timespan;
use crate::activity::CompletionRecord;
use crate::format::format_duration_with_unit;

/// Records that reached completion.
pub fn count_completions(records: &[CompletionRecord]) -> usize {
    records.iter().filter(|r| r.completed).count()
}

/// Mean duration of completed records in seconds; `0.0` when there are none.
pub fn average_duration(records: &[CompletionRecord]) -> f64 {
    let (count, total) = records
        .iter()
        .filter(|r| r.completed)
        .fold((0u64, 0u64), |(count, total), r| {
            (count + 1, total.saturating_add(r.duration_seconds))
        });
    if count == 0 {
        return 0.0;
    }
    total as f64 / count as f64
}

/// What the overlay shows next to the clear counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearSummary {
    pub count: usize,
    pub average_seconds: f64,
    pub average_label: String,
    pub timespan_label: String,
}

impl ClearSummary {
    pub fn from_records(records: &[CompletionRecord], timespan: Timespan) -> Self {
        let average_seconds = average_duration(records);
        Self {
            count: count_completions(records),
            average_seconds,
            average_label: format_duration_with_unit(average_seconds),
            timespan_label: timespan.label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(completed: bool, duration_seconds: u64) -> CompletionRecord {
        CompletionRecord {
            period: Utc::now(),
            instance_id: format!("{completed}-{duration_seconds}"),
            completed,
            duration_seconds,
            activity_hash: 1,
            category_hints: vec![4],
            duration_label: None,
        }
    }

    #[test]
    fn averages_only_completed_records() {
        let records = vec![record(true, 100), record(false, 10_000), record(true, 300)];
        assert_eq!(count_completions(&records), 2);
        assert_eq!(average_duration(&records), 200.0);
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average_duration(&[]), 0.0);
        assert_eq!(average_duration(&[record(false, 50), record(false, 70)]), 0.0);
    }

    #[test]
    fn summary_formats_average() {
        let summary = ClearSummary::from_records(&[record(true, 184)], Timespan::SevenDay);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.average_label, "3m 4s");
        assert_eq!(summary.timespan_label, "this week");
    }
}
