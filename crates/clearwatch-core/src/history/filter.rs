//! Windowed, categorized view over the completion history.
//!
//! [`filter_history`] is the pure computation. [`HistoryFilter`] wraps it with
//! a short-lived memo so the render path can ask repeatedly without re-walking
//! the history; a cached answer is only served when it is identical to what a
//! fresh computation would return.

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

use super::selector::{Category, FilterSelector};
use super::window::window_start;
use crate::activity::CompletionRecord;
use crate::catalog::{self, ActivityType};

/// How long a memoized result may be reused.
pub const FILTER_CACHE_TTL_MS: i64 = 5_000;

/// Does `record` belong to `category`? Unknown hashes and modes never match
/// anything but [`Category::All`].
pub fn matches_category(record: &CompletionRecord, category: &Category) -> bool {
    match category {
        Category::All => true,
        Category::GroupedRaid(key) => catalog::grouped_raids().matches(key, record.activity_hash),
        Category::GroupedDungeon(key) => {
            catalog::grouped_dungeons().matches(key, record.activity_hash)
        }
        Category::SpecificActivity(hash) => record.activity_hash == *hash,
        named => match (named.activity_type(), ActivityType::from_modes(&record.category_hints)) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => false,
        },
    }
}

fn filter_from(
    history: &[CompletionRecord],
    category: &Category,
    start: DateTime<Utc>,
) -> Vec<CompletionRecord> {
    history
        .iter()
        .filter(|r| !catalog::is_excluded(r.activity_hash))
        .filter(|r| r.period >= start)
        .filter(|r| matches_category(r, category))
        .cloned()
        .collect()
}

/// Records of `history` inside the selected window and category, newest first.
pub fn filter_history(
    history: &[CompletionRecord],
    selector: &FilterSelector,
    use_real_time: bool,
    now: DateTime<Utc>,
) -> Vec<CompletionRecord> {
    let start = window_start(selector.timespan, use_real_time, now);
    filter_from(history, &selector.category, start)
}

/// Identity of one filter request. History only grows at the head, so its
/// length plus both ends identify it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    selector: FilterSelector,
    use_real_time: bool,
    len: usize,
    head: Option<String>,
    tail: Option<String>,
}

impl CacheKey {
    fn new(history: &[CompletionRecord], selector: &FilterSelector, use_real_time: bool) -> Self {
        Self {
            selector: selector.clone(),
            use_real_time,
            len: history.len(),
            head: history.first().map(|r| r.instance_id.clone()),
            tail: history.last().map(|r| r.instance_id.clone()),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    key: CacheKey,
    computed_at: DateTime<Utc>,
    window_start: DateTime<Utc>,
    oldest_kept: Option<DateTime<Utc>>,
    records: Vec<CompletionRecord>,
}

impl CacheEntry {
    /// The window only moves forward, so excluded records stay excluded; the
    /// result is unchanged as long as no kept record fell out of it.
    fn serves(&self, key: &CacheKey, start: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.key == *key
            && now >= self.computed_at
            && now - self.computed_at < ttl
            && start >= self.window_start
            && self.oldest_kept.map_or(true, |oldest| oldest >= start)
    }
}

/// Memoizing history filter. Each instance owns its cache.
#[derive(Debug, Clone)]
pub struct HistoryFilter {
    ttl: Duration,
    cache: Option<CacheEntry>,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::with_ttl(Duration::milliseconds(FILTER_CACHE_TTL_MS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, cache: None }
    }

    /// Filtered view of `history`; see [`filter_history`].
    pub fn filter(
        &mut self,
        history: &[CompletionRecord],
        selector: &FilterSelector,
        use_real_time: bool,
        now: DateTime<Utc>,
    ) -> &[CompletionRecord] {
        let key = CacheKey::new(history, selector, use_real_time);
        let start = window_start(selector.timespan, use_real_time, now);

        let hit = self
            .cache
            .as_ref()
            .is_some_and(|entry| entry.serves(&key, start, now, self.ttl));

        if hit {
            trace!(selector = ?selector, "history filter cache hit");
        } else {
            let records = filter_from(history, &selector.category, start);
            let oldest_kept = records.iter().map(|r| r.period).min();
            self.cache = Some(CacheEntry {
                key,
                computed_at: now,
                window_start: start,
                oldest_kept,
                records,
            });
        }

        self.cache
            .as_ref()
            .map(|entry| entry.records.as_slice())
            .unwrap_or(&[])
    }

    /// Drop the memoized result, e.g. after a preference change.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::selector::Timespan;
    use chrono::TimeZone;

    fn record(id: &str, period: DateTime<Utc>, hash: u32, modes: &[u32]) -> CompletionRecord {
        CompletionRecord {
            period,
            instance_id: id.to_string(),
            completed: true,
            duration_seconds: 600,
            activity_hash: hash,
            category_hints: modes.to_vec(),
            duration_label: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 20, 0, 0).unwrap()
    }

    #[test]
    fn named_type_uses_first_known_mode() {
        let raid = record("a", now(), 1, &[7, 4]);
        let dungeon = record("b", now(), 2, &[82, 4]);
        assert!(matches_category(&raid, &Category::Raids));
        assert!(!matches_category(&dungeon, &Category::Raids));
        assert!(matches_category(&dungeon, &Category::Dungeons));
    }

    #[test]
    fn unknown_modes_only_match_all() {
        let odd = record("a", now(), 99, &[1234]);
        assert!(matches_category(&odd, &Category::All));
        assert!(!matches_category(&odd, &Category::Strikes));
        assert!(!matches_category(&odd, &Category::GroupedRaid("last-wish".into())));
    }

    #[test]
    fn excluded_activities_are_dropped_even_for_all() {
        let history = vec![
            record("range", now(), 3830679567, &[]),
            record("lw", now(), 2122313384, &[4]),
        ];
        let result = filter_history(&history, &FilterSelector::default(), false, now());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].instance_id, "lw");
    }

    #[test]
    fn preserves_newest_first_order() {
        let history = vec![
            record("3", now() - Duration::minutes(1), 1, &[4]),
            record("2", now() - Duration::minutes(30), 1, &[18]),
            record("1", now() - Duration::minutes(60), 1, &[4]),
        ];
        let selector = FilterSelector::new(Timespan::OneDay, Category::Raids);
        let ids: Vec<_> = filter_history(&history, &selector, false, now())
            .into_iter()
            .map(|r| r.instance_id)
            .collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn cache_is_reused_within_ttl() {
        let history = vec![record("1", now() - Duration::minutes(5), 1, &[4])];
        let selector = FilterSelector::default();
        let mut filter = HistoryFilter::new();
        assert_eq!(filter.filter(&history, &selector, false, now()).len(), 1);
        assert!(filter.is_cached());
        let again = filter.filter(&history, &selector, false, now() + Duration::seconds(2));
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn selector_change_bypasses_cache() {
        let history = vec![record("1", now() - Duration::minutes(5), 1, &[4])];
        let mut filter = HistoryFilter::new();
        assert_eq!(filter.filter(&history, &FilterSelector::default(), false, now()).len(), 1);
        let strikes = FilterSelector::new(Timespan::OneDay, Category::Strikes);
        assert!(filter.filter(&history, &strikes, false, now()).is_empty());
    }

    #[test]
    fn real_time_toggle_bypasses_cache() {
        // 16:00 on the 10th: inside the rolling day, before the calendar reset.
        let history = vec![record("1", Utc.with_ymd_and_hms(2024, 1, 10, 16, 0, 0).unwrap(), 1, &[4])];
        let selector = FilterSelector::default();
        let mut filter = HistoryFilter::new();
        assert!(filter.filter(&history, &selector, false, now()).is_empty());
        assert_eq!(filter.filter(&history, &selector, true, now()).len(), 1);
    }

    #[test]
    fn cached_result_never_keeps_a_record_that_left_the_window() {
        let edge = now() - Duration::days(1) + Duration::seconds(1);
        let history = vec![record("1", edge, 1, &[4])];
        let selector = FilterSelector::default();
        let mut filter = HistoryFilter::new();
        assert_eq!(filter.filter(&history, &selector, true, now()).len(), 1);
        // Two seconds later the record is outside the rolling day.
        assert!(filter
            .filter(&history, &selector, true, now() + Duration::seconds(2))
            .is_empty());
    }

    #[test]
    fn new_head_record_bypasses_cache() {
        let mut history = vec![record("1", now() - Duration::minutes(5), 1, &[4])];
        let selector = FilterSelector::default();
        let mut filter = HistoryFilter::new();
        assert_eq!(filter.filter(&history, &selector, false, now()).len(), 1);
        history.insert(0, record("2", now() - Duration::minutes(1), 1, &[4]));
        assert_eq!(filter.filter(&history, &selector, false, now()).len(), 2);
    }

    #[test]
    fn invalidate_clears_memo() {
        let mut filter = HistoryFilter::new();
        filter.filter(&[], &FilterSelector::default(), false, now());
        assert!(filter.is_cached());
        filter.invalidate();
        assert!(!filter.is_cached());
    }
}
