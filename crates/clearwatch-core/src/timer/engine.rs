//! Activity timer state machine.
//!
//! The engine never reads the clock or spawns anything: every operation takes
//! `now` and the caller owns scheduling. Two scheduling needs are exposed as
//! data instead:
//!
//! - [`ActivityTimer::tick_source`]: the render tick that should be running,
//!   if any. Each new source gets a fresh generation, so ticks from a source
//!   that was cancelled are ignored by [`ActivityTimer::tick_for`].
//! - [`ActivityTimer::pending_grace_release`]: the one-shot release of the
//!   post-completion window. [`ActivityTimer::release_grace`] only acts on the
//!   generation it was scheduled for, so a late or repeated release is inert.
//!
//! ## Modes
//!
//! ```text
//! Default:     idle -> counting -> idle            (any empty poll stops)
//! Persistent:  idle -> counting -> held -> idle    (only a completion stops,
//!                                                   held lasts 3s)
//! ```
//!
//! [`crate::timer::TimerDriver`] runs both schedules on tokio.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, trace};

use super::ledger::CompletionLedger;
use super::observer::{Observer, Observers, SubscriptionId};
use super::state::{
    TimerConfig, TimerMode, TimerState, CLEARED_LABEL, COMPLETION_GRACE_SECS,
    GAP_GRACE_BUFFER_SECS,
};
use crate::activity::{ActivityHash, ActivitySnapshot, CompletionRecord, PlayerSnapshot};
use crate::catalog;
use crate::events::TimerEvent;
use crate::format::{format_elapsed, format_millis};

/// A render tick the owner should be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSource {
    pub generation: u64,
    pub period: StdDuration,
}

/// A scheduled end of the post-completion window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraceRelease {
    pub generation: u64,
    pub due: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ActivityTimer {
    config: TimerConfig,
    state: TimerState,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    tracked: Option<ActivitySnapshot>,
    last_completed: Option<ActivityHash>,
    seen: CompletionLedger,
    observers: Observers,
    ticker: Option<TickSource>,
    grace: Option<GraceRelease>,
    generation: u64,
}

impl Default for ActivityTimer {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

impl ActivityTimer {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            state: TimerState::idle(config.mode),
            config,
            start: None,
            stop: None,
            tracked: None,
            last_completed: None,
            seen: CompletionLedger::new(),
            observers: Observers::new(),
            ticker: None,
            grace: None,
            generation: 0,
        }
    }

    /// Keep at most `capacity` completion keys instead of all of them.
    pub fn with_ledger_capacity(mut self, capacity: usize) -> Self {
        self.seen = CompletionLedger::with_capacity_limit(capacity);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn mode(&self) -> TimerMode {
        self.config.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn start_timestamp(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn stop_timestamp(&self) -> Option<DateTime<Utc>> {
        self.stop
    }

    pub fn tracked_activity(&self) -> Option<&ActivitySnapshot> {
        self.tracked.as_ref()
    }

    pub fn tick_source(&self) -> Option<TickSource> {
        self.ticker
    }

    pub fn pending_grace_release(&self) -> Option<GraceRelease> {
        self.grace
    }

    /// Counting `hash` right now.
    pub fn is_tracking_activity(&self, hash: ActivityHash) -> bool {
        self.state.is_running
            && self.stop.is_none()
            && self.tracked.as_ref().is_some_and(|a| a.activity_hash == hash)
    }

    /// `hash` finished and its grace window is still open.
    pub fn was_recently_completed(&self, hash: ActivityHash) -> bool {
        self.stop.is_some() && self.last_completed == Some(hash)
    }

    pub fn seen_completions(&self) -> usize {
        self.seen.len()
    }

    // ── Observation ──────────────────────────────────────────────────

    /// The observer receives the current state before this returns.
    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        self.observers.subscribe(observer, &self.state)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Feed the current activity from a poll.
    ///
    /// A snapshot with no start date counts as no activity.
    pub fn on_activity_snapshot(
        &mut self,
        activity: Option<&ActivitySnapshot>,
        history: &[CompletionRecord],
        now: DateTime<Utc>,
    ) -> Option<TimerEvent> {
        let current = activity
            .filter(|a| a.is_present())
            .and_then(|a| a.start_date.map(|start| (a, start)));

        let Some((activity, start_date)) = current else {
            if activity.is_some_and(|a| a.is_present()) {
                debug!("current activity has no start date; treating as idle");
            }
            return match self.config.mode {
                TimerMode::Default => self.stop(now),
                TimerMode::Persistent => None,
            };
        };

        if self.config.mode == TimerMode::Persistent {
            if let Some(head) = history.first() {
                let end = head.presumed_end();
                if start_date < end {
                    let reason = if start_date <= end - Duration::seconds(GAP_GRACE_BUFFER_SECS) {
                        "predates last completion"
                    } else {
                        "inside end-of-run skew buffer"
                    };
                    trace!(activity_hash = activity.activity_hash, reason, "ignoring stale snapshot");
                    return None;
                }
            }
            if self.stop.is_none()
                && self
                    .tracked
                    .as_ref()
                    .is_some_and(|t| t.activity_hash == activity.activity_hash)
            {
                return None;
            }
            if self.tracked.is_none() && self.stop.is_some() {
                trace!("inside completion grace window; ignoring snapshot");
                return None;
            }
        }

        self.begin(activity, start_date, false, now)
    }

    /// Look at the head of `history` for a completion of the tracked activity.
    /// Persistent mode only.
    pub fn on_completion_check(
        &mut self,
        history: &[CompletionRecord],
        now: DateTime<Utc>,
    ) -> Option<TimerEvent> {
        if self.config.mode != TimerMode::Persistent {
            return None;
        }
        let head = history.first()?;
        if !self.seen.insert(head.completion_key()) {
            return None;
        }
        let tracked = self.tracked.as_ref()?;
        if tracked.activity_hash != head.activity_hash {
            return None;
        }
        let activity_hash = tracked.activity_hash;

        // Hold the exact final time, not the last rendered frame.
        let elapsed_ms = self.elapsed_ms(now);
        self.stop = Some(now);
        self.state.is_running = false;
        self.state.elapsed_label = format_elapsed(elapsed_ms);
        self.state.elapsed_millis_label = format_millis(elapsed_ms);
        self.ticker = None;
        self.observers.notify(&self.state);

        self.tracked = None;
        self.last_completed = Some(activity_hash);
        let generation = self.next_generation();
        self.grace = Some(GraceRelease {
            generation,
            due: now + Duration::seconds(COMPLETION_GRACE_SECS),
        });

        info!(activity_hash, elapsed_ms, "activity completed");
        Some(TimerEvent::ActivityCompleted {
            activity_hash,
            elapsed_ms,
            at: now,
        })
    }

    /// Start tracking `activity` regardless of gating.
    pub fn restart_activity(
        &mut self,
        activity: &ActivitySnapshot,
        now: DateTime<Utc>,
    ) -> Option<TimerEvent> {
        let Some(start_date) = activity.start_date else {
            debug!(
                activity_hash = activity.activity_hash,
                "restart requested without a start date"
            );
            return None;
        };
        self.begin(activity, start_date, true, now)
    }

    /// Stop counting. Persistent mode only clears a held completion.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        match self.config.mode {
            TimerMode::Default => {
                let had_state = self.tracked.is_some()
                    || self.start.is_some()
                    || self.stop.is_some()
                    || self.ticker.is_some()
                    || self.grace.is_some();
                self.ticker = None;
                self.grace = None;
                self.start = None;
                self.stop = None;
                self.tracked = None;
                self.last_completed = None;
                self.show(String::new(), String::new());
                had_state.then(|| {
                    debug!("timer stopped");
                    TimerEvent::TimerCleared { at: now }
                })
            }
            TimerMode::Persistent => {
                self.stop?;
                // The pending release still ends suppression on schedule.
                self.ticker = None;
                self.start = None;
                self.tracked = None;
                self.show(String::new(), String::new());
                debug!("held completion cleared");
                Some(TimerEvent::TimerCleared { at: now })
            }
        }
    }

    /// Drop the tracked run and show the placeholder label.
    /// Completions already seen stay seen.
    pub fn clear_activity(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        self.ticker = None;
        self.grace = None;
        self.start = None;
        self.stop = None;
        self.tracked = None;
        self.last_completed = None;
        self.show(CLEARED_LABEL.to_string(), String::new());
        Some(TimerEvent::TimerCleared { at: now })
    }

    /// Back to a freshly constructed timer, keeping observers and config.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        self.ticker = None;
        self.grace = None;
        self.start = None;
        self.stop = None;
        self.tracked = None;
        self.last_completed = None;
        self.seen.clear();
        self.show(String::new(), String::new());
        Some(TimerEvent::TimerCleared { at: now })
    }

    /// Render tick. `false` when nothing is counting.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.ticker.is_none() || self.start.is_none() {
            return false;
        }
        self.render(now);
        true
    }

    /// Render tick from a specific source; stale sources are ignored.
    pub fn tick_for(&mut self, generation: u64, now: DateTime<Utc>) -> bool {
        match self.ticker {
            Some(source) if source.generation == generation => self.tick(now),
            _ => false,
        }
    }

    /// End the post-completion window scheduled as `generation`.
    pub fn release_grace(&mut self, generation: u64, now: DateTime<Utc>) -> Option<TimerEvent> {
        match self.grace {
            Some(release) if release.generation == generation => {}
            _ => return None,
        }
        self.grace = None;
        self.stop = None;
        let activity_hash = self.last_completed.take();
        debug!(?activity_hash, "completion grace window released");
        Some(TimerEvent::GraceReleased {
            activity_hash,
            at: now,
        })
    }

    pub fn set_mode(&mut self, mode: TimerMode, now: DateTime<Utc>) -> Option<TimerEvent> {
        if self.config.mode == mode {
            return None;
        }
        self.config.mode = mode;
        self.state.mode = mode;
        self.observers.notify(&self.state);
        info!(?mode, "timer mode changed");
        Some(TimerEvent::ModeChanged { mode, at: now })
    }

    /// Switches the render cadence; a running tick is replaced.
    pub fn set_display_milliseconds(
        &mut self,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> Option<TimerEvent> {
        if self.config.display_milliseconds == enabled {
            return None;
        }
        self.config.display_milliseconds = enabled;
        let period = self.config.tick_period();
        if self.ticker.is_some() {
            self.ticker = Some(TickSource {
                generation: self.next_generation(),
                period,
            });
        }
        Some(TimerEvent::CadenceChanged {
            period_ms: period.as_millis() as u64,
            at: now,
        })
    }

    /// One poll: completion first, then the current activity. Untrackable
    /// and excluded activities count as no activity.
    pub fn apply_snapshot(
        &mut self,
        snapshot: &PlayerSnapshot,
        now: DateTime<Utc>,
    ) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        events.extend(self.on_completion_check(&snapshot.activity_history, now));

        let current = snapshot.current().filter(|a| {
            catalog::is_trackable(&a.category_hints) && !catalog::is_excluded(a.activity_hash)
        });
        events.extend(self.on_activity_snapshot(current, &snapshot.activity_history, now));
        events
    }

    // ── Internals ────────────────────────────────────────────────────

    fn begin(
        &mut self,
        activity: &ActivitySnapshot,
        start_date: DateTime<Utc>,
        forced: bool,
        now: DateTime<Utc>,
    ) -> Option<TimerEvent> {
        self.tracked = Some(activity.clone());
        self.start = Some(start_date);
        self.stop = None;
        self.state.is_running = true;
        self.ticker = Some(TickSource {
            generation: self.next_generation(),
            period: self.config.tick_period(),
        });
        self.render(now);

        info!(
            activity_hash = activity.activity_hash,
            %start_date,
            forced,
            "tracking activity"
        );
        Some(TimerEvent::TrackingStarted {
            activity_hash: activity.activity_hash,
            started_at: start_date,
            forced,
            at: now,
        })
    }

    fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        self.start
            .map(|start| (now - start).num_milliseconds().max(0) as u64)
            .unwrap_or(0)
    }

    fn render(&mut self, now: DateTime<Utc>) {
        let elapsed = self.elapsed_ms(now);
        self.state.elapsed_label = format_elapsed(elapsed);
        self.state.elapsed_millis_label = format_millis(elapsed);
        self.observers.notify(&self.state);
    }

    fn show(&mut self, label: String, millis: String) {
        self.state.is_running = false;
        self.state.elapsed_label = label;
        self.state.elapsed_millis_label = millis;
        self.observers.notify(&self.state);
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}
