//! Tokio runtime for [`ActivityTimer`].
//!
//! After every command the driver compares the engine's wanted tick source and
//! grace release with the tasks it owns, aborting and respawning as needed, so
//! at most one tick task and one release task exist per driver. Dropping the
//! driver aborts both.
//!
//! Observers run while the engine lock is held and must not call back into
//! the driver.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};

use super::engine::{ActivityTimer, GraceRelease, TickSource};
use super::observer::{Observer, SubscriptionId};
use super::state::{TimerConfig, TimerMode, TimerState};
use crate::activity::{ActivityHash, ActivitySnapshot, CompletionRecord, PlayerSnapshot};
use crate::events::TimerEvent;

#[derive(Debug, Default)]
struct DriverTasks {
    ticker: Option<(u64, JoinHandle<()>)>,
    grace: Option<(u64, JoinHandle<()>)>,
}

impl DriverTasks {
    fn abort_all(&mut self) {
        if let Some((_, handle)) = self.ticker.take() {
            handle.abort();
        }
        if let Some((_, handle)) = self.grace.take() {
            handle.abort();
        }
    }
}

impl Drop for DriverTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Owns an [`ActivityTimer`] plus its render and grace tasks.
#[derive(Debug)]
pub struct TimerDriver {
    timer: Arc<Mutex<ActivityTimer>>,
    tasks: Mutex<DriverTasks>,
}

impl TimerDriver {
    pub fn new(config: TimerConfig) -> Self {
        Self::with_timer(ActivityTimer::new(config))
    }

    pub fn with_timer(timer: ActivityTimer) -> Self {
        Self {
            timer: Arc::new(Mutex::new(timer)),
            tasks: Mutex::new(DriverTasks::default()),
        }
    }

    pub async fn state(&self) -> TimerState {
        self.timer.lock().await.state().clone()
    }

    pub async fn is_tracking_activity(&self, hash: ActivityHash) -> bool {
        self.timer.lock().await.is_tracking_activity(hash)
    }

    /// `(tick task alive, grace task alive)`.
    pub async fn active_tasks(&self) -> (bool, bool) {
        let tasks = self.tasks.lock().await;
        let alive = |slot: &Option<(u64, JoinHandle<()>)>| {
            slot.as_ref().is_some_and(|(_, handle)| !handle.is_finished())
        };
        (alive(&tasks.ticker), alive(&tasks.grace))
    }

    pub async fn subscribe(&self, observer: Observer) -> SubscriptionId {
        self.timer.lock().await.subscribe(observer)
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.timer.lock().await.unsubscribe(id)
    }

    pub async fn apply_snapshot(&self, snapshot: &PlayerSnapshot) -> Vec<TimerEvent> {
        let events = self.timer.lock().await.apply_snapshot(snapshot, Utc::now());
        self.reconcile().await;
        events
    }

    pub async fn on_activity_snapshot(
        &self,
        activity: Option<&ActivitySnapshot>,
        history: &[CompletionRecord],
    ) -> Option<TimerEvent> {
        self.run(|timer| timer.on_activity_snapshot(activity, history, Utc::now()))
            .await
    }

    pub async fn on_completion_check(&self, history: &[CompletionRecord]) -> Option<TimerEvent> {
        self.run(|timer| timer.on_completion_check(history, Utc::now()))
            .await
    }

    pub async fn restart_activity(&self, activity: &ActivitySnapshot) -> Option<TimerEvent> {
        self.run(|timer| timer.restart_activity(activity, Utc::now()))
            .await
    }

    pub async fn stop(&self) -> Option<TimerEvent> {
        self.run(|timer| timer.stop(Utc::now())).await
    }

    pub async fn clear_activity(&self) -> Option<TimerEvent> {
        self.run(|timer| timer.clear_activity(Utc::now())).await
    }

    pub async fn reset(&self) -> Option<TimerEvent> {
        self.run(|timer| timer.reset(Utc::now())).await
    }

    pub async fn set_mode(&self, mode: TimerMode) -> Option<TimerEvent> {
        self.run(|timer| timer.set_mode(mode, Utc::now())).await
    }

    pub async fn set_display_milliseconds(&self, enabled: bool) -> Option<TimerEvent> {
        self.run(|timer| timer.set_display_milliseconds(enabled, Utc::now()))
            .await
    }

    /// Abort both tasks without touching the timer state.
    pub async fn shutdown(&self) {
        self.tasks.lock().await.abort_all();
    }

    async fn run<F>(&self, command: F) -> Option<TimerEvent>
    where
        F: FnOnce(&mut ActivityTimer) -> Option<TimerEvent>,
    {
        let event = {
            let mut timer = self.timer.lock().await;
            command(&mut timer)
        };
        self.reconcile().await;
        event
    }

    async fn reconcile(&self) {
        let (ticker, grace) = {
            let timer = self.timer.lock().await;
            (timer.tick_source(), timer.pending_grace_release())
        };
        let mut tasks = self.tasks.lock().await;

        let running_tick = tasks.ticker.as_ref().map(|(generation, _)| *generation);
        if running_tick != ticker.map(|source| source.generation) {
            if let Some((_, handle)) = tasks.ticker.take() {
                handle.abort();
            }
            if let Some(source) = ticker {
                trace!(generation = source.generation, period = ?source.period, "spawning tick task");
                tasks.ticker = Some((source.generation, spawn_ticker(Arc::clone(&self.timer), source)));
            }
        }

        let running_grace = tasks.grace.as_ref().map(|(generation, _)| *generation);
        if running_grace != grace.map(|release| release.generation) {
            if let Some((_, handle)) = tasks.grace.take() {
                handle.abort();
            }
            if let Some(release) = grace {
                tasks.grace = Some((release.generation, spawn_grace(Arc::clone(&self.timer), release)));
            }
        }
    }
}

fn spawn_ticker(timer: Arc<Mutex<ActivityTimer>>, source: TickSource) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(source.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The engine renders on start; skip the immediate first tick.
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut guard = timer.lock().await;
            if !guard.tick_for(source.generation, Utc::now()) {
                break;
            }
        }
    })
}

fn spawn_grace(timer: Arc<Mutex<ActivityTimer>>, release: GraceRelease) -> JoinHandle<()> {
    let delay = (release.due - Utc::now())
        .to_std()
        .unwrap_or(StdDuration::ZERO);
    tokio::spawn(async move {
        time::sleep(delay).await;
        let mut guard = timer.lock().await;
        if let Some(event) = guard.release_grace(release.generation, Utc::now()) {
            debug!(?event, "grace task fired");
        }
    })
}
