//! Time-window boundaries for history filtering.
//!
//! Two modes:
//! - **Rolling** (`use_real_time = true`): literally the last 1/7/30 days.
//! - **Calendar**: aligned to the game's reset at 17:00 UTC. "Today" starts at
//!   the latest daily reset, "this week" at the latest Tuesday reset, and
//!   "this month" at the weekly reset three weeks before that, so it spans
//!   four weekly periods.
//!
//! Every boundary is at or before `now`; a record qualifies when
//! `period >= boundary`.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};

use super::selector::Timespan;

/// Daily content reset, in UTC.
pub const RESET_HOUR_UTC: u32 = 17;

/// Day of the weekly reset.
pub const WEEKLY_RESET_DAY: Weekday = Weekday::Tue;

/// Weekly periods covered by the calendar "month".
const WEEKS_PER_MONTH_WINDOW: i64 = 4;

fn reset_time() -> NaiveTime {
    NaiveTime::from_hms_opt(RESET_HOUR_UTC, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn reset_on(date: chrono::NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(reset_time()))
}

/// Latest daily reset at or before `now`.
pub fn daily_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = reset_on(now.date_naive());
    if today > now {
        today - Duration::days(1)
    } else {
        today
    }
}

/// Latest weekly (Tuesday) reset at or before `now`.
pub fn weekly_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_since = (now.weekday().num_days_from_monday() + 7
        - WEEKLY_RESET_DAY.num_days_from_monday())
        % 7;
    let candidate = reset_on(now.date_naive() - Duration::days(i64::from(days_since)));
    if candidate > now {
        candidate - Duration::weeks(1)
    } else {
        candidate
    }
}

/// Start of the four-week calendar window containing `now`.
pub fn monthly_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    weekly_reset(now) - Duration::weeks(WEEKS_PER_MONTH_WINDOW - 1)
}

/// Earliest `period` that still belongs to `timespan` at `now`.
pub fn window_start(timespan: Timespan, use_real_time: bool, now: DateTime<Utc>) -> DateTime<Utc> {
    if use_real_time {
        return now - timespan.rolling_window();
    }
    match timespan {
        Timespan::OneDay => daily_reset(now),
        Timespan::SevenDay => weekly_reset(now),
        Timespan::ThirtyDay => monthly_reset(now),
    }
}
