mod driver;
mod engine;
mod ledger;
mod observer;
mod state;

pub use driver::TimerDriver;
pub use engine::{ActivityTimer, GraceRelease, TickSource};
pub use ledger::CompletionLedger;
pub use observer::{Observer, Observers, SubscriptionId};
pub use state::{
    TimerConfig, TimerMode, TimerState, CLEARED_LABEL, COMPLETION_GRACE_SECS,
    GAP_GRACE_BUFFER_SECS,
};
