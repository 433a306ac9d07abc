//! Daily reminder trigger scheduling.
//!
//! Sub-modules:
//! - `platform`: injected [`TimerRegistry`] / [`Notifier`] capabilities and
//!   their production implementations.
//! - `alarms`: the [`AlarmScheduler`] driving trigger lifecycle per
//!   reminder.

pub mod alarms;
pub mod platform;

pub use alarms::AlarmScheduler;
pub use platform::{
    FireCallback, LogNotifier, Notifier, TimerRegistry, TokioTimers, TriggerPayload,
};
