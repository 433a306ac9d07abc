//! Ladder: personal productivity tracker core.
//!
//! Two record collections — timed daily reminders and status-tracked tasks —
//! behind a routed CRUD layer with scheduled notification side-effects.
//!
//! # Architecture
//!
//! - **`contract`**: addressing ([`Target`]), typed rows, partial field
//!   sets, and the closed filter/sort surface.
//! - **`store`**: schema-versioned SQLite storage (destructive migration on
//!   version bumps).
//! - **`provider`**: the record-access layer — validated CRUD routed by
//!   target, announcing mutations on an injected [`ChangeHub`].
//! - **`scheduler`**: daily trigger lifecycle per reminder, over injected
//!   [`TimerRegistry`](scheduler::TimerRegistry) /
//!   [`Notifier`](scheduler::Notifier) capabilities.
//!
//! External callers (the CLI, a UI) invoke the provider for CRUD and issue
//! `schedule`/`cancel` commands after mutating reminders; the scheduler
//! reads rows back through the provider and never writes them.

pub mod changes;
pub mod config;
pub mod contract;
pub mod error;
pub mod ladder_dirs;
pub mod provider;
pub mod scheduler;
pub mod store;

pub use changes::{ChangeEvent, ChangeHub, SubscriptionId};
pub use config::LadderConfig;
pub use contract::{
    Collection, Filter, Reminder, ReminderValues, RowSet, Sort, Target, Task, TaskStatus,
    TaskValues, Values,
};
pub use error::{LadderError, Result};
pub use provider::WorkProvider;
pub use scheduler::{
    AlarmScheduler, LogNotifier, Notifier, TimerRegistry, TokioTimers, TriggerPayload,
};
pub use store::WorkStore;
