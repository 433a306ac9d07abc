//! Injected platform capabilities for the scheduler.
//!
//! The scheduler depends on two abstract surfaces: a [`TimerRegistry`] that
//! installs recurring daily timers, and a [`Notifier`] that posts keyed
//! user-facing notifications. Production code gets [`TokioTimers`] and
//! [`LogNotifier`]; tests inject recording doubles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{LadderError, Result};

/// One day, in milliseconds.
pub(crate) const DAY_MILLIS: i64 = 86_400_000;

/// Snapshot of reminder fields captured when a trigger is armed.
///
/// Later edits to the row do not change an armed trigger's payload until
/// the reminder is scheduled again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPayload {
    pub id: i64,
    pub name: String,
    pub details: Option<String>,
}

/// Callback invoked each time a trigger fires.
pub type FireCallback = Arc<dyn Fn(&TriggerPayload) + Send + Sync>;

/// Recurring daily timer installation, keyed by reminder identifier.
///
/// Registering for an identifier that already holds a trigger replaces the
/// prior registration (idempotent upsert).
pub trait TimerRegistry: Send + Sync {
    /// Install a daily-recurring trigger firing first at
    /// `first_fire_epoch_millis`, then every 24 hours.
    fn register_daily(
        &self,
        id: i64,
        first_fire_epoch_millis: i64,
        payload: TriggerPayload,
        on_fire: FireCallback,
    ) -> Result<()>;

    /// Remove the trigger for `id`. No-op if none is installed.
    fn unregister(&self, id: i64);

    /// Returns `true` while a trigger is installed for `id`.
    fn is_registered(&self, id: i64) -> bool;
}

/// User-facing notification surface, keyed by reminder identifier.
///
/// Posting under a key that already holds a notification replaces it
/// rather than duplicating.
pub trait Notifier: Send + Sync {
    fn post(&self, id: i64, title: &str, body: Option<&str>);
    fn cancel(&self, id: i64);
}

// ---------------------------------------------------------------------------
// Production implementations
// ---------------------------------------------------------------------------

/// Notifier that surfaces notifications through structured logging.
///
/// The headless build has no desktop notification surface; operators watch
/// the log stream instead.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn post(&self, id: i64, title: &str, body: Option<&str>) {
        info!(
            reminder = id,
            body = body.unwrap_or_default(),
            "notification: {title}"
        );
    }

    fn cancel(&self, id: i64) {
        debug!(reminder = id, "notification dismissed");
    }
}

/// Tokio-backed timer registry: one spawned task per trigger.
///
/// The task sleeps until the first fire, then loops on a 24-hour period.
/// A first fire in the past is rolled forward to the next occurrence of
/// the same wall-clock time (this platform offers no automatic
/// roll-forward). Must be used from within a tokio runtime.
#[derive(Default)]
pub struct TokioTimers {
    handles: Mutex<HashMap<i64, tokio::task::JoinHandle<()>>>,
}

impl TokioTimers {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, tokio::task::JoinHandle<()>>> {
        match self.handles.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TimerRegistry for TokioTimers {
    fn register_daily(
        &self,
        id: i64,
        first_fire_epoch_millis: i64,
        payload: TriggerPayload,
        on_fire: FireCallback,
    ) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            LadderError::Scheduler("timer registration requires a tokio runtime".to_owned())
        })?;

        let delay = delay_until_next_occurrence(first_fire_epoch_millis, now_epoch_millis());
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            loop {
                on_fire(&payload);
                tokio::time::sleep(Duration::from_millis(DAY_MILLIS as u64)).await;
            }
        });

        let mut handles = self.lock();
        if let Some(prior) = handles.insert(id, handle) {
            debug!(reminder = id, "replacing armed trigger");
            prior.abort();
        }
        Ok(())
    }

    fn unregister(&self, id: i64) {
        if let Some(handle) = self.lock().remove(&id) {
            handle.abort();
        }
    }

    fn is_registered(&self, id: i64) -> bool {
        self.lock().get(&id).is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, handle) in self.lock().drain() {
            handle.abort();
        }
    }
}

/// Milliseconds until the next occurrence of the target instant's
/// wall-clock slot. A future target waits until that target; a past target
/// rolls forward by whole days.
pub(crate) fn delay_until_next_occurrence(target_epoch_millis: i64, now_epoch_millis: i64) -> Duration {
    let diff = target_epoch_millis - now_epoch_millis;
    let delta = if diff >= 0 {
        diff
    } else {
        diff.rem_euclid(DAY_MILLIS)
    };
    Duration::from_millis(delta as u64)
}

pub(crate) fn now_epoch_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
