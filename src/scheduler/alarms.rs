//! Daily trigger lifecycle per reminder.
//!
//! [`AlarmScheduler`] keeps a one-to-one mapping from reminder identifier to
//! an installed recurring daily trigger. It never writes rows: it reads the
//! affected reminder back through the record-access layer, computes the
//! first fire time, and drives the injected [`TimerRegistry`] / [`Notifier`]
//! capabilities.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info};

use crate::error::Result;
use crate::provider::WorkProvider;
use crate::scheduler::platform::{FireCallback, Notifier, TimerRegistry, TriggerPayload};

/// Schedules, cancels, and fires daily reminder triggers.
pub struct AlarmScheduler {
    provider: Arc<WorkProvider>,
    timers: Arc<dyn TimerRegistry>,
    notifier: Arc<dyn Notifier>,
}

impl AlarmScheduler {
    pub fn new(
        provider: Arc<WorkProvider>,
        timers: Arc<dyn TimerRegistry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            provider,
            timers,
            notifier,
        }
    }

    /// Arm (or re-arm) the daily trigger for a reminder.
    ///
    /// Reads the row by identifier; a missing row is a benign no-op
    /// returning `false`. Otherwise registers a daily trigger first firing
    /// today at the stored hour:minute in the local timezone, replacing any
    /// prior registration for the same identifier. The payload snapshots
    /// (id, name, details) as of now; later edits take effect on the next
    /// `schedule` call. Timer-registration failures surface to the caller;
    /// the row that was just read stays as-is.
    pub fn schedule(&self, id: i64) -> Result<bool> {
        let Some(reminder) = self.provider.reminder(id)? else {
            debug!(reminder = id, "nothing to schedule, row does not exist");
            return Ok(false);
        };

        let first_fire = first_fire_epoch_millis(&Local::now(), reminder.hour, reminder.minute);
        let payload = TriggerPayload {
            id: reminder.id,
            name: reminder.name,
            details: reminder.details,
        };

        self.timers
            .register_daily(id, first_fire, payload, self.fire_callback())?;
        info!(
            reminder = id,
            "armed daily trigger at {:02}:{:02}", reminder.hour, reminder.minute
        );
        Ok(true)
    }

    /// Remove the trigger for a reminder. No-op if none is installed.
    pub fn cancel(&self, id: i64) {
        self.timers.unregister(id);
        debug!(reminder = id, "trigger cancelled");
    }

    /// Deliver the notification for a fired trigger.
    ///
    /// Keyed by the reminder identifier, so a second firing before the
    /// first is dismissed replaces it rather than duplicating.
    pub fn on_fire(&self, payload: &TriggerPayload) {
        self.notifier
            .post(payload.id, &payload.name, payload.details.as_deref());
    }

    /// Returns `true` while a trigger is installed for `id`.
    pub fn trigger_installed(&self, id: i64) -> bool {
        self.timers.is_registered(id)
    }

    /// Boot-time reconciliation: re-issue `schedule` for every stored
    /// reminder. Returns how many triggers were armed.
    pub fn reschedule_all(&self) -> Result<usize> {
        let mut armed = 0;
        for reminder in self.provider.reminders()? {
            if self.schedule(reminder.id)? {
                armed += 1;
            }
        }
        info!("reconciliation pass armed {armed} trigger(s)");
        Ok(armed)
    }

    fn fire_callback(&self) -> FireCallback {
        let notifier = Arc::clone(&self.notifier);
        Arc::new(move |payload: &TriggerPayload| {
            notifier.post(payload.id, &payload.name, payload.details.as_deref());
        })
    }
}

/// First fire time: today's date at `hour:minute` in the local timezone,
/// regardless of whether that moment has already passed today. The timer
/// registry rolls a past instant forward to the next occurrence.
pub(crate) fn first_fire_epoch_millis(now: &DateTime<Local>, hour: u32, minute: u32) -> i64 {
    let today = now.date_naive();
    match today.and_hms_opt(hour, minute, 0) {
        Some(naive) => match Local.from_local_datetime(&naive).earliest() {
            Some(instant) => instant.timestamp_millis(),
            // The slot falls inside a DST gap; fire now and let the daily
            // period settle onto the slot from tomorrow on.
            None => now.timestamp_millis(),
        },
        // Unreachable for validated rows (hour/minute are range-checked on
        // write); fall back to now rather than panicking.
        None => now.timestamp_millis(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
