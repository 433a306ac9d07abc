//! End-to-end tests: record-access layer + scheduler wired with recording
//! doubles for the timer and notification capabilities.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Local, TimeZone, Timelike};
use ladder::scheduler::FireCallback;
use ladder::{
    AlarmScheduler, ChangeHub, LadderError, Notifier, ReminderValues, Target, TimerRegistry,
    TriggerPayload, WorkProvider, WorkStore,
};

// ---------------------------------------------------------------------------
// Recording doubles
// ---------------------------------------------------------------------------

struct Registration {
    first_fire_epoch_millis: i64,
    payload: TriggerPayload,
    on_fire: FireCallback,
}

/// Timer registry that records registrations and lets tests simulate fires.
#[derive(Default)]
struct RecordingTimers {
    registrations: Mutex<HashMap<i64, Registration>>,
}

impl RecordingTimers {
    fn new() -> Self {
        Self::default()
    }

    fn installed_count(&self) -> usize {
        self.registrations.lock().expect("lock").len()
    }

    fn registration(&self, id: i64) -> Option<(i64, TriggerPayload)> {
        self.registrations
            .lock()
            .expect("lock")
            .get(&id)
            .map(|r| (r.first_fire_epoch_millis, r.payload.clone()))
    }

    /// Simulate the platform firing the trigger for `id`.
    fn fire(&self, id: i64) {
        let (payload, on_fire) = {
            let registrations = self.registrations.lock().expect("lock");
            let reg = registrations.get(&id).expect("trigger installed");
            (reg.payload.clone(), Arc::clone(&reg.on_fire))
        };
        on_fire(&payload);
    }
}

impl TimerRegistry for RecordingTimers {
    fn register_daily(
        &self,
        id: i64,
        first_fire_epoch_millis: i64,
        payload: TriggerPayload,
        on_fire: FireCallback,
    ) -> ladder::Result<()> {
        self.registrations.lock().expect("lock").insert(
            id,
            Registration {
                first_fire_epoch_millis,
                payload,
                on_fire,
            },
        );
        Ok(())
    }

    fn unregister(&self, id: i64) {
        self.registrations.lock().expect("lock").remove(&id);
    }

    fn is_registered(&self, id: i64) -> bool {
        self.registrations.lock().expect("lock").contains_key(&id)
    }
}

/// Timer registry whose registrations always fail.
struct FailingTimers;

impl TimerRegistry for FailingTimers {
    fn register_daily(
        &self,
        _id: i64,
        _first_fire_epoch_millis: i64,
        _payload: TriggerPayload,
        _on_fire: FireCallback,
    ) -> ladder::Result<()> {
        Err(LadderError::Scheduler("registration refused".to_owned()))
    }

    fn unregister(&self, _id: i64) {}

    fn is_registered(&self, _id: i64) -> bool {
        false
    }
}

/// Notifier that records the latest notification per key.
#[derive(Default)]
struct RecordingNotifier {
    posted: Mutex<HashMap<i64, (String, Option<String>)>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self::default()
    }

    fn posted(&self, id: i64) -> Option<(String, Option<String>)> {
        self.posted.lock().expect("lock").get(&id).cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn post(&self, id: i64, title: &str, body: Option<&str>) {
        self.posted
            .lock()
            .expect("lock")
            .insert(id, (title.to_owned(), body.map(str::to_owned)));
    }

    fn cancel(&self, id: i64) {
        self.posted.lock().expect("lock").remove(&id);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    provider: Arc<WorkProvider>,
    scheduler: AlarmScheduler,
    timers: Arc<RecordingTimers>,
    notifier: Arc<RecordingNotifier>,
}

fn harness() -> Harness {
    let store = WorkStore::open_in_memory().expect("open store");
    let provider = Arc::new(WorkProvider::new(store, Arc::new(ChangeHub::new())));
    let timers = Arc::new(RecordingTimers::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let scheduler = AlarmScheduler::new(
        Arc::clone(&provider),
        Arc::clone(&timers) as Arc<dyn TimerRegistry>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    Harness {
        provider,
        scheduler,
        timers,
        notifier,
    }
}

fn insert_sleep_reminder(provider: &WorkProvider) -> i64 {
    provider
        .insert(
            &Target::Reminders,
            ReminderValues::new()
                .with_name("Sleep")
                .with_details(Some("Meditate".to_owned()))
                .with_time(23, 30)
                .into(),
        )
        .expect("insert reminder")
}

fn local_time_of(epoch_millis: i64) -> (u32, u32) {
    let instant = Local
        .timestamp_millis_opt(epoch_millis)
        .single()
        .expect("valid instant");
    (instant.hour(), instant.minute())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn insert_schedule_fire_posts_keyed_notification() {
    let h = harness();
    let id = insert_sleep_reminder(&h.provider);

    assert!(h.scheduler.schedule(id).expect("schedule"));

    let (first_fire, payload) = h.timers.registration(id).expect("trigger installed");
    assert_eq!(local_time_of(first_fire), (23, 30));
    assert_eq!(
        payload,
        TriggerPayload {
            id,
            name: "Sleep".to_owned(),
            details: Some("Meditate".to_owned()),
        }
    );

    h.timers.fire(id);
    assert_eq!(
        h.notifier.posted(id),
        Some(("Sleep".to_owned(), Some("Meditate".to_owned())))
    );
}

#[test]
fn second_fire_replaces_rather_than_duplicates() {
    let h = harness();
    let id = insert_sleep_reminder(&h.provider);
    h.scheduler.schedule(id).expect("schedule");

    h.timers.fire(id);
    h.timers.fire(id);

    let posted = h.notifier.posted.lock().expect("lock");
    assert_eq!(posted.len(), 1, "one notification per key");
}

#[test]
fn delete_then_cancel_leaves_no_trigger() {
    let h = harness();
    let id = insert_sleep_reminder(&h.provider);
    h.scheduler.schedule(id).expect("schedule");
    assert!(h.scheduler.trigger_installed(id));

    let deleted = h
        .provider
        .delete(&Target::Reminder(id), None)
        .expect("delete");
    assert_eq!(deleted, 1);
    h.scheduler.cancel(id);

    assert!(h
        .provider
        .query(&Target::Reminder(id), None, None)
        .expect("query")
        .is_empty());
    assert!(!h.scheduler.trigger_installed(id));
}

#[test]
fn schedule_twice_keeps_exactly_one_trigger_at_latest_time() {
    let h = harness();
    let id = insert_sleep_reminder(&h.provider);

    h.scheduler.schedule(id).expect("first schedule");
    h.provider
        .update(
            &Target::Reminder(id),
            ReminderValues::new().with_time(6, 15).into(),
            None,
        )
        .expect("retime");
    h.scheduler.schedule(id).expect("second schedule");

    assert_eq!(h.timers.installed_count(), 1);
    let (first_fire, _) = h.timers.registration(id).expect("trigger installed");
    assert_eq!(local_time_of(first_fire), (6, 15));
}

#[test]
fn armed_payload_is_a_snapshot_until_rescheduled() {
    let h = harness();
    let id = insert_sleep_reminder(&h.provider);
    h.scheduler.schedule(id).expect("schedule");

    h.provider
        .update(
            &Target::Reminder(id),
            ReminderValues::new().with_name("Renamed").into(),
            None,
        )
        .expect("rename");

    // The armed trigger still carries the old snapshot.
    h.timers.fire(id);
    assert_eq!(
        h.notifier.posted(id).expect("posted").0,
        "Sleep",
        "edit must not reach the armed payload"
    );

    // Rescheduling picks the edit up.
    h.scheduler.schedule(id).expect("reschedule");
    h.timers.fire(id);
    assert_eq!(h.notifier.posted(id).expect("posted").0, "Renamed");
}

#[test]
fn schedule_missing_reminder_is_a_noop() {
    let h = harness();
    assert!(!h.scheduler.schedule(404).expect("schedule"));
    assert_eq!(h.timers.installed_count(), 0);
}

#[test]
fn cancel_without_trigger_is_a_noop() {
    let h = harness();
    h.scheduler.cancel(404);
    assert!(!h.scheduler.trigger_installed(404));
}

#[test]
fn reschedule_all_arms_one_trigger_per_reminder() {
    let h = harness();
    let first = insert_sleep_reminder(&h.provider);
    let second = h
        .provider
        .insert(
            &Target::Reminders,
            ReminderValues::new().with_name("Stretch").with_time(7, 0).into(),
        )
        .expect("insert second");

    let armed = h.scheduler.reschedule_all().expect("reschedule_all");
    assert_eq!(armed, 2);
    assert!(h.scheduler.trigger_installed(first));
    assert!(h.scheduler.trigger_installed(second));
}

#[test]
fn failed_registration_surfaces_but_row_survives() {
    let store = WorkStore::open_in_memory().expect("open store");
    let provider = Arc::new(WorkProvider::new(store, Arc::new(ChangeHub::new())));
    let scheduler = AlarmScheduler::new(
        Arc::clone(&provider),
        Arc::new(FailingTimers),
        Arc::new(RecordingNotifier::new()),
    );

    let id = insert_sleep_reminder(&provider);
    let err = scheduler.schedule(id).expect_err("registration must fail");
    assert!(matches!(err, LadderError::Scheduler(_)));

    // The CRUD operation that preceded the schedule is not rolled back.
    assert!(provider.reminder(id).expect("read").is_some());
}

#[test]
fn on_fire_posts_directly() {
    let h = harness();
    let payload = TriggerPayload {
        id: 9,
        name: "Walk".to_owned(),
        details: None,
    };
    h.scheduler.on_fire(&payload);
    assert_eq!(h.notifier.posted(9), Some(("Walk".to_owned(), None)));
}
