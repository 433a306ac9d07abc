//! Change-notification fan-out for the record-access layer.
//!
//! An explicit pub/sub handle injected into the provider at construction,
//! replacing ambient global dispatch. Observers subscribe per collection (or
//! to everything) and receive a [`ChangeEvent`] whenever a mutation touches
//! their scope. Delivery is fire-and-forget over unbounded channels:
//! at-least-once, no ordering guarantees across scopes, and closed
//! subscribers are pruned on the next notify.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

use crate::contract::{Collection, Target};

/// Signal that the data under a target changed. Carries no payload beyond
/// the affected scope; observers re-query what they care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The target the mutation addressed.
    pub target: Target,
}

impl ChangeEvent {
    /// The collection the change belongs to.
    pub fn collection(&self) -> Collection {
        self.target.collection()
    }
}

/// Handle identifying one subscription, for [`ChangeHub::unsubscribe`].
pub type SubscriptionId = u64;

struct Subscriber {
    id: SubscriptionId,
    /// `None` subscribes to every collection.
    scope: Option<Collection>,
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

/// Process-lifetime pub/sub hub for change notifications.
#[derive(Default)]
pub struct ChangeHub {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for `scope` (`None` = all collections).
    ///
    /// Dropping the returned receiver ends the subscription; the hub prunes
    /// it on the next notify.
    pub fn subscribe(
        &self,
        scope: Option<Collection>,
    ) -> (SubscriptionId, mpsc::UnboundedReceiver<ChangeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push(Subscriber { id, scope, tx });
        (id, rx)
    }

    /// Remove a subscription by id. No-op if already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().retain(|s| s.id != id);
    }

    /// Fan a change out to every subscriber whose scope covers `target`.
    ///
    /// Fire-and-forget: sends to closed receivers are swallowed and the
    /// subscriber is dropped.
    pub fn notify(&self, target: &Target) {
        let event = ChangeEvent { target: *target };
        let collection = target.collection();

        let mut subscribers = self.lock();
        subscribers.retain(|s| {
            let interested = s.scope.is_none_or(|scope| scope == collection);
            if !interested {
                return true;
            }
            match s.tx.send(event) {
                Ok(()) => true,
                Err(_) => {
                    debug!("dropping closed change subscriber {}", s.id);
                    false
                }
            }
        });
    }

    /// Current number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        // A poisoned hub still delivers to the survivors; notification
        // delivery is best-effort by contract.
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_subscriber_sees_only_its_collection() {
        let hub = ChangeHub::new();
        let (_id, mut rx) = hub.subscribe(Some(Collection::Reminders));

        hub.notify(&Target::Tasks);
        hub.notify(&Target::Reminder(3));

        let event = rx.try_recv().expect("reminder event");
        assert_eq!(event.target, Target::Reminder(3));
        assert!(rx.try_recv().is_err(), "task event must not be delivered");
    }

    #[test]
    fn unscoped_subscriber_sees_everything() {
        let hub = ChangeHub::new();
        let (_id, mut rx) = hub.subscribe(None);

        hub.notify(&Target::Reminders);
        hub.notify(&Target::Task(9));

        assert_eq!(rx.try_recv().expect("first").target, Target::Reminders);
        assert_eq!(rx.try_recv().expect("second").target, Target::Task(9));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let hub = ChangeHub::new();
        let (id, mut rx) = hub.subscribe(None);

        hub.unsubscribe(id);
        hub.notify(&Target::Reminders);

        assert!(rx.try_recv().is_err());
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn dropped_receivers_are_pruned_on_notify() {
        let hub = ChangeHub::new();
        let (_id, rx) = hub.subscribe(Some(Collection::Tasks));
        drop(rx);

        assert_eq!(hub.subscriber_count(), 1);
        hub.notify(&Target::Tasks);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn event_reports_its_collection() {
        let event = ChangeEvent {
            target: Target::Task(1),
        };
        assert_eq!(event.collection(), Collection::Tasks);
    }
}
