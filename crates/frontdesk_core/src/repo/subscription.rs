//! Live query subscriptions.
//!
//! # Invariants
//! - Every write re-runs each active subscriber's query and delivers the
//!   full snapshot; there is no diffing.
//! - After `unsubscribe()` (or drop) a subscriber receives no callbacks.
//! - A failed re-query delivers `on_error` once and tears the subscriber
//!   down; a fresh subscription is needed to resume.

use crate::model::request::ServiceRequest;
use crate::repo::request_repo::{RepoError, RepoResult, RequestQuery};
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// Receives the complete result set of a subscribed query.
pub type SnapshotCallback = Box<dyn FnMut(&[ServiceRequest])>;
/// Receives the error that ended a subscription.
pub type ErrorCallback = Box<dyn FnMut(&RepoError)>;

struct Subscriber {
    query: RequestQuery,
    on_snapshot: SnapshotCallback,
    on_error: ErrorCallback,
}

/// Active subscribers of one repository.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: Cell<u64>,
    entries: RefCell<BTreeMap<u64, Rc<RefCell<Subscriber>>>>,
}

impl SubscriberRegistry {
    pub(crate) fn register(
        self: &Rc<Self>,
        query: RequestQuery,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> Subscription {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.entries.borrow_mut().insert(
            id,
            Rc::new(RefCell::new(Subscriber {
                query,
                on_snapshot,
                on_error,
            })),
        );
        debug!("event=subscription_open module=repo status=ok subscription_id={id}");
        Subscription {
            id,
            registry: Rc::downgrade(self),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Re-runs every subscriber's query with `run` and delivers the outcome.
    pub(crate) fn notify(&self, run: impl Fn(&RequestQuery) -> RepoResult<Vec<ServiceRequest>>) {
        let targets: Vec<(u64, Rc<RefCell<Subscriber>>)> = self
            .entries
            .borrow()
            .iter()
            .map(|(id, subscriber)| (*id, Rc::clone(subscriber)))
            .collect();

        for (id, subscriber) in targets {
            // An earlier callback in this pass may have cancelled it.
            if !self.entries.borrow().contains_key(&id) {
                continue;
            }
            let Ok(mut subscriber) = subscriber.try_borrow_mut() else {
                warn!(
                    "event=subscription_notify module=repo status=skipped subscription_id={id} reason=reentrant_write"
                );
                continue;
            };
            match run(&subscriber.query) {
                Ok(snapshot) => (subscriber.on_snapshot)(&snapshot),
                Err(err) => {
                    self.remove(id);
                    warn!(
                        "event=subscription_notify module=repo status=error subscription_id={id} error={err}"
                    );
                    (subscriber.on_error)(&err);
                }
            }
        }
    }

    fn remove(&self, id: u64) -> bool {
        self.entries.borrow_mut().remove(&id).is_some()
    }
}

/// Handle to a live query. Dropping it cancels the subscription.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    /// Stops further callbacks.
    pub fn unsubscribe(self) {}

    /// Whether the store still delivers snapshots to this handle.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.entries.borrow().contains_key(&self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                debug!(
                    "event=subscription_close module=repo status=ok subscription_id={}",
                    self.id
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriberRegistry;
    use crate::repo::request_repo::{RepoError, RequestQuery};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn dropped_subscription_receives_nothing() {
        let registry = Rc::new(SubscriberRegistry::default());
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let subscription = registry.register(
            RequestQuery::default(),
            Box::new(move |_| *counter.borrow_mut() += 1),
            Box::new(|_| {}),
        );

        registry.notify(|_| Ok(Vec::new()));
        assert_eq!(*calls.borrow(), 1);

        drop(subscription);
        registry.notify(|_| Ok(Vec::new()));
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn error_tears_subscription_down() {
        let registry = Rc::new(SubscriberRegistry::default());
        let errors = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&errors);
        let subscription = registry.register(
            RequestQuery::default(),
            Box::new(|_| {}),
            Box::new(move |_| *counter.borrow_mut() += 1),
        );

        registry.notify(|_| Err(RepoError::StoreUnavailable));
        registry.notify(|_| Err(RepoError::StoreUnavailable));
        assert_eq!(*errors.borrow(), 1);
        assert!(!subscription.is_active());
    }
}
