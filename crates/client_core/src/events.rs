//! In-memory event catalog and registration ledger.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use shared::{
    domain::{
        Event, EventDraft, EventId, EventPatch, Registration, RegistrationId, RegistrationStatus,
        UserId,
    },
    seed::Catalog,
};
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::{
    operation::{OperationQueue, PendingOperation},
    ClientEvent,
};

struct Ledger {
    events: Vec<Event>,
    registrations: Vec<Registration>,
}

pub(crate) struct EventsInner {
    ledger: RwLock<Ledger>,
    notifier: broadcast::Sender<ClientEvent>,
}

impl EventsInner {
    fn notify(&self, event: ClientEvent) {
        let _ = self.notifier.send(event);
    }
}

pub struct EventsStore {
    inner: Arc<EventsInner>,
    queue: OperationQueue<EventsInner>,
}

impl EventsStore {
    pub fn new(
        catalog: Catalog,
        latency: Duration,
        notifier: broadcast::Sender<ClientEvent>,
    ) -> Self {
        let inner = Arc::new(EventsInner {
            ledger: RwLock::new(Ledger {
                events: catalog.events,
                registrations: catalog.registrations,
            }),
            notifier,
        });
        let queue = OperationQueue::start("events", Arc::clone(&inner), latency);
        Self { inner, queue }
    }

    pub async fn events(&self) -> Vec<Event> {
        self.inner.ledger.read().await.events.clone()
    }

    pub async fn registrations(&self) -> Vec<Registration> {
        self.inner.ledger.read().await.registrations.clone()
    }

    pub async fn get_event(&self, id: &EventId) -> Option<Event> {
        self.inner
            .ledger
            .read()
            .await
            .events
            .iter()
            .find(|event| &event.id == id)
            .cloned()
    }

    /// Every registration the user holds, whatever its status.
    pub async fn get_user_registrations(&self, user_id: &UserId) -> Vec<Registration> {
        self.inner
            .ledger
            .read()
            .await
            .registrations
            .iter()
            .filter(|registration| &registration.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn get_event_registrations(&self, event_id: &EventId) -> Vec<Registration> {
        self.inner
            .ledger
            .read()
            .await
            .registrations
            .iter()
            .filter(|registration| &registration.event_id == event_id)
            .cloned()
            .collect()
    }

    /// Books `ticket_count` tickets as a confirmed registration priced from
    /// the event at the moment the operation applies. Resolves `false` when
    /// the event does not exist or no tickets were requested.
    ///
    /// Capacity is not checked.
    pub fn register_for_event(
        &self,
        event_id: EventId,
        user_id: UserId,
        user_name: String,
        user_email: String,
        ticket_count: u32,
    ) -> PendingOperation<bool> {
        self.queue.submit(move |inner| async move {
            if ticket_count == 0 {
                warn!(%event_id, %user_id, "registration rejected: no tickets requested");
                return false;
            }

            let mut ledger = inner.ledger.write().await;
            let Some(price) = ledger
                .events
                .iter()
                .find(|event| event.id == event_id)
                .map(|event| event.price)
            else {
                warn!(%event_id, %user_id, "registration rejected: event not found");
                return false;
            };

            let registration = Registration {
                id: RegistrationId::generate(),
                event_id,
                user_id,
                user_name,
                user_email,
                date: Utc::now(),
                ticket_count,
                total_price: price.times(ticket_count),
                status: RegistrationStatus::Confirmed,
            };
            info!(
                registration_id = %registration.id,
                event_id = %registration.event_id,
                tickets = ticket_count,
                total = %registration.total_price,
                "registration confirmed"
            );
            let registration_id = registration.id.clone();
            ledger.registrations.push(registration);
            drop(ledger);

            inner.notify(ClientEvent::RegistrationsChanged { registration_id });
            true
        })
    }

    pub fn add_event(&self, draft: EventDraft) -> PendingOperation<Event> {
        self.queue.submit(move |inner| async move {
            let event = Event::from_draft(EventId::generate(), draft);
            inner.ledger.write().await.events.push(event.clone());
            info!(event_id = %event.id, title = %event.title, "event added");
            inner.notify(ClientEvent::EventsChanged {
                event_id: event.id.clone(),
            });
            event
        })
    }

    /// Merges `patch` into the event. Resolves `true` even when no event has
    /// that id.
    pub fn update_event(&self, id: EventId, patch: EventPatch) -> PendingOperation<bool> {
        self.queue.submit(move |inner| async move {
            let mut ledger = inner.ledger.write().await;
            let target = ledger.events.iter_mut().find(|event| event.id == id);
            let updated = match target {
                Some(event) => {
                    patch.apply_to(event);
                    true
                }
                None => false,
            };
            drop(ledger);

            if updated {
                info!(event_id = %id, "event updated");
                inner.notify(ClientEvent::EventsChanged { event_id: id });
            } else {
                warn!(event_id = %id, "update skipped: event not found");
            }
            true
        })
    }

    /// Removes the event. Its registrations are kept and left dangling.
    /// Resolves `true` even when no event has that id.
    pub fn delete_event(&self, id: EventId) -> PendingOperation<bool> {
        self.queue.submit(move |inner| async move {
            let mut ledger = inner.ledger.write().await;
            let before = ledger.events.len();
            ledger.events.retain(|event| event.id != id);
            let removed = ledger.events.len() != before;
            drop(ledger);

            if removed {
                info!(event_id = %id, "event deleted");
                inner.notify(ClientEvent::EventsChanged { event_id: id });
            } else {
                warn!(event_id = %id, "delete skipped: event not found");
            }
            true
        })
    }

    /// Sets only the status field. Resolves `true` even when no registration
    /// has that id.
    pub fn update_registration_status(
        &self,
        id: RegistrationId,
        status: RegistrationStatus,
    ) -> PendingOperation<bool> {
        self.queue.submit(move |inner| async move {
            let mut ledger = inner.ledger.write().await;
            let target = ledger
                .registrations
                .iter_mut()
                .find(|registration| registration.id == id);
            let updated = match target {
                Some(registration) => {
                    registration.status = status;
                    true
                }
                None => false,
            };
            drop(ledger);

            if updated {
                info!(registration_id = %id, %status, "registration status updated");
                inner.notify(ClientEvent::RegistrationsChanged {
                    registration_id: id,
                });
            } else {
                warn!(registration_id = %id, "status update skipped: registration not found");
            }
            true
        })
    }

    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
