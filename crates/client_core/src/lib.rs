use std::{sync::Arc, time::Duration};

use shared::{
    domain::{EventId, RegistrationId, User},
    error::{ApiError, ErrorCode},
    seed::{self, Catalog},
    validation::{self, ContactMessage},
};
use storage::LocalStorage;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub mod auth;
pub mod contact;
pub mod error;
pub mod events;
pub mod operation;
pub mod routes;

pub use auth::AuthStore;
pub use contact::ContactDesk;
pub use error::ClientError;
pub use events::EventsStore;
pub use operation::PendingOperation;
pub use routes::{Access, Navigation, Route};

const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);
const DEFAULT_CONTACT_LATENCY: Duration = Duration::from_millis(1500);
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Snapshot of who is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.role.is_admin())
    }
}

/// Change notifications fanned out to every subscriber after a mutation
/// has been applied.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    SessionChanged(Option<User>),
    EventsChanged { event_id: EventId },
    RegistrationsChanged { registration_id: RegistrationId },
    ContactMessageSent,
}

/// Simulated round-trip delays for each container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkProfile {
    pub latency: Duration,
    pub contact_latency: Duration,
}

impl Default for NetworkProfile {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            contact_latency: DEFAULT_CONTACT_LATENCY,
        }
    }
}

impl NetworkProfile {
    pub fn instant() -> Self {
        Self {
            latency: Duration::ZERO,
            contact_latency: Duration::ZERO,
        }
    }
}

/// Owns the application's state containers. Built once at startup and
/// passed to whatever renders views.
pub struct AppContext {
    pub auth: AuthStore,
    pub events: EventsStore,
    pub contact: ContactDesk,
    notifier: broadcast::Sender<ClientEvent>,
}

impl AppContext {
    /// Seeds the events container from the bundled catalog.
    pub async fn initialize(
        storage: Arc<dyn LocalStorage>,
        network: NetworkProfile,
    ) -> Result<Self, ClientError> {
        let catalog = seed::catalog().map_err(|source| ClientError::Catalog { source })?;
        Self::with_catalog(storage, network, catalog).await
    }

    pub async fn with_catalog(
        storage: Arc<dyn LocalStorage>,
        network: NetworkProfile,
        catalog: Catalog,
    ) -> Result<Self, ClientError> {
        let (notifier, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        info!(
            events = catalog.events.len(),
            registrations = catalog.registrations.len(),
            latency_ms = network.latency.as_millis() as u64,
            "initializing application context"
        );

        let auth = AuthStore::initialize(storage, network.latency, notifier.clone()).await?;
        let events = EventsStore::new(catalog, network.latency, notifier.clone());
        let contact = ContactDesk::new(network.contact_latency, notifier.clone());
        Ok(Self {
            auth,
            events,
            contact,
            notifier,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.notifier.subscribe()
    }

    pub async fn session(&self) -> Session {
        self.auth.session().await
    }

    /// Applies the route guards for the current session.
    pub async fn navigate(&self, path: &str) -> Navigation {
        let session = self.session().await;
        routes::resolve(path, &session)
    }

    /// Validates the login form before starting the sign-in round trip.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<PendingOperation<bool>, ApiError> {
        validation::validate_login_form(email, password)?;
        Ok(self.auth.login(email, password))
    }

    pub fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<PendingOperation<bool>, ApiError> {
        validation::validate_registration_form(name, email, password, confirm_password)?;
        Ok(self.auth.register(name, email, password))
    }

    /// Books tickets for the signed-in user. The registration carries the
    /// user's name and email as they are at submission.
    pub async fn book_event(
        &self,
        event_id: EventId,
        ticket_count: u32,
    ) -> Result<PendingOperation<bool>, ApiError> {
        let Some(user) = self.auth.current_user().await else {
            warn!(%event_id, "booking rejected: no active session");
            return Err(ApiError::new(
                ErrorCode::Unauthorized,
                "Please log in to register for this event",
            ));
        };
        Ok(self
            .events
            .register_for_event(event_id, user.id, user.name, user.email, ticket_count))
    }

    pub fn send_contact_message(
        &self,
        message: ContactMessage,
    ) -> Result<PendingOperation<()>, ApiError> {
        validation::validate_contact_message(&message)?;
        Ok(self.contact.send(message))
    }

    pub async fn contact_messages(&self) -> Vec<ContactMessage> {
        self.contact.messages().await
    }

    /// Waits for every submitted operation to apply, then stops the workers.
    pub async fn shutdown(&self) {
        self.auth.shutdown().await;
        self.events.shutdown().await;
        self.contact.shutdown().await;
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
