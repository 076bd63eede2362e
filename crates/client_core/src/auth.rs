//! Mocked authentication. The signed-in user lives in memory and in local
//! storage under [`USER_STORAGE_KEY`].

use std::{sync::Arc, time::Duration};

use shared::domain::{Role, User, UserId};
use storage::LocalStorage;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};

use crate::{
    error::ClientError,
    operation::{OperationQueue, PendingOperation},
    ClientEvent, Session,
};

pub const USER_STORAGE_KEY: &str = "eventVista_user";

struct DemoAccount {
    email: &'static str,
    password: &'static str,
    id: &'static str,
    name: &'static str,
    role: Role,
}

impl DemoAccount {
    fn user(&self) -> User {
        User {
            id: UserId::from(self.id),
            name: self.name.to_string(),
            email: self.email.to_string(),
            role: self.role,
        }
    }
}

static DEMO_ACCOUNTS: [DemoAccount; 2] = [
    DemoAccount {
        email: "admin@eventvista.com",
        password: "admin123",
        id: "admin-id-123",
        name: "Admin User",
        role: Role::Admin,
    },
    DemoAccount {
        email: "user@example.com",
        password: "password123",
        id: "user-id-456",
        name: "Regular User",
        role: Role::User,
    },
];

pub(crate) struct AuthInner {
    user: RwLock<Option<User>>,
    storage: Arc<dyn LocalStorage>,
    notifier: broadcast::Sender<ClientEvent>,
}

impl AuthInner {
    /// Persists first so a failed write leaves the session untouched.
    async fn establish(&self, user: User) -> Result<(), ClientError> {
        let raw = serde_json::to_string(&user)
            .map_err(|err| ClientError::storage(anyhow::Error::new(err)))?;
        self.storage
            .set_item(USER_STORAGE_KEY, &raw)
            .await
            .map_err(ClientError::storage)?;

        *self.user.write().await = Some(user.clone());
        info!(user_id = %user.id, role = %user.role, "session established");
        let _ = self.notifier.send(ClientEvent::SessionChanged(Some(user)));
        Ok(())
    }
}

pub struct AuthStore {
    inner: Arc<AuthInner>,
    queue: OperationQueue<AuthInner>,
}

impl AuthStore {
    /// Restores any stored session. A stored value that does not parse is
    /// reported, not discarded.
    pub async fn initialize(
        storage: Arc<dyn LocalStorage>,
        latency: Duration,
        notifier: broadcast::Sender<ClientEvent>,
    ) -> Result<Self, ClientError> {
        let stored = storage
            .get_item(USER_STORAGE_KEY)
            .await
            .map_err(ClientError::storage)?;
        let user = match stored {
            Some(raw) => {
                let user: User = serde_json::from_str(&raw).map_err(|source| {
                    ClientError::MalformedSession {
                        key: USER_STORAGE_KEY,
                        source,
                    }
                })?;
                info!(user_id = %user.id, "restored stored session");
                Some(user)
            }
            None => None,
        };

        let inner = Arc::new(AuthInner {
            user: RwLock::new(user),
            storage,
            notifier,
        });
        let queue = OperationQueue::start("auth", Arc::clone(&inner), latency);
        Ok(Self { inner, queue })
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.user.read().await.clone()
    }

    pub async fn session(&self) -> Session {
        Session {
            user: self.current_user().await,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.user.read().await.is_some()
    }

    pub async fn is_admin(&self) -> bool {
        self.inner
            .user
            .read()
            .await
            .as_ref()
            .is_some_and(|user| user.role.is_admin())
    }

    /// Resolves `true` when the pair matches a demo account. Wrong
    /// credentials and internal failures both resolve `false`.
    pub fn login(&self, email: &str, password: &str) -> PendingOperation<bool> {
        let email = email.to_string();
        let password = password.to_string();
        self.queue.submit(move |inner| async move {
            let Some(account) = DEMO_ACCOUNTS
                .iter()
                .find(|account| account.email == email && account.password == password)
            else {
                warn!(%email, "login rejected: invalid credentials");
                return false;
            };

            match inner.establish(account.user()).await {
                Ok(()) => true,
                Err(err) => {
                    error!(%email, "login failed: {err}");
                    false
                }
            }
        })
    }

    /// Signs up a new `user`-role account. Email uniqueness is not checked and
    /// the password is not retained.
    pub fn register(&self, name: &str, email: &str, _password: &str) -> PendingOperation<bool> {
        let user = User {
            id: UserId::generate(),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::User,
        };
        self.queue.submit(move |inner| async move {
            let email = user.email.clone();
            match inner.establish(user).await {
                Ok(()) => true,
                Err(err) => {
                    error!(%email, "registration failed: {err}");
                    false
                }
            }
        })
    }

    /// Clears the session immediately; no simulated latency. The stored
    /// session is removed first, so a storage failure leaves the user signed
    /// in.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.inner
            .storage
            .remove_item(USER_STORAGE_KEY)
            .await
            .map_err(ClientError::storage)?;

        let previous = self.inner.user.write().await.take();
        if let Some(user) = previous {
            info!(user_id = %user.id, "signed out");
        }
        let _ = self.inner.notifier.send(ClientEvent::SessionChanged(None));
        Ok(())
    }

    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
