use std::{sync::Arc, time::Duration};

use shared::validation::ContactMessage;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

use crate::{
    operation::{OperationQueue, PendingOperation},
    ClientEvent,
};

pub(crate) struct Inbox {
    messages: RwLock<Vec<ContactMessage>>,
    notifier: broadcast::Sender<ClientEvent>,
}

/// Accepts contact form submissions. Nothing is delivered anywhere; accepted
/// messages are kept for the lifetime of the process.
pub struct ContactDesk {
    inbox: Arc<Inbox>,
    queue: OperationQueue<Inbox>,
}

impl ContactDesk {
    pub fn new(latency: Duration, notifier: broadcast::Sender<ClientEvent>) -> Self {
        let inbox = Arc::new(Inbox {
            messages: RwLock::new(Vec::new()),
            notifier,
        });
        let queue = OperationQueue::start("contact", Arc::clone(&inbox), latency);
        Self { inbox, queue }
    }

    /// Expects an already validated message.
    pub fn send(&self, message: ContactMessage) -> PendingOperation<()> {
        self.queue.submit(move |inbox| async move {
            info!(
                email = %message.email,
                subject = %message.subject,
                "contact message received"
            );
            inbox.messages.write().await.push(message);
            let _ = inbox.notifier.send(ClientEvent::ContactMessageSent);
        })
    }

    pub async fn messages(&self) -> Vec<ContactMessage> {
        self.inbox.messages.read().await.clone()
    }

    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
    }
}
