//! Simulated network round trips.
//!
//! Every container mutation is submitted to an [`OperationQueue`] and handed
//! back to the caller as a [`PendingOperation`]. The queue owns a single
//! worker task per container, which gives three guarantees:
//!
//! * each operation becomes ready at `submitted_at + latency`, so operations
//!   issued together wait out their latency concurrently;
//! * operations apply in submission order, one at a time;
//! * dropping a [`PendingOperation`] detaches it. The mutation still applies.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::{
    sync::{mpsc, oneshot, Mutex},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, error};

use crate::error::ClientError;

type Job<S> = Box<dyn FnOnce(Arc<S>) -> BoxFuture<'static, ()> + Send>;

enum QueueMessage<S> {
    Run { ready_at: Instant, job: Job<S> },
    Close,
}

/// Handle to an in-flight operation. Resolves to the operation's result, or
/// to [`ClientError::ShutDown`] when it was submitted after the owning
/// container shut down.
#[derive(Debug)]
pub struct PendingOperation<T> {
    reply: oneshot::Receiver<T>,
}

impl<T> PendingOperation<T> {
    /// Lets the operation finish in the background without waiting on it.
    pub fn detach(self) {}
}

impl<T> Future for PendingOperation<T> {
    type Output = Result<T, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.reply)
            .poll(cx)
            .map(|result| result.map_err(|_| ClientError::ShutDown))
    }
}

pub(crate) struct OperationQueue<S> {
    name: &'static str,
    latency: Duration,
    tx: mpsc::UnboundedSender<QueueMessage<S>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Send + Sync + 'static> OperationQueue<S> {
    /// Spawns the worker; must be called from within a tokio runtime.
    pub(crate) fn start(name: &'static str, target: Arc<S>, latency: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(name, target, rx));
        Self {
            name,
            latency,
            tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    pub(crate) fn submit<T, F, Fut>(&self, op: F) -> PendingOperation<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<S>) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job<S> = Box::new(move |target| {
            Box::pin(async move {
                let output = op(target).await;
                let _ = reply_tx.send(output);
            })
        });

        let ready_at = Instant::now() + self.latency;
        if self.tx.send(QueueMessage::Run { ready_at, job }).is_err() {
            debug!(queue = self.name, "operation submitted after shutdown");
        }
        PendingOperation { reply: reply_rx }
    }

    /// Lets already-submitted operations finish, then stops the worker.
    pub(crate) async fn shutdown(&self) {
        let _ = self.tx.send(QueueMessage::Close);
        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            if let Err(err) = worker.await {
                error!(queue = self.name, "operation worker failed: {err}");
            }
        }
    }
}

async fn run_worker<S>(
    name: &'static str,
    target: Arc<S>,
    mut rx: mpsc::UnboundedReceiver<QueueMessage<S>>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            QueueMessage::Run { ready_at, job } => {
                tokio::time::sleep_until(ready_at).await;
                job(Arc::clone(&target)).await;
            }
            QueueMessage::Close => break,
        }
    }
    debug!(queue = name, "operation worker stopped");
}

#[cfg(test)]
#[path = "tests/operation_tests.rs"]
mod tests;
