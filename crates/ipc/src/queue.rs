//! A bounded request/response queue: each [`Request`] travels with its own
//! one-shot reply channel, so the sender can `await` the worker's
//! [`Reply`] without polling anything else. Built on `tokio::sync::mpsc`
//! and `tokio::sync::oneshot`, the same primitives `crates/xfr`'s pool and
//! coordinator use for their own channels.

use tokio::sync::{mpsc, oneshot};

use crate::error::{IpcError, IpcResult};
use crate::message::{Reply, Request};

/// One item on the queue: a request plus where to send its reply.
pub struct Envelope {
    pub request: Request,
    reply_tx: oneshot::Sender<Reply>,
}

impl Envelope {
    pub fn respond(self, reply: Reply) {
        let _ = self.reply_tx.send(reply);
    }
}

/// The coordinator-facing half: submits requests and awaits replies.
#[derive(Clone)]
pub struct QueueSender {
    tx: mpsc::Sender<Envelope>,
}

impl QueueSender {
    pub async fn submit(&self, request: Request) -> IpcResult<Reply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope { request, reply_tx })
            .await
            .map_err(|_| IpcError::WorkerGone)?;
        reply_rx.await.map_err(|_| IpcError::ReplyDropped)
    }

    pub fn try_submit(&self, request: Request) -> IpcResult<oneshot::Receiver<Reply>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .try_send(Envelope { request, reply_tx })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => IpcError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => IpcError::WorkerGone,
            })?;
        Ok(reply_rx)
    }
}

/// The serving-worker-facing half: receives requests and replies to each.
pub struct QueueReceiver {
    rx: mpsc::Receiver<Envelope>,
}

impl QueueReceiver {
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }
}

/// Creates a bounded queue with `capacity` slots.
pub fn channel(capacity: usize) -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (QueueSender { tx }, QueueReceiver { rx })
}
