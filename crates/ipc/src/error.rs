//! Errors raised moving a request across the queue. Wire/protocol errors
//! from the two endpoints' own crates are not wrapped here — `nsd-ipc`
//! only ever fails at the channel boundary itself.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("the serving-worker end of the queue has been dropped")]
    WorkerGone,

    #[error("the caller dropped its reply receiver before the response arrived")]
    ReplyDropped,

    #[error("the queue is full and the request was rejected")]
    QueueFull,
}

pub type IpcResult<T> = Result<T, IpcError>;
