//! The task queue between the XFR coordinator and the serving workers:
//! zone-add, reload, and SOA-echo requests, each with its own reply.

pub mod error;
pub mod message;
pub mod queue;

pub use error::{IpcError, IpcResult};
pub use message::{Reply, Request};
pub use queue::{channel, Envelope, QueueReceiver, QueueSender};
