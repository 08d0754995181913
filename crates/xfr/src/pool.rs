//! Bounds the number of outbound transfer TCP connections held open across
//! all zones at once (`spec.md` section 4.4: `XFRD_MAX_TCP`), with FIFO
//! waiters. Built on `tokio::sync::Semaphore`, which already queues
//! acquirers in arrival order.

use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::config::XFRD_MAX_TCP;

/// A permit to hold one outbound transfer TCP connection open. Dropping it
/// returns the slot to the pool.
pub struct TcpSlot<'a> {
    _permit: SemaphorePermit<'a>,
}

pub struct TcpPool {
    semaphore: Semaphore,
}

impl TcpPool {
    pub fn new() -> Self {
        TcpPool::with_capacity(XFRD_MAX_TCP)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TcpPool {
            semaphore: Semaphore::new(capacity),
        }
    }

    /// Waits, in FIFO order, for a free slot.
    pub async fn acquire(&self) -> TcpSlot<'_> {
        let permit = self.semaphore.acquire().await.expect("pool semaphore is never closed");
        TcpSlot { _permit: permit }
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for TcpPool {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedTcpPool = Arc<TcpPool>;
