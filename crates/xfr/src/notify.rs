//! Outgoing NOTIFY (`spec.md` section 4.4's "NOTIFY-out" paragraph): once a
//! zone lands a newer serial, every address on its `notify` ACL gets a
//! NOTIFY carrying the current SOA, retried up to `NOTIFY_MAX_NUM` times
//! at `NOTIFY_RETRY_TIMEOUT` until a reply with `QR=1 AA=1 RCODE=NOERROR`
//! (or `NOTIMP`, which a server is allowed to answer with) arrives.

use std::time::{Duration, Instant};

use nsd_proto::op::header::ResponseCode;

use crate::config::{NotifyTarget, NOTIFY_MAX_NUM, NOTIFY_RETRY_TIMEOUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyStatus {
    Pending,
    Acked,
    GaveUp,
}

/// One NOTIFY target's retry state.
pub struct NotifyAttempt {
    target: NotifyTarget,
    attempts: u32,
    next_send: Instant,
    status: NotifyStatus,
}

impl NotifyAttempt {
    pub fn new(target: NotifyTarget, now: Instant) -> Self {
        NotifyAttempt {
            target,
            attempts: 0,
            next_send: now,
            status: NotifyStatus::Pending,
        }
    }

    pub fn target(&self) -> &NotifyTarget {
        &self.target
    }

    pub fn status(&self) -> NotifyStatus {
        self.status
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.status == NotifyStatus::Pending && now >= self.next_send
    }

    /// Call right after sending one NOTIFY datagram.
    pub fn record_send(&mut self, now: Instant) {
        self.attempts += 1;
        if self.attempts >= NOTIFY_MAX_NUM {
            self.status = NotifyStatus::GaveUp;
        } else {
            self.next_send = now + NOTIFY_RETRY_TIMEOUT;
        }
    }

    /// Call when a reply arrives for this target.
    pub fn record_reply(&mut self, response_code: ResponseCode, qr: bool, aa: bool) {
        if qr && (response_code == ResponseCode::NoError && aa || response_code == ResponseCode::NotImp) {
            self.status = NotifyStatus::Acked;
        }
    }
}

/// The full retry queue for one zone's `notify` ACL, built fresh every
/// time a new serial is committed.
pub struct NotifyRound {
    attempts: Vec<NotifyAttempt>,
}

impl NotifyRound {
    pub fn new(targets: &[NotifyTarget], now: Instant) -> Self {
        NotifyRound {
            attempts: targets.iter().cloned().map(|t| NotifyAttempt::new(t, now)).collect(),
        }
    }

    pub fn due(&mut self, now: Instant) -> Vec<&mut NotifyAttempt> {
        self.attempts.iter_mut().filter(|a| a.is_due(now)).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.attempts.iter().all(|a| a.status != NotifyStatus::Pending)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.attempts
            .iter()
            .filter(|a| a.status == NotifyStatus::Pending)
            .map(|a| a.next_send)
            .min()
    }
}

#[allow(dead_code)]
const _MIN_RETRY_SPACING: Duration = NOTIFY_RETRY_TIMEOUT;

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn target() -> NotifyTarget {
        NotifyTarget {
            address: SocketAddr::from(([192, 0, 2, 1], 53)),
        }
    }

    #[test]
    fn an_ack_stops_further_retries() {
        let now = Instant::now();
        let mut round = NotifyRound::new(&[target()], now);
        {
            let due = round.due(now);
            assert_eq!(due.len(), 1);
        }
        round.attempts[0].record_send(now);
        round.attempts[0].record_reply(ResponseCode::NoError, true, true);
        assert!(round.is_finished());
    }

    #[test]
    fn unacked_target_gives_up_after_max_attempts() {
        let mut now = Instant::now();
        let mut round = NotifyRound::new(&[target()], now);
        for _ in 0..NOTIFY_MAX_NUM {
            round.attempts[0].record_send(now);
            now += NOTIFY_RETRY_TIMEOUT;
        }
        assert_eq!(round.attempts[0].status(), NotifyStatus::GaveUp);
        assert!(round.is_finished());
    }
}
