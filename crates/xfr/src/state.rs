//! The per-zone zone-transfer state machine (`spec.md` section 4.4): a
//! pure `poll(event, now) -> action` core with no I/O of its own. The
//! driving [`crate::coordinator::Coordinator`] owns sockets and timers;
//! this module only ever decides what should happen next and when.

use std::time::{Duration, Instant};

use nsd_proto::rr::rdata::Soa;
use rand::Rng;

use crate::config::{ZoneXfrConfig, MIN_REFRESH, TRANSFER_TIMEOUT};
use crate::probe::ProbeOutcome;

pub const MAX_ROUNDS: u32 = crate::config::MAX_ROUNDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XfrState {
    Ok,
    Refreshing,
    Expired,
}

#[derive(Debug, Clone)]
pub enum XfrEvent {
    /// A SOA was acquired, either from the on-disk zone at startup or from
    /// a just-applied transfer.
    ZoneLoaded { soa: Soa },
    TimerFired,
    Probe(ProbeOutcome),
    StreamComplete { new_soa: Soa },
    StreamFailed,
    /// A NOTIFY arrived; `master_index` is the sender's position in the
    /// configured master list, if it is one of ours.
    NotifyReceived { master_index: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoIntent {
    None,
    SendUdpProbe { master: usize },
    OpenTcp { master: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct XfrAction {
    pub next_deadline: Instant,
    pub intent: IoIntent,
    /// Set when a transfer just landed a newer serial: the coordinator
    /// should kick off NOTIFY-out to the zone's downstream ACL.
    pub notify_out: bool,
}

/// One zone's transfer state. Construct with [`ZoneXfr::new`] and drive
/// with repeated [`ZoneXfr::poll`] calls.
pub struct ZoneXfr {
    config: ZoneXfrConfig,
    state: XfrState,
    master_cursor: usize,
    round: u32,
    soa_disk: Option<Soa>,
    soa_disk_acquired: Option<Instant>,
    soa_notified: Option<u32>,
}

impl ZoneXfr {
    pub fn new(config: ZoneXfrConfig) -> Self {
        ZoneXfr {
            config,
            state: XfrState::Refreshing,
            master_cursor: 0,
            round: 0,
            soa_disk: None,
            soa_disk_acquired: None,
            soa_notified: None,
        }
    }

    pub fn state(&self) -> XfrState {
        self.state
    }

    pub fn current_serial(&self) -> Option<u32> {
        self.soa_disk.as_ref().map(|soa| soa.serial)
    }

    /// The action to take before the first event ever arrives: probe (or
    /// open TCP, for an AXFR-only master) immediately.
    pub fn start(&mut self, now: Instant) -> XfrAction {
        XfrAction {
            next_deadline: now,
            intent: self.probe_intent(),
            notify_out: false,
        }
    }

    pub fn poll(&mut self, event: XfrEvent, now: Instant) -> XfrAction {
        match event {
            XfrEvent::ZoneLoaded { soa } => self.accept_soa(soa, now),
            XfrEvent::TimerFired => self.on_timer(now),
            XfrEvent::Probe(outcome) => self.on_probe(outcome, now),
            XfrEvent::StreamComplete { new_soa } => self.accept_soa(new_soa, now),
            XfrEvent::StreamFailed => self.fail_master_and_retry(now),
            XfrEvent::NotifyReceived { master_index } => {
                self.state = XfrState::Refreshing;
                if let Some(idx) = master_index {
                    self.master_cursor = idx;
                }
                self.round = 0;
                XfrAction {
                    next_deadline: now,
                    intent: self.probe_intent(),
                    notify_out: false,
                }
            }
        }
    }

    fn accept_soa(&mut self, soa: Soa, now: Instant) -> XfrAction {
        let was_not_ok = self.state != XfrState::Ok;
        let newer = self
            .soa_disk
            .as_ref()
            .map(|current| nsd_proto::Serial::new(current.serial).is_less_than(nsd_proto::Serial::new(soa.serial)))
            .unwrap_or(true);
        self.soa_disk = Some(soa);
        self.soa_disk_acquired = Some(now);
        self.master_cursor = 0;
        self.round = 0;
        self.state = XfrState::Ok;
        XfrAction {
            next_deadline: self.schedule_refresh(now),
            intent: IoIntent::None,
            notify_out: was_not_ok && newer,
        }
    }

    fn on_timer(&mut self, now: Instant) -> XfrAction {
        match self.state {
            XfrState::Ok => {
                self.state = XfrState::Refreshing;
                self.master_cursor = 0;
                self.round = 0;
                XfrAction {
                    next_deadline: now,
                    intent: self.probe_intent(),
                    notify_out: false,
                }
            }
            XfrState::Refreshing | XfrState::Expired => {
                if self.is_expired(now) {
                    self.state = XfrState::Expired;
                }
                self.fail_master_and_retry(now)
            }
        }
    }

    fn on_probe(&mut self, outcome: ProbeOutcome, now: Instant) -> XfrAction {
        match outcome {
            ProbeOutcome::UpToDate => {
                self.state = XfrState::Ok;
                self.master_cursor = 0;
                self.round = 0;
                XfrAction {
                    next_deadline: self.schedule_refresh(now),
                    intent: IoIntent::None,
                    notify_out: false,
                }
            }
            ProbeOutcome::RetryTcp => XfrAction {
                next_deadline: now,
                intent: IoIntent::OpenTcp { master: self.master_cursor },
                notify_out: false,
            },
            ProbeOutcome::NextMaster => self.fail_master_and_retry(now),
            ProbeOutcome::BeginStream => XfrAction {
                next_deadline: now,
                intent: IoIntent::None,
                notify_out: false,
            },
        }
    }

    fn fail_master_and_retry(&mut self, now: Instant) -> XfrAction {
        if self.is_expired(now) {
            self.state = XfrState::Expired;
        }
        self.advance_master();
        if self.round >= MAX_ROUNDS {
            self.round = 0;
            XfrAction {
                next_deadline: self.retry_deadline(now),
                intent: IoIntent::None,
                notify_out: false,
            }
        } else {
            XfrAction {
                next_deadline: now,
                intent: self.probe_intent(),
                notify_out: false,
            }
        }
    }

    fn advance_master(&mut self) {
        if self.config.masters.is_empty() {
            return;
        }
        self.master_cursor += 1;
        if self.master_cursor >= self.config.masters.len() {
            self.master_cursor = 0;
            self.round += 1;
        }
    }

    fn probe_intent(&self) -> IoIntent {
        let Some(master) = self.config.masters.get(self.master_cursor) else {
            return IoIntent::None;
        };
        if master.axfr_only || self.soa_disk.is_none() {
            IoIntent::OpenTcp { master: self.master_cursor }
        } else {
            IoIntent::SendUdpProbe { master: self.master_cursor }
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        match (&self.soa_disk, self.soa_disk_acquired) {
            (Some(soa), Some(acquired)) => now >= acquired + Duration::from_secs(soa.expire as u64),
            _ => false,
        }
    }

    fn schedule_refresh(&self, now: Instant) -> Instant {
        let Some(soa) = &self.soa_disk else {
            return jittered(TRANSFER_TIMEOUT, Duration::from_secs(10), now);
        };
        let refresh = Duration::from_secs(soa.refresh as u64);
        let expire = Duration::from_secs(soa.expire as u64);
        let bound = refresh.min(expire).max(MIN_REFRESH).min(expire.max(MIN_REFRESH));
        now + bound
    }

    fn retry_deadline(&self, now: Instant) -> Instant {
        let base = self
            .soa_disk
            .as_ref()
            .map(|soa| Duration::from_secs(soa.retry as u64))
            .unwrap_or(TRANSFER_TIMEOUT);
        jittered(base, base / 10, now)
    }

    /// Records that a NOTIFY-out round was just sent, so repeated
    /// refreshes at the same serial do not re-trigger it.
    pub fn mark_notified(&mut self) {
        self.soa_notified = self.current_serial();
    }

    pub fn already_notified(&self) -> bool {
        self.soa_notified == self.current_serial()
    }
}

fn jittered(base: Duration, spread: Duration, now: Instant) -> Instant {
    if spread.is_zero() {
        return now + base;
    }
    let fraction: f64 = rand::thread_rng().gen_range(0.0..1.0);
    now + base + Duration::from_secs_f64(spread.as_secs_f64() * fraction)
}
