//! The tokio-based driver tying [`ZoneXfr`] to real sockets. One task per
//! zone runs [`Coordinator::drive_zone`], waiting on whichever deadline the
//! state machine last returned and reacting to NOTIFY receipts fanned in
//! from a shared channel; this module does no zone-transfer logic of its
//! own; see [`crate::state`], [`crate::probe`], and [`crate::stream`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use nsd_proto::op::message::Message;
use nsd_proto::rr::rdata::Soa;
use nsd_proto::rr::Name;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::{Master, ZoneXfrConfig};
use crate::error::XfrResult;
use crate::notify::NotifyRound;
use crate::pool::SharedTcpPool;
use crate::probe::{classify_probe_reply, ProbeOutcome};
use crate::sink::{Changeset, DiffLogSink, ReloadRequester};
use crate::state::{IoIntent, XfrEvent, ZoneXfr};
use crate::stream::StreamAssembler;

/// Everything the coordinator needs from the network, abstracted so tests
/// can supply an in-memory double instead of real sockets.
#[async_trait]
pub trait XfrTransport: Send + Sync {
    async fn send_udp_probe(&self, master: &Master, query: &Message) -> XfrResult<Message>;

    /// Opens a TCP session to `master`, sends `query`, and streams whole
    /// DNS messages back until the transfer completes or the connection
    /// closes. Each `(Message, had_tsig)` pair is one wire message's
    /// worth of records already decoded.
    async fn stream_tcp(&self, master: &Master, query: &Message) -> XfrResult<Vec<(Message, bool)>>;

    async fn send_notify(&self, target: &crate::config::NotifyTarget, soa_query: &Message) -> XfrResult<Message>;
}

/// A NOTIFY arriving from the network, fanned in to whichever zone it
/// names.
pub struct NotifyReceipt {
    pub zone: Name,
    pub master_index: Option<usize>,
}

pub struct Coordinator<T: XfrTransport> {
    transport: Arc<T>,
    pool: SharedTcpPool,
    sink: Arc<dyn DiffLogSink>,
    reload: Arc<dyn ReloadRequester>,
}

impl<T: XfrTransport + 'static> Coordinator<T> {
    pub fn new(transport: Arc<T>, pool: SharedTcpPool, sink: Arc<dyn DiffLogSink>, reload: Arc<dyn ReloadRequester>) -> Self {
        Coordinator { transport, pool, sink, reload }
    }

    /// Spawns one task per zone plus the NOTIFY fan-in loop, returning the
    /// sender side NOTIFY receipts should be posted to.
    pub fn spawn(self: Arc<Self>, configs: Vec<ZoneXfrConfig>) -> mpsc::UnboundedSender<NotifyReceipt> {
        let (tx, mut rx) = mpsc::unbounded_channel::<NotifyReceipt>();
        let mut senders: HashMap<Name, mpsc::UnboundedSender<NotifyReceipt>> = HashMap::new();

        for config in configs {
            let (zone_tx, zone_rx) = mpsc::unbounded_channel();
            senders.insert(config.zone.clone(), zone_tx);
            let this = self.clone();
            tokio::spawn(async move {
                this.drive_zone(config, zone_rx).await;
            });
        }

        tokio::spawn(async move {
            while let Some(receipt) = rx.recv().await {
                if let Some(sender) = senders.get(&receipt.zone) {
                    let _ = sender.send(receipt);
                }
            }
        });

        tx
    }

    async fn drive_zone(&self, config: ZoneXfrConfig, mut notifies: mpsc::UnboundedReceiver<NotifyReceipt>) {
        let zone_name = config.zone.clone();
        let mut xfr = ZoneXfr::new(config.clone());
        let mut action = xfr.start(Instant::now());
        let mut pending_notify: Option<NotifyRound> = None;

        loop {
            let sleep = sleep_until(action.next_deadline);
            tokio::select! {
                _ = sleep => {
                    let event = match &action.intent {
                        IoIntent::None => XfrEvent::TimerFired,
                        IoIntent::SendUdpProbe { master } => {
                            match self.run_probe(&config, *master, &zone_name, xfr.current_serial()).await {
                                Some(outcome) => XfrEvent::Probe(outcome),
                                None => XfrEvent::StreamFailed,
                            }
                        }
                        IoIntent::OpenTcp { master } => {
                            match self.run_tcp_transfer(&config, *master, &zone_name).await {
                                Some(new_soa) => XfrEvent::StreamComplete { new_soa },
                                None => XfrEvent::StreamFailed,
                            }
                        }
                    };
                    action = xfr.poll(event, Instant::now());
                }
                Some(receipt) = notifies.recv() => {
                    action = xfr.poll(XfrEvent::NotifyReceived { master_index: receipt.master_index }, Instant::now());
                }
            }

            if action.notify_out && !xfr.already_notified() {
                pending_notify = Some(NotifyRound::new(&config.notify, Instant::now()));
                xfr.mark_notified();
            }
            if let Some(round) = pending_notify.as_mut() {
                self.drive_notify_round(round, &zone_name).await;
                if round.is_finished() {
                    pending_notify = None;
                }
            }
        }
    }

    async fn run_probe(&self, config: &ZoneXfrConfig, master_idx: usize, zone: &Name, held_serial: Option<u32>) -> Option<ProbeOutcome> {
        let master = config.masters.get(master_idx)?;
        let query = probe_query(zone);
        match self.transport.send_udp_probe(master, &query).await {
            Ok(reply) => Some(classify_probe_reply(query.header.id, held_serial.map(nsd_proto::Serial::new), &reply)),
            Err(err) => {
                warn!(zone = %zone, master = %master.address, error = %err, "probe failed");
                None
            }
        }
    }

    async fn run_tcp_transfer(&self, config: &ZoneXfrConfig, master_idx: usize, zone: &Name) -> Option<Soa> {
        let master = config.masters.get(master_idx)?;
        let _slot = self.pool.acquire().await;
        let query = probe_query(zone);
        let messages = match self.transport.stream_tcp(master, &query).await {
            Ok(messages) => messages,
            Err(err) => {
                warn!(zone = %zone, master = %master.address, error = %err, "tcp transfer failed");
                return None;
            }
        };

        let mut assembler = StreamAssembler::new();
        for (message, had_tsig) in &messages {
            if assembler.track_tsig(*had_tsig).is_err() {
                warn!(zone = %zone, "tsig policy violated during transfer");
                return None;
            }
            if assembler.feed(&message.answers).is_err() {
                return None;
            }
        }

        if !assembler.is_complete() {
            return None;
        }
        let new_soa = assembler.new_soa()?.clone();
        let changeset = Changeset {
            zone: zone.clone(),
            kind: assembler.kind().expect("kind is set once streaming begins"),
            old_serial: None,
            new_serial: new_soa.serial,
            deleted: assembler.deleted().to_vec(),
            added: assembler.added().to_vec(),
        };
        if let Err(err) = self.sink.append(&changeset) {
            warn!(zone = %zone, error = %err, "failed to append changeset");
            return None;
        }
        if let Err(err) = self.reload.request_reload(zone) {
            warn!(zone = %zone, error = %err, "failed to request reload");
        }
        debug!(zone = %zone, serial = new_soa.serial, "applied transfer");
        Some(new_soa)
    }

    async fn drive_notify_round(&self, round: &mut NotifyRound, zone: &Name) {
        let now = Instant::now();
        let query = probe_query(zone);
        let due: Vec<_> = round.due(now).into_iter().collect();
        for attempt in due {
            match self.transport.send_notify(attempt.target(), &query).await {
                Ok(reply) => {
                    attempt.record_send(now);
                    attempt.record_reply(reply.header.response_code, reply.header.is_response, reply.header.authoritative);
                }
                Err(_) => attempt.record_send(now),
            }
        }
    }
}

fn probe_query(zone: &Name) -> Message {
    use nsd_proto::op::message::Query;
    use nsd_proto::rr::{DNSClass, RecordType};
    let id = rand::random::<u16>();
    Message::new_query(
        id,
        Query {
            name: zone.clone(),
            query_type: RecordType::SOA,
            query_class: DNSClass::IN,
        },
    )
}

async fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        tokio::time::sleep(deadline - now).await;
    }
}
